//! # Canonical Forms
//!
//! The exact bytes that get signed. Two styles exist:
//!
//! - **GET** — request parameters sorted by key, form-encoded, and joined as
//!   `k1=v1&k2=v2`. This string is the signing domain only; the parameters
//!   may travel on the wire in any order.
//! - **POST** — the serialized request body, byte for byte. The transport
//!   must send exactly these bytes; re-serializing invalidates the signature.
//!
//! ## Encoding
//!
//! Keys and values use classic `application/x-www-form-urlencoded` escaping:
//! ASCII alphanumerics and `-_.` pass through, a space becomes `+`, anything
//! else becomes `%XX` (uppercase hex, UTF-8 bytes). Afterwards every `%2B` is
//! turned back into `+`, so a literal plus and a space both canonicalize to
//! `+`. The receiver is `+`-tolerant and canonicalizes the same way.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Characters escaped by the form encoder. Space is handled separately.
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("malformed canonical input: {0}")]
    MalformedCanonicalInput(String),
}

/// The byte sequence a signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalForm {
    /// Normalized query string of a GET call.
    Query(String),
    /// Exact body bytes of a POST call.
    Body(Vec<u8>),
}

impl CanonicalForm {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CanonicalForm::Query(query) => query.as_bytes(),
            CanonicalForm::Body(body) => body,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Build the GET signing string from request parameters.
///
/// Parameters are sorted by ascending byte value of the key. An empty list
/// yields an empty string. Duplicate keys have no defined sort order and are
/// rejected with [`CanonicalError::MalformedCanonicalInput`]. Empty keys are
/// rejected the same way, although a form encoder would happily sign them
/// as `=value`; no endpoint takes an unnamed parameter.
///
/// ```
/// use express_statement::canonical::encode_query_for_signing;
///
/// let query = encode_query_for_signing([("b", "2"), ("a", "1 ")]).unwrap();
/// assert_eq!(query, "a=1+&b=2");
/// ```
pub fn encode_query_for_signing<I, K, V>(params: I) -> Result<String, CanonicalError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = params.into_iter().collect();
    pairs.sort_by(|(a, _), (b, _)| a.as_ref().as_bytes().cmp(b.as_ref().as_bytes()));

    for window in pairs.windows(2) {
        if window[0].0.as_ref() == window[1].0.as_ref() {
            return Err(CanonicalError::MalformedCanonicalInput(format!(
                "duplicate parameter `{}`",
                window[0].0.as_ref()
            )));
        }
    }
    if pairs.iter().any(|(key, _)| key.as_ref().is_empty()) {
        return Err(CanonicalError::MalformedCanonicalInput(
            "empty parameter name".to_string(),
        ));
    }

    let query = pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                canonical_component(key.as_ref()),
                canonical_component(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    tracing::debug!(params = pairs.len(), len = query.len(), "built query canonical form");
    Ok(query)
}

/// Canonical form of a GET call.
pub fn query_canonical_form<I, K, V>(params: I) -> Result<CanonicalForm, CanonicalError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    encode_query_for_signing(params).map(CanonicalForm::Query)
}

/// Canonical form of a POST call: the body itself.
pub fn body_canonical_form(body: impl Into<Vec<u8>>) -> CanonicalForm {
    CanonicalForm::Body(body.into())
}

/// Form-encode one key or value, then fold `%2B` back to `+`.
fn canonical_component(raw: &str) -> String {
    form_encode(raw).replace("%2B", "+")
}

fn form_encode(raw: &str) -> String {
    raw.split(' ')
        .map(|part| utf8_percent_encode(part, FORM_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("+")
}
