//! Error type of the signed client core.
//!
//! Every call that can fail returns a [`ClientError`]. None of them are
//! retried inside the core; the caller decides what to do next.

use thiserror::Error;

use crate::canonical::CanonicalError;
use crate::crypto::{KeyError, SignatureError};
use crate::marshal::MarshalError;
use crate::model::ApiError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Raw key material has the wrong length.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Key material is not a valid key (bad base64, off-curve point,
    /// out-of-range scalar).
    #[error("invalid key encoding")]
    InvalidKeyEncoding,

    /// The request could not be signed.
    #[error("signing failed: {0}")]
    SigningFailure(String),

    /// The response signature is missing, malformed, or does not match the
    /// body. The body was discarded unparsed.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// Request data cannot be turned into a canonical form.
    #[error("malformed canonical input: {0}")]
    MalformedCanonicalInput(String),

    /// A date field does not hold a strict ISO-8601 value.
    #[error("invalid date in `{field}`: `{value}`")]
    DateParseError { field: String, value: String },

    /// A field is present but holds a value of the wrong type, or the body
    /// is not the JSON object we expected.
    #[error("type mismatch: {0}")]
    TypeMismatch(#[source] MarshalError),

    /// The service answered with a verified error report.
    #[error("remote error: {}", describe(.0))]
    RemoteError(Vec<ApiError>),

    /// Reported by the transport; never produced by the core itself.
    #[error("network error: {0}")]
    NetworkError(String),
}

fn describe(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no details".to_string();
    }
    errors
        .iter()
        .map(ApiError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    /// Service-style entries describing this failure.
    ///
    /// Remote errors return what the service sent; local failures are folded
    /// into a single entry so callers can render every failure the same way.
    pub fn api_errors(&self) -> Vec<ApiError> {
        match self {
            ClientError::RemoteError(errors) => errors.clone(),
            ClientError::SignatureVerificationFailed => vec![ApiError::signature_invalid()],
            other => vec![ApiError::new(ApiError::GENERIC_CODE, other.to_string(), "")],
        }
    }
}

impl From<KeyError> for ClientError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidKeyLength { expected, actual } => {
                ClientError::InvalidKeyLength { expected, actual }
            }
            KeyError::InvalidKeyEncoding | KeyError::InvalidScalar => {
                ClientError::InvalidKeyEncoding
            }
        }
    }
}

impl From<SignatureError> for ClientError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::SigningFailure(reason) => ClientError::SigningFailure(reason),
            SignatureError::MalformedSignature | SignatureError::VerificationFailed => {
                ClientError::SignatureVerificationFailed
            }
        }
    }
}

impl From<CanonicalError> for ClientError {
    fn from(err: CanonicalError) -> Self {
        match err {
            CanonicalError::MalformedCanonicalInput(reason) => {
                ClientError::MalformedCanonicalInput(reason)
            }
        }
    }
}

impl From<MarshalError> for ClientError {
    fn from(err: MarshalError) -> Self {
        match err {
            MarshalError::DateParseError { field, value } => {
                ClientError::DateParseError { field, value }
            }
            other => ClientError::TypeMismatch(other),
        }
    }
}
