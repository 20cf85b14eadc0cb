//! The seam between the signed core and whatever moves bytes over HTTP.
//!
//! The core produces a [`SignedRequest`] and expects a [`RawResponse`] back.
//! Retries, timeouts, TLS and connection pooling all live behind
//! [`Transport`].

use crate::canonical::CanonicalForm;
use crate::config::{CONTENT_TYPE_JSON, SIGNATURE_HEADER};
use crate::crypto::SignatureDer;

use super::ClientError;

/// HTTP method of a signed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// What was signed, what goes on the wire, and the signature over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub canonical: CanonicalForm,
    /// Body bytes to transmit. Identical to the canonical form for POST,
    /// empty for GET.
    pub payload: Vec<u8>,
    pub signature: SignatureDer,
}

impl SignedEnvelope {
    /// Value for the signature header: base64 of the DER signature.
    pub fn signature_header(&self) -> String {
        self.signature.to_base64()
    }
}

/// A fully prepared request, ready for the transport.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    /// Query parameters in caller order. Only the signing domain is sorted.
    pub query: Vec<(String, String)>,
    pub envelope: SignedEnvelope,
}

impl SignedRequest {
    /// Body bytes, `None` for GET. Must be sent unmodified.
    pub fn body(&self) -> Option<&[u8]> {
        match self.method {
            Method::Get => None,
            Method::Post => Some(&self.envelope.payload),
        }
    }

    /// Headers the transport must attach.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![(SIGNATURE_HEADER, self.envelope.signature_header())];
        if self.method == Method::Post {
            headers.push(("Content-Type", CONTENT_TYPE_JSON.to_string()));
        }
        headers
    }
}

/// What the transport got back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Raw value of the signature header, if the service sent one.
    pub signature: Option<String>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>, signature: Option<String>) -> Self {
        Self {
            status,
            body: body.into(),
            signature,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends signed requests. Implementations report connection-level failures
/// as [`ClientError::NetworkError`].
pub trait Transport {
    fn execute(&self, request: &SignedRequest) -> Result<RawResponse, ClientError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &SignedRequest) -> Result<RawResponse, ClientError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &SignedRequest) -> Result<RawResponse, ClientError> {
        (**self).execute(request)
    }
}
