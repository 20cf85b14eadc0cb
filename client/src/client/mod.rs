//! # Signed Client Core
//!
//! Ties the components together for one call:
//!
//! ```text
//!   params / body ──► canonical form ──► ECDSA sign (app private key)
//!                                              │
//!                                              ▼
//!                     Transport::execute(SignedRequest + X-Data-Signature)
//!                                              │
//!                                              ▼
//!   DTO ◄── marshaller ◄── verify(body, base64-decoded header, counterparty key)
//! ```
//!
//! Verification always happens before any byte of the response body is
//! parsed. A missing, undecodable or non-matching signature header ends the
//! call with [`ClientError::SignatureVerificationFailed`] and the body is
//! dropped. Verified error bodies become [`ClientError::RemoteError`].
//!
//! The per-endpoint methods of the service are thin wrappers over
//! [`SignedClient::get`] and [`SignedClient::post`] and are left to the
//! application.

mod error;
pub mod transport;

pub use error::ClientError;
pub use transport::{Method, RawResponse, SignedEnvelope, SignedRequest, Transport};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::canonical::{body_canonical_form, query_canonical_form};
use crate::config::ClientConfig;
use crate::crypto::{Curve, KeyCodec, PrivateKey, PublicKey, SignatureDer, SignatureEngine};
use crate::marshal::{self, Marshal};
use crate::model::{ApiError, ErrorResponse};

/// Long-lived key material of an application.
#[derive(Clone)]
pub struct ClientKeys {
    app_key: String,
    app_private_key: PrivateKey,
    server_public_key: PublicKey,
}

impl ClientKeys {
    pub fn new(
        app_key: impl Into<String>,
        app_private_key: PrivateKey,
        server_public_key: PublicKey,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_private_key,
            server_public_key,
        }
    }

    /// Decode already base64-decoded key bytes.
    pub fn from_raw(
        codec: &KeyCodec,
        app_key: impl Into<String>,
        app_private_key: &[u8],
        server_public_key: &[u8],
    ) -> Result<Self, ClientError> {
        Ok(Self::new(
            app_key,
            codec.decode_private_key(app_private_key)?,
            codec.decode_public_key(server_public_key)?,
        ))
    }

    /// Decode the base64 strings of a [`ClientConfig`].
    pub fn from_config(codec: &KeyCodec, config: &ClientConfig) -> Result<Self, ClientError> {
        let private = decode_base64_key(&config.app_private_key)?;
        let public = decode_base64_key(&config.server_public_key)?;
        Self::from_raw(codec, config.app_key.clone(), &private, &public)
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    pub fn server_public_key(&self) -> &PublicKey {
        &self.server_public_key
    }

    pub fn app_public_key(&self) -> PublicKey {
        self.app_private_key.public_key()
    }
}

impl std::fmt::Debug for ClientKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientKeys")
            .field("app_key", &self.app_key)
            .field("app_private_key", &self.app_private_key)
            .field("server_public_key", &self.server_public_key)
            .finish()
    }
}

/// Base64 key string to raw bytes.
pub fn decode_base64_key(encoded: &str) -> Result<Vec<u8>, ClientError> {
    BASE64
        .decode(encoded.trim())
        .map_err(|_| ClientError::InvalidKeyEncoding)
}

/// Signs requests, sends them through a [`Transport`], and verifies and
/// parses responses.
///
/// Holds only immutable key material; `&self` calls may run concurrently.
#[derive(Debug)]
pub struct SignedClient<T> {
    base_url: String,
    keys: ClientKeys,
    codec: KeyCodec,
    engine: SignatureEngine,
    transport: T,
}

impl<T: Transport> SignedClient<T> {
    pub fn new(base_url: impl Into<String>, keys: ClientKeys, transport: T) -> Self {
        Self::with_curve(base_url, keys, transport, Curve::default())
    }

    pub fn with_curve(
        base_url: impl Into<String>,
        keys: ClientKeys,
        transport: T,
        curve: Curve,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            keys,
            codec: KeyCodec::new(curve),
            engine: SignatureEngine::new(curve),
            transport,
        }
    }

    /// Build a client from registration values.
    pub fn from_config(config: &ClientConfig, transport: T) -> Result<Self, ClientError> {
        let codec = KeyCodec::default();
        let keys = ClientKeys::from_config(&codec, config)?;
        tracing::debug!(
            base_url = %config.base_url,
            server_key = %keys.server_public_key().fingerprint(),
            "client configured"
        );
        Ok(Self::new(config.base_url.clone(), keys, transport))
    }

    pub fn keys(&self) -> &ClientKeys {
        &self.keys
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fresh anti-replay nonce for a request body.
    pub fn nonce(&self) -> Result<String, ClientError> {
        Ok(self.engine.nonce()?)
    }

    /// Decode a per-session public key handed out by the service.
    pub fn decode_session_key(&self, bytes: &[u8]) -> Result<PublicKey, ClientError> {
        Ok(self.codec.decode_public_key(bytes)?)
    }

    /// Sign GET parameters.
    pub fn sign_query<K, V>(&self, params: &[(K, V)]) -> Result<SignedEnvelope, ClientError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let canonical =
            query_canonical_form(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))?;
        let signature = self
            .engine
            .sign(canonical.as_bytes(), &self.keys.app_private_key)?;
        Ok(SignedEnvelope {
            canonical,
            payload: Vec::new(),
            signature,
        })
    }

    /// Serialize and sign a POST body. The returned payload is the exact
    /// byte sequence that was signed.
    pub fn sign_body<B: Marshal>(&self, body: &B) -> Result<SignedEnvelope, ClientError> {
        let payload = marshal::to_json(body)?.into_bytes();
        let canonical = body_canonical_form(payload.clone());
        let signature = self
            .engine
            .sign(canonical.as_bytes(), &self.keys.app_private_key)?;
        Ok(SignedEnvelope {
            canonical,
            payload,
            signature,
        })
    }

    /// Signed GET, response verified with the server key.
    pub fn get<R, K, V>(&self, path: &str, params: &[(K, V)]) -> Result<R, ClientError>
    where
        R: Marshal,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let server_key = self.keys.server_public_key.clone();
        self.get_verified_with(path, params, &server_key)
    }

    /// Signed GET, response verified with `counterparty`.
    pub fn get_verified_with<R, K, V>(
        &self,
        path: &str,
        params: &[(K, V)],
        counterparty: &PublicKey,
    ) -> Result<R, ClientError>
    where
        R: Marshal,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let envelope = self.sign_query(params)?;
        let request = SignedRequest {
            method: Method::Get,
            url: self.url(path),
            query: params
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
                .collect(),
            envelope,
        };
        self.execute(&request, counterparty)
    }

    /// Signed POST, response verified with the server key.
    pub fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Marshal,
        R: Marshal,
    {
        let server_key = self.keys.server_public_key.clone();
        self.post_verified_with(path, body, &server_key)
    }

    /// Signed POST, response verified with `counterparty`.
    pub fn post_verified_with<B, R>(
        &self,
        path: &str,
        body: &B,
        counterparty: &PublicKey,
    ) -> Result<R, ClientError>
    where
        B: Marshal,
        R: Marshal,
    {
        let envelope = self.sign_body(body)?;
        let request = SignedRequest {
            method: Method::Post,
            url: self.url(path),
            query: Vec::new(),
            envelope,
        };
        self.execute(&request, counterparty)
    }

    /// Check the response signature against `counterparty`.
    ///
    /// Returns the body only once it is known to be authentic.
    pub fn verify_response<'a>(
        &self,
        response: &'a RawResponse,
        counterparty: &PublicKey,
    ) -> Result<&'a [u8], ClientError> {
        let Some(header) = response.signature.as_deref() else {
            tracing::warn!(status = response.status, "response carries no signature header");
            return Err(ClientError::SignatureVerificationFailed);
        };

        let signature = SignatureDer::from_base64(header).map_err(|_| {
            tracing::warn!(status = response.status, "signature header is not valid base64");
            ClientError::SignatureVerificationFailed
        })?;

        if !self
            .engine
            .verify(&response.body, signature.as_bytes(), counterparty)
        {
            tracing::warn!(
                status = response.status,
                key = %counterparty.fingerprint(),
                "response signature rejected"
            );
            return Err(ClientError::SignatureVerificationFailed);
        }

        tracing::debug!(status = response.status, "response signature verified");
        Ok(&response.body)
    }

    /// Verify, then either parse the DTO or surface the service's errors.
    pub fn handle_response<R: Marshal>(
        &self,
        response: &RawResponse,
        counterparty: &PublicKey,
    ) -> Result<R, ClientError> {
        let body = self.verify_response(response, counterparty)?;

        if !response.is_success() {
            let errors = match marshal::from_slice::<ErrorResponse>(body) {
                Ok(report) if !report.errors.is_empty() => report.errors,
                _ => vec![ApiError::new(
                    ApiError::GENERIC_CODE,
                    format!("HTTP {}", response.status),
                    "",
                )],
            };
            tracing::warn!(
                status = response.status,
                errors = errors.len(),
                "service reported an error"
            );
            return Err(ClientError::RemoteError(errors));
        }

        Ok(marshal::from_slice(body)?)
    }

    fn execute<R: Marshal>(
        &self,
        request: &SignedRequest,
        counterparty: &PublicKey,
    ) -> Result<R, ClientError> {
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            canonical_len = request.envelope.canonical.len(),
            "sending signed request"
        );
        let response = self.transport.execute(request)?;
        self.handle_response(&response, counterparty)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
