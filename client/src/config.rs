//! # Client Configuration & Constants
//!
//! Every protocol constant the client core relies on lives here, next to
//! [`ClientConfig`], the serde-friendly bundle of values an application
//! receives when it is registered with the service.
//!
//! Changing any of the wire constants below breaks interoperability with the
//! service, so treat them as part of the protocol rather than as tunables.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Version of this client library as reported to the service.
pub const CLIENT_VERSION: &str = "1.8.1";

/// Default endpoint of the production service.
pub const DEFAULT_BASE_URL: &str = "https://service.rychlyvypis.cz";

/// Header carrying the base64-encoded DER signature, both on requests and
/// on responses.
pub const SIGNATURE_HEADER: &str = "X-Data-Signature";

/// Content type of every request and response body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// ECDSA over NIST P-256 with SHA-256 digests. The only combination the
/// service speaks.
pub const SIGNING_ALGORITHM: &str = "ECDSA-P256-SHA256";

/// Raw public key length: one SEC1 tag byte plus two 32-byte coordinates.
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Raw private key length: a 32-byte big-endian scalar.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Length of a single affine coordinate.
pub const COORDINATE_LENGTH: usize = 32;

/// SEC1 tag for an uncompressed point.
pub const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Anti-replay nonce length in bytes, before base64 encoding.
pub const NONCE_LENGTH: usize = 16;

/// Upper bound on retries when a freshly drawn ECDSA nonce yields `r == 0`
/// or `s == 0`. Hitting it means the RNG is broken, not that we were unlucky.
pub const MAX_SIGNING_ATTEMPTS: usize = 16;

// ---------------------------------------------------------------------------
// Wire Formats
// ---------------------------------------------------------------------------

/// chrono format used when rendering dates (`2021-06-30T00:00:00+02:00`).
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Suffix marking the element hint of an array field in a type descriptor.
pub const ARRAY_ELEMENT_SUFFIX: &str = "[]";

// ---------------------------------------------------------------------------
// Application Configuration
// ---------------------------------------------------------------------------

/// Values delivered to an application at registration time.
///
/// Keys are kept in their base64 transport form here; decode them with
/// [`ClientKeys::from_config`](crate::client::ClientKeys::from_config).
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Service endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `APP_KEY` value, sent verbatim in request bodies.
    pub app_key: String,

    /// `APP_PRIVATE_KEY` value, base64 of the 32-byte scalar.
    pub app_private_key: String,

    /// `SERVER_PUBLIC_KEY` value, base64 of the 65-byte uncompressed point.
    pub server_public_key: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    /// Configuration pointing at the default endpoint.
    pub fn new(
        app_key: impl Into<String>,
        app_private_key: impl Into<String>,
        server_public_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: default_base_url(),
            app_key: app_key.into(),
            app_private_key: app_private_key.into(),
            server_public_key: server_public_key.into(),
        }
    }

    /// Override the service endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The private key stays out of debug output entirely.
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_key", &self.app_key)
            .field("server_public_key", &self.server_public_key)
            .finish_non_exhaustive()
    }
}
