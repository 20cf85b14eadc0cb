// Copyright (c) 2026 Express Statement contributors. Apache-2.0 License.
// See LICENSE for details.

//! # Express Statement — Signed Client Core
//!
//! Client-side core for the Express Statement bank-statement aggregation
//! service. Every request is signed with the application's P-256 key and
//! every response is verified against the service's key before a single
//! byte of it is parsed.
//!
//! ## Modules
//!
//! - **crypto** — P-256 key decoding and DER ECDSA signatures over SHA-256.
//! - **canonical** — The exact byte sequences that get signed.
//! - **marshal** — Descriptor-driven JSON to DTO conversion with strict dates.
//! - **model** — The service's request and response types.
//! - **client** — Signs, sends through a pluggable transport, verifies.
//! - **config** — Protocol constants and registration values.
//!
//! ## Usage
//!
//! ```no_run
//! use express_statement::{ClientConfig, GetLinkedAccountListResponse, SignedClient, Transport};
//! # fn run<T: Transport>(transport: T) -> Result<(), express_statement::ClientError> {
//! let config = ClientConfig::new("app-key", "<base64 private key>", "<base64 server key>");
//! let client = SignedClient::from_config(&config, transport)?;
//! let linked: GetLinkedAccountListResponse =
//!     client.get("api/v1/linked-accounts", &[("sessionId", "s-1")])?;
//! # let _ = linked;
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod client;
pub mod config;
pub mod crypto;
pub mod marshal;
pub mod model;

pub use canonical::{encode_query_for_signing, CanonicalError, CanonicalForm};
pub use client::{
    ClientError, ClientKeys, Method, RawResponse, SignedClient, SignedEnvelope, SignedRequest,
    Transport,
};
pub use config::ClientConfig;
pub use crypto::{Curve, KeyCodec, PrivateKey, PublicKey, SignatureDer, SignatureEngine};
pub use marshal::{IsoDateTime, Marshal, MarshalError};
pub use model::*;
