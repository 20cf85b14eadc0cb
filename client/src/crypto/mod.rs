//! # Cryptographic Primitives
//!
//! Key decoding and ECDSA signing/verification for the signed
//! request/response protocol.
//!
//! - **keys** — raw bytes ⇄ P-256 key objects.
//! - **signatures** — ECDSA/SHA-256 with DER output, plus anti-replay nonces.
//!
//! Everything here is a thin, typed layer over the RustCrypto `p256` crate.
//! Key bytes and signatures never reach the logs.

pub mod keys;
pub mod signatures;

pub use keys::{Curve, KeyCodec, KeyError, PrivateKey, PublicKey};
pub use signatures::{SignatureDer, SignatureEngine, SignatureError};
