//! # Digital Signatures
//!
//! ECDSA over P-256 with SHA-256 digests and DER-encoded `(r, s)` pairs, the
//! scheme the service uses for both directions of every call.
//!
//! ## Nonces
//!
//! Two unrelated things in this module are called "nonce":
//!
//! - the per-signature ECDSA secret `k`, drawn fresh from the OS RNG for
//!   every [`SignatureEngine::sign`] call and never leaving this module;
//! - the application-level anti-replay token returned by
//!   [`SignatureEngine::nonce`], which goes into request bodies.
//!
//! `k` is random rather than RFC 6979 derived. The service's other
//! clients sign that way and we do not depend on deterministic output, but
//! it does mean the signing path is only as good as the RNG behind it.
//!
//! ## Verification
//!
//! Unparseable DER is treated exactly like a bad signature: `verify` returns
//! `false`. Callers who need to tell the two apart use
//! [`SignatureEngine::verify_detailed`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use p256::ecdsa::{signature::Verifier, Signature};
use p256::elliptic_curve::{ops::Reduce, point::AffineCoordinates, Field, PrimeField};
use p256::{FieldBytes, ProjectivePoint, Scalar, U256};
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use super::keys::{Curve, PrivateKey, PublicKey};
use crate::config::{MAX_SIGNING_ATTEMPTS, NONCE_LENGTH};

/// Errors during signature operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing failed: {0}")]
    SigningFailure(String),

    #[error("malformed signature: not a DER-encoded ECDSA signature")]
    MalformedSignature,

    #[error("signature verification failed")]
    VerificationFailed,
}

/// A DER-encoded `SEQUENCE { INTEGER r, INTEGER s }`.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureDer(Vec<u8>);

impl SignatureDer {
    /// Wrap raw bytes without parsing them. Parsing happens at verification.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode the base64 form used in the signature header.
    pub fn from_base64(encoded: &str) -> Result<Self, SignatureError> {
        BASE64
            .decode(encoded.trim())
            .map(Self)
            .map_err(|_| SignatureError::MalformedSignature)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Base64 form, ready for the signature header.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }
}

impl fmt::Debug for SignatureDer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureDer({} bytes)", self.0.len())
    }
}

/// Signs and verifies messages on the configured curve.
///
/// Stateless; one engine can be shared across threads and calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureEngine {
    curve: Curve,
}

impl SignatureEngine {
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Sign `message` with a fresh random `k` from the OS RNG.
    pub fn sign(&self, message: &[u8], key: &PrivateKey) -> Result<SignatureDer, SignatureError> {
        self.sign_with_rng(message, key, &mut OsRng)
    }

    /// Sign `message`, drawing `k` from the given RNG.
    ///
    /// `k` is rejection-sampled from 32 raw RNG bytes. A draw outside
    /// `[1, n-1]`, or one giving `r == 0` or `s == 0`, is discarded and drawn
    /// again. An RNG that errors, or keeps producing unusable values, is
    /// reported as [`SignatureError::SigningFailure`]; this never panics.
    pub fn sign_with_rng<R>(
        &self,
        message: &[u8],
        key: &PrivateKey,
        rng: &mut R,
    ) -> Result<SignatureDer, SignatureError>
    where
        R: RngCore + CryptoRng,
    {
        let digest = Sha256::digest(message);
        let z = <Scalar as Reduce<U256>>::reduce_bytes(&digest);
        let d = key.scalar();

        for attempt in 1..=MAX_SIGNING_ATTEMPTS {
            let Some(k) = draw_scalar(rng)? else {
                tracing::debug!(attempt, "ECDSA nonce out of range, retrying");
                continue;
            };
            let Some(k_inv) = Option::<Scalar>::from(k.invert()) else {
                continue;
            };

            let point = (ProjectivePoint::GENERATOR * k).to_affine();
            let r = <Scalar as Reduce<U256>>::reduce_bytes(&point.x());
            if bool::from(r.is_zero()) {
                tracing::debug!(attempt, "ECDSA r reduced to zero, retrying");
                continue;
            }

            let s = k_inv * (z + r * *d);
            if bool::from(s.is_zero()) {
                tracing::debug!(attempt, "ECDSA s reduced to zero, retrying");
                continue;
            }

            let signature = Signature::from_scalars(r.to_repr(), s.to_repr())
                .map_err(|e| SignatureError::SigningFailure(e.to_string()))?;
            return Ok(SignatureDer(signature.to_der().as_bytes().to_vec()));
        }

        Err(SignatureError::SigningFailure(format!(
            "no usable nonce after {} attempts",
            MAX_SIGNING_ATTEMPTS
        )))
    }

    /// Check a DER signature over `message`.
    ///
    /// Returns `false` for a wrong key, a wrong message, or bytes that do not
    /// parse as a DER signature. Never panics on hostile input.
    pub fn verify(&self, message: &[u8], signature: &[u8], key: &PublicKey) -> bool {
        self.verify_detailed(message, signature, key).is_ok()
    }

    /// Like [`verify`](Self::verify), but distinguishes unparseable input
    /// ([`SignatureError::MalformedSignature`]) from a mismatch
    /// ([`SignatureError::VerificationFailed`]).
    pub fn verify_detailed(
        &self,
        message: &[u8],
        signature: &[u8],
        key: &PublicKey,
    ) -> Result<(), SignatureError> {
        let signature =
            Signature::from_der(signature).map_err(|_| SignatureError::MalformedSignature)?;

        key.verifying_key()
            .verify(message, &signature)
            .map_err(|_| SignatureError::VerificationFailed)
    }

    /// Fresh anti-replay token: 16 random bytes, base64-encoded.
    ///
    /// Unrelated to the ECDSA `k` used by [`sign`](Self::sign).
    pub fn nonce(&self) -> Result<String, SignatureError> {
        self.nonce_with_rng(&mut OsRng)
    }

    /// Anti-replay token drawn from the given RNG.
    pub fn nonce_with_rng<R>(&self, rng: &mut R) -> Result<String, SignatureError>
    where
        R: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; NONCE_LENGTH];
        rng.try_fill_bytes(&mut bytes).map_err(rng_failure)?;
        Ok(BASE64.encode(bytes))
    }
}

fn rng_failure(err: rand_core::Error) -> SignatureError {
    SignatureError::SigningFailure(format!("random source failed: {}", err))
}

/// One candidate for `k`. `Ok(None)` means the bytes were zero or not below
/// the group order.
fn draw_scalar<R>(rng: &mut R) -> Result<Option<Scalar>, SignatureError>
where
    R: RngCore + CryptoRng,
{
    let mut bytes = FieldBytes::default();
    rng.try_fill_bytes(&mut bytes).map_err(rng_failure)?;
    let candidate: Option<Scalar> = Scalar::from_repr(bytes).into();
    Ok(candidate.filter(|k| !bool::from(k.is_zero())))
}
