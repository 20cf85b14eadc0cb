//! # Key Codec
//!
//! Conversion between the raw byte encodings the service hands out and
//! typed P-256 key objects.
//!
//! The service distributes keys as base64 of two fixed layouts:
//!
//! ```text
//!   public key  (65 bytes)   0x04 ‖ X (32, big-endian) ‖ Y (32, big-endian)
//!   private key (32 bytes)   d (big-endian scalar)
//! ```
//!
//! Base64 is the transport's business. Everything in here works on the
//! already-decoded bytes.
//!
//! ## Strictness
//!
//! Public keys must lie on the curve; we refuse anything else before it gets
//! anywhere near a verifier. Private scalars must be in `[1, n-1]`. A scalar
//! of zero or one at or above the group order is rejected rather than reduced.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{
    ecdsa::VerifyingKey, FieldBytes, NonZeroScalar, PublicKey as P256PublicKey, SecretKey,
};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::{
    COORDINATE_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNING_ALGORITHM,
    UNCOMPRESSED_POINT_TAG,
};

/// Errors that can occur while decoding key material.
///
/// Messages never include key bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid public key encoding: not an uncompressed point on the curve")]
    InvalidKeyEncoding,

    #[error("invalid private key: scalar must be in [1, n-1]")]
    InvalidScalar,
}

/// Elliptic curve the codec and signature engine operate on.
///
/// Passed explicitly at construction instead of living in a global. P-256 is
/// the only curve the service uses, and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Curve {
    /// NIST P-256 (secp256r1).
    #[default]
    P256,
}

impl Curve {
    /// Human-readable curve name.
    pub fn name(&self) -> &'static str {
        match self {
            Curve::P256 => "NIST P-256",
        }
    }

    /// Signature scheme used on this curve.
    pub fn signing_algorithm(&self) -> &'static str {
        match self {
            Curve::P256 => SIGNING_ALGORITHM,
        }
    }

    /// Length of a raw uncompressed public key on this curve.
    pub fn public_key_length(&self) -> usize {
        match self {
            Curve::P256 => PUBLIC_KEY_LENGTH,
        }
    }

    /// Length of a raw private scalar on this curve.
    pub fn private_key_length(&self) -> usize {
        match self {
            Curve::P256 => PRIVATE_KEY_LENGTH,
        }
    }
}

/// Converts raw key bytes to and from typed keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyCodec {
    curve: Curve,
}

impl KeyCodec {
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Decode a 65-byte uncompressed point.
    ///
    /// Fails with [`KeyError::InvalidKeyLength`] for any other length and
    /// with [`KeyError::InvalidKeyEncoding`] when the tag is not `0x04` or
    /// `(X, Y)` does not satisfy the curve equation.
    pub fn decode_public_key(&self, bytes: &[u8]) -> Result<PublicKey, KeyError> {
        let expected = self.curve.public_key_length();
        if bytes.len() != expected {
            return Err(KeyError::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes[0] != UNCOMPRESSED_POINT_TAG {
            return Err(KeyError::InvalidKeyEncoding);
        }

        // from_sec1_bytes runs the on-curve check and rejects the identity.
        let inner =
            P256PublicKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidKeyEncoding)?;

        Ok(PublicKey { inner })
    }

    /// Decode a 32-byte big-endian private scalar.
    pub fn decode_private_key(&self, bytes: &[u8]) -> Result<PrivateKey, KeyError> {
        let expected = self.curve.private_key_length();
        if bytes.len() != expected {
            return Err(KeyError::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }

        let field_bytes = FieldBytes::clone_from_slice(bytes);
        let inner = SecretKey::from_bytes(&field_bytes).map_err(|_| KeyError::InvalidScalar)?;

        Ok(PrivateKey { inner })
    }

    /// Re-encode a public key as `0x04 ‖ X ‖ Y`.
    pub fn encode_public_key(&self, key: &PublicKey) -> [u8; PUBLIC_KEY_LENGTH] {
        key.to_bytes()
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A point on P-256 that has passed the on-curve check.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: P256PublicKey,
}

impl PublicKey {
    /// Uncompressed SEC1 encoding, always 65 bytes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let encoded = self.inner.to_encoded_point(false);
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Big-endian X coordinate.
    pub fn x(&self) -> [u8; COORDINATE_LENGTH] {
        let mut out = [0u8; COORDINATE_LENGTH];
        out.copy_from_slice(&self.to_bytes()[1..1 + COORDINATE_LENGTH]);
        out
    }

    /// Big-endian Y coordinate.
    pub fn y(&self) -> [u8; COORDINATE_LENGTH] {
        let mut out = [0u8; COORDINATE_LENGTH];
        out.copy_from_slice(&self.to_bytes()[1 + COORDINATE_LENGTH..]);
        out
    }

    /// First 8 bytes of SHA-256 over the encoded point, hex-encoded.
    ///
    /// Safe to log; this is what shows up in tracing output.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.to_bytes());
        hex::encode(&digest[..8])
    }

    pub(crate) fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::from(&self.inner)
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A P-256 scalar in `[1, n-1]`. Zeroized on drop by the underlying
/// `SecretKey`.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SecretKey,
}

impl PrivateKey {
    /// The public key belonging to this scalar.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.public_key(),
        }
    }

    /// Raw big-endian scalar. Handle with care.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        let mut out = [0u8; PRIVATE_KEY_LENGTH];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    pub(crate) fn scalar(&self) -> NonZeroScalar {
        self.inner.to_nonzero_scalar()
    }
}

impl PartialEq for PrivateKey {
    /// Compares through the public key, never the scalar.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(pub={})", self.public_key().fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generator of P-256, i.e. the public key of scalar 1.
    const G_X: &str = "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296";
    const G_Y: &str = "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5";

    /// Group order n.
    const ORDER: &str = "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551";

    fn generator_bytes() -> Vec<u8> {
        let mut bytes = vec![UNCOMPRESSED_POINT_TAG];
        bytes.extend(hex::decode(G_X).unwrap());
        bytes.extend(hex::decode(G_Y).unwrap());
        bytes
    }

    fn scalar_one() -> [u8; 32] {
        let mut one = [0u8; 32];
        one[31] = 1;
        one
    }

    #[test]
    fn decodes_generator_point() {
        let codec = KeyCodec::default();
        let key = codec.decode_public_key(&generator_bytes()).unwrap();
        assert_eq!(hex::encode(key.x()), G_X);
        assert_eq!(hex::encode(key.y()), G_Y);
    }

    #[test]
    fn public_key_reencodes_to_original_bytes() {
        let codec = KeyCodec::new(Curve::P256);
        let original = generator_bytes();
        let key = codec.decode_public_key(&original).unwrap();
        assert_eq!(codec.encode_public_key(&key).to_vec(), original);
    }

    #[test]
    fn derived_public_keys_roundtrip() {
        let codec = KeyCodec::default();
        for seed in 1u8..=8 {
            let private = codec.decode_private_key(&[seed; 32]).unwrap();
            let encoded = private.public_key().to_bytes();
            let decoded = codec.decode_public_key(&encoded).unwrap();
            assert_eq!(decoded.to_bytes(), encoded);
        }
    }

    #[test]
    fn rejects_wrong_public_key_length() {
        let codec = KeyCodec::default();
        let err = codec.decode_public_key(&generator_bytes()[..64]).unwrap_err();
        assert_eq!(
            err,
            KeyError::InvalidKeyLength {
                expected: 65,
                actual: 64
            }
        );
        assert!(codec.decode_public_key(&[]).is_err());
    }

    #[test]
    fn rejects_compressed_tag() {
        let codec = KeyCodec::default();
        let mut bytes = generator_bytes();
        bytes[0] = 0x02;
        assert_eq!(
            codec.decode_public_key(&bytes).unwrap_err(),
            KeyError::InvalidKeyEncoding
        );
    }

    #[test]
    fn rejects_point_off_curve() {
        let codec = KeyCodec::default();
        let mut bytes = generator_bytes();
        bytes[64] ^= 0x01;
        assert_eq!(
            codec.decode_public_key(&bytes).unwrap_err(),
            KeyError::InvalidKeyEncoding
        );
    }

    #[test]
    fn private_key_one_maps_to_generator() {
        let codec = KeyCodec::default();
        let private = codec.decode_private_key(&scalar_one()).unwrap();
        assert_eq!(private.public_key().to_bytes().to_vec(), generator_bytes());
        assert_eq!(private.to_bytes(), scalar_one());
    }

    #[test]
    fn rejects_wrong_private_key_length() {
        let codec = KeyCodec::default();
        assert_eq!(
            codec.decode_private_key(&[1u8; 31]).unwrap_err(),
            KeyError::InvalidKeyLength {
                expected: 32,
                actual: 31
            }
        );
        assert!(codec.decode_private_key(&[1u8; 33]).is_err());
    }

    #[test]
    fn rejects_zero_scalar() {
        let codec = KeyCodec::default();
        assert_eq!(
            codec.decode_private_key(&[0u8; 32]).unwrap_err(),
            KeyError::InvalidScalar
        );
    }

    #[test]
    fn rejects_scalar_at_or_above_order() {
        let codec = KeyCodec::default();
        let order = hex::decode(ORDER).unwrap();
        assert_eq!(
            codec.decode_private_key(&order).unwrap_err(),
            KeyError::InvalidScalar
        );
        assert!(codec.decode_private_key(&[0xFF; 32]).is_err());

        // n - 1 is the largest valid scalar.
        let mut below = order.clone();
        below[31] -= 1;
        assert!(codec.decode_private_key(&below).is_ok());
    }

    #[test]
    fn debug_does_not_leak_scalar() {
        let codec = KeyCodec::default();
        let private = codec.decode_private_key(&[0x42; 32]).unwrap();
        let debug = format!("{:?}", private);
        assert!(debug.starts_with("PrivateKey(pub="));
        assert!(!debug.contains(&hex::encode([0x42u8; 32])));
    }

    #[test]
    fn fingerprint_is_stable() {
        let codec = KeyCodec::default();
        let key = codec.decode_public_key(&generator_bytes()).unwrap();
        assert_eq!(key.fingerprint().len(), 16);
        assert_eq!(key.fingerprint(), key.clone().fingerprint());
    }

    #[test]
    fn curve_defaults_to_p256() {
        assert_eq!(Curve::default(), Curve::P256);
        assert_eq!(KeyCodec::default().curve().name(), "NIST P-256");
        assert_eq!(Curve::P256.signing_algorithm(), "ECDSA-P256-SHA256");
    }
}
