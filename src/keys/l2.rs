//! L2 key-pair derivation on the Stark curve

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use starknet_crypto::FieldElement;
use starknet_curve::{curve_params, AffinePoint, ProjectivePoint};

use crate::error::{AuthError, AuthResult};

use super::decode_signature_hex;

/// The curve's scalar field holds 251 bits; dropping the low 5 bits of a
/// 256-bit digest guarantees the scalar fits without modular reduction.
const SCALAR_SHIFT_BITS: u32 = 5;

/// Key pair on the exchange's settlement curve.
///
/// All three values are normalized 64-char lowercase hex without a 0x
/// prefix, left-padded with zeros.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2KeyPair {
    /// Private scalar
    pub l2_private_key: String,
    /// Public point X coordinate
    pub l2_public_key: String,
    /// Public point Y coordinate
    pub l2_public_key_y: String,
}

impl L2KeyPair {
    /// True iff all three fields are non-empty
    pub fn is_complete(&self) -> bool {
        !self.l2_private_key.is_empty()
            && !self.l2_public_key.is_empty()
            && !self.l2_public_key_y.is_empty()
    }

    /// Parse the private key back into a field element for signing
    pub fn private_key_felt(&self) -> AuthResult<FieldElement> {
        FieldElement::from_hex_be(&self.l2_private_key)
            .map_err(|e| AuthError::InvalidSignatureInput(format!("bad private key: {}", e)))
    }
}

impl fmt::Debug for L2KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("L2KeyPair")
            .field("l2_private_key", &"***")
            .field("l2_public_key", &self.l2_public_key)
            .field("l2_public_key_y", &self.l2_public_key_y)
            .finish()
    }
}

/// Derive an L2 key pair from a raw wallet signature.
///
/// The private scalar is `sha256(signature_bytes) >> 5`; the public point
/// is the scalar multiple of the curve generator. The Y coordinate is kept
/// because onboarding registers the full point, not just the X the ECDSA
/// verifier needs.
#[tracing::instrument(skip(signature))]
pub fn derive_l2_key_pair(signature: &str) -> AuthResult<L2KeyPair> {
    let raw = decode_signature_hex(signature)?;
    if raw.is_empty() {
        return Err(AuthError::InvalidSignatureInput(
            "signature decodes to an empty buffer".to_string(),
        ));
    }

    let digest = Sha256::digest(&raw);
    let scalar = BigUint::from_bytes_be(&digest) >> SCALAR_SHIFT_BITS;
    if scalar.is_zero() {
        return Err(AuthError::InvalidSignatureInput(
            "derived scalar is zero".to_string(),
        ));
    }

    let private_key = felt_from_biguint(&scalar)?;
    let public_point = public_point(&private_key);

    let pair = L2KeyPair {
        l2_private_key: to_padded_hex(&private_key),
        l2_public_key: to_padded_hex(&public_point.x),
        l2_public_key_y: to_padded_hex(&public_point.y),
    };

    tracing::debug!(l2_public_key = %pair.l2_public_key, "derived l2 key pair");
    Ok(pair)
}

/// Normalize a field element to 64 lowercase hex chars, no prefix
pub(crate) fn to_padded_hex(felt: &FieldElement) -> String {
    hex::encode(felt.to_bytes_be())
}

/// Multiply the generator by the private scalar, keeping the affine point
fn public_point(private_key: &FieldElement) -> AffinePoint {
    let generator = ProjectivePoint::from_affine_point(&curve_params::GENERATOR);
    let bits = private_key.to_bits_le();
    let point = &generator * &bits[..];
    AffinePoint::from(&point)
}

fn felt_from_biguint(value: &BigUint) -> AuthResult<FieldElement> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(AuthError::InvalidSignatureInput(
            "derived scalar exceeds 32 bytes".to_string(),
        ));
    }
    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(&bytes);
    FieldElement::from_bytes_be(&buf)
        .map_err(|e| AuthError::InvalidSignatureInput(format!("scalar outside field: {}", e)))
}
