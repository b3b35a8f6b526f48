//! Typed-data hashing primitives for the L2 signature scheme
//!
//! Signable payloads hash as: selector-tagged struct hash, bound into a
//! chain-specific domain, prefixed and chained with the position id. All
//! hashing is pedersen over field elements; type selectors come from
//! keccak256 masked to 250 bits; symbolic fields use the short-string
//! encoding (up to 31 bytes, big-endian).

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use starknet_crypto::{pedersen_hash, FieldElement};

use crate::error::{AuthError, AuthResult};

/// Domain name bound into every signature
pub const DOMAIN_NAME: &str = "edgeX";

/// Domain schema version
pub const DOMAIN_VERSION: &str = "1";

/// Prefix tagging the final message hash
pub const MESSAGE_PREFIX: &str = "EdgeX Message";

/// Quantum scale: decimal quantities are fixed-point with 8 decimals
pub const QUANTUM_SCALE: u32 = 8;

/// Compute hash on elements using the settlement layer's algorithm:
/// h(h(h(h(0, data[0]), data[1]), ...), data[n-1]), n)
///
/// Starts at 0, chains all elements with pedersen_hash, then appends length
pub fn compute_hash_on_elements(data: &[FieldElement]) -> FieldElement {
    let mut result = FieldElement::ZERO;
    for elem in data {
        result = pedersen_hash(&result, elem);
    }
    let len = FieldElement::from(data.len() as u64);
    pedersen_hash(&result, &len)
}

/// Compute a type selector from a type string.
///
/// Algorithm: keccak256(name) & ((1 << 250) - 1)
pub fn compute_selector(name: &str) -> FieldElement {
    use sha3::{Digest as Sha3Digest, Keccak256};

    let mut hasher = Keccak256::new();
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    // Zero the top 6 bits of the first byte (256 - 250 = 6)
    bytes[0] &= 0x03;

    FieldElement::from_bytes_be(&bytes).unwrap_or(FieldElement::ZERO)
}

/// Convert a string to a field element (short string encoding).
///
/// Short strings are encoded as felt252 (up to 31 chars); longer input is
/// truncated to its first 31 bytes.
pub fn string_to_felt(s: &str) -> FieldElement {
    let bytes = s.as_bytes();
    let take = bytes.len().min(31);
    let mut arr = [0u8; 32];
    arr[32 - take..].copy_from_slice(&bytes[..take]);
    FieldElement::from_bytes_be(&arr).unwrap_or(FieldElement::ZERO)
}

/// Hash the signing domain for one chain id.
///
/// The chain id is the deployment-level separator; a signature for the
/// testnet domain never verifies against mainnet.
pub fn domain_hash(chain_id: &str) -> FieldElement {
    let domain_type_hash =
        compute_selector("EdgeXDomain(name:felt,chainId:felt,version:felt)");
    compute_hash_on_elements(&[
        domain_type_hash,
        string_to_felt(DOMAIN_NAME),
        string_to_felt(chain_id),
        string_to_felt(DOMAIN_VERSION),
    ])
}

/// Final message hash: prefix, domain, signing position, struct hash
pub fn message_hash(
    domain: FieldElement,
    position_id: FieldElement,
    struct_hash: FieldElement,
) -> FieldElement {
    compute_hash_on_elements(&[
        string_to_felt(MESSAGE_PREFIX),
        domain,
        position_id,
        struct_hash,
    ])
}

/// Convert an exact decimal quantity to its quantum field element.
///
/// The value is scaled by 10^8 and must land on an integer; a finer
/// fraction cannot be represented on the settlement layer and is a caller
/// error, not something to round silently.
pub fn decimal_to_quantum_felt(value: &Decimal, field: &str) -> AuthResult<FieldElement> {
    if value.is_sign_negative() {
        return Err(AuthError::InvalidParameter {
            field: field.to_string(),
            reason: format!("negative quantity: {}", value),
        });
    }
    let scaled = value
        .checked_mul(Decimal::from(10u64.pow(QUANTUM_SCALE)))
        .ok_or_else(|| AuthError::InvalidParameter {
            field: field.to_string(),
            reason: format!("{} is too large to quantize", value),
        })?;
    if !scaled.is_integer() {
        return Err(AuthError::InvalidParameter {
            field: field.to_string(),
            reason: format!("{} is finer than 10^-{}", value, QUANTUM_SCALE),
        });
    }
    FieldElement::from_dec_str(&scaled.normalize().to_string()).map_err(|e| {
        AuthError::InvalidParameter {
            field: field.to_string(),
            reason: format!("quantum out of range: {}", e),
        }
    })
}

/// Parse a decimal-string identifier (client id, account id) to a felt
pub fn decimal_id_to_felt(value: &str, field: &str) -> AuthResult<FieldElement> {
    FieldElement::from_dec_str(value).map_err(|_| AuthError::InvalidParameter {
        field: field.to_string(),
        reason: format!("expected a decimal string, got {:?}", value),
    })
}

/// Parse a 0x-prefixed (or bare) hex identifier to a felt
pub fn hex_to_felt(value: &str, field: &str) -> AuthResult<FieldElement> {
    FieldElement::from_hex_be(value).map_err(|e| AuthError::InvalidParameter {
        field: field.to_string(),
        reason: format!("bad hex: {}", e),
    })
}

/// Deterministic nonce for a client id: low 32 bits of sha256(client_id)
pub fn nonce_from_client_id(client_id: &str) -> u32 {
    let digest = Sha256::digest(client_id.as_bytes());
    u32::from_be_bytes([digest[28], digest[29], digest[30], digest[31]])
}

/// ECDSA over the message hash with deterministic RFC 6979 k
pub fn sign_message_hash(
    private_key: &FieldElement,
    hash: &FieldElement,
) -> AuthResult<(FieldElement, FieldElement)> {
    let k = starknet_crypto::rfc6979_generate_k(hash, private_key, None);
    let signature = starknet_crypto::sign(private_key, hash, &k)
        .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
    Ok((signature.r, signature.s))
}
