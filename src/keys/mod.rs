//! Credential and L2 key derivation
//!
//! This module provides:
//! - API credential derivation from a wallet signature (`derive_api_key`)
//! - L2 key-pair derivation from a second signature (`derive_l2_key_pair`)
//! - Keystore composition and validation (`derive_keystore`, `validate_keystore`)
//!
//! Derivation is a pure function of the signature input. The same wallet
//! signature always reproduces the same credentials, which is what lets
//! users recover their account from the wallet alone.

pub mod api_key;
pub mod keystore;
pub mod l2;

// Re-export the derivation surface
pub use api_key::{derive_api_key, ApiKeyCredentials};
pub use keystore::{derive_keystore, validate_keystore, Keystore};
pub use l2::{derive_l2_key_pair, L2KeyPair};

use crate::error::{AuthError, AuthResult};

/// Decode a wallet signature hex string, tolerating a 0x prefix
pub(crate) fn decode_signature_hex(signature: &str) -> AuthResult<Vec<u8>> {
    let trimmed = signature
        .strip_prefix("0x")
        .or_else(|| signature.strip_prefix("0X"))
        .unwrap_or(signature);
    hex::decode(trimmed)
        .map_err(|e| AuthError::InvalidSignatureInput(format!("not valid hex: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_signature_hex_strips_prefix() {
        assert_eq!(decode_signature_hex("0xabcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode_signature_hex("abcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode_signature_hex("0X00ff").unwrap(), vec![0x00, 0xff]);
    }

    #[test]
    fn test_decode_signature_hex_rejects_garbage() {
        assert!(decode_signature_hex("0xzz").is_err());
        assert!(decode_signature_hex("abc").is_err()); // odd length
    }
}
