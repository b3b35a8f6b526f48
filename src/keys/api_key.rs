//! API credential derivation from a wallet signature

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

use super::decode_signature_hex;

/// Exchange API credentials derived from one wallet signature.
///
/// Immutable once created; re-deriving from the same signature yields the
/// same three values.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCredentials {
    /// Key identifier in UUID 8-4-4-4-12 grouping
    pub api_key: String,
    /// HMAC secret, URL-safe base64 without padding
    pub api_secret: String,
    /// Passphrase header value, URL-safe base64 without padding
    pub api_passphrase: String,
}

impl ApiKeyCredentials {
    /// True iff all three fields are non-empty
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty() && !self.api_passphrase.is_empty()
    }
}

impl fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("api_passphrase", &"***")
            .finish()
    }
}

/// Derive API credentials from a raw wallet signature.
///
/// The signature is split into its two 32-byte halves (a trailing recovery
/// byte is ignored) and each half is hashed independently with SHA-256:
/// - `api_key` formats the first 16 bytes of `sha256(second_half)` as a UUID
/// - `api_secret` is all 32 bytes of `sha256(first_half)`, base64url
/// - `api_passphrase` is bytes 16..32 of `sha256(second_half)`, base64url
#[tracing::instrument(skip(signature))]
pub fn derive_api_key(signature: &str) -> AuthResult<ApiKeyCredentials> {
    let raw = decode_signature_hex(signature)?;
    if raw.len() < 64 {
        return Err(AuthError::InvalidSignatureInput(format!(
            "signature is {} bytes, need at least 64",
            raw.len()
        )));
    }

    let first_hash = Sha256::digest(&raw[..32]);
    let second_hash = Sha256::digest(&raw[32..64]);

    let mut key_bytes = [0u8; 16];
    key_bytes.copy_from_slice(&second_hash[..16]);
    let api_key = Uuid::from_bytes(key_bytes).to_string();

    let credentials = ApiKeyCredentials {
        api_key,
        api_secret: URL_SAFE_NO_PAD.encode(first_hash),
        api_passphrase: URL_SAFE_NO_PAD.encode(&second_hash[16..32]),
    };

    tracing::debug!(api_key = %credentials.api_key, "derived api credentials");
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 65-byte test signature (r || s || v), derivation ignores v
    fn test_signature() -> String {
        format!("0x{}{}1c", "ab".repeat(32), "cd".repeat(32))
    }

    #[test]
    fn test_derive_api_key_golden_vector() {
        let creds = derive_api_key(&test_signature()).unwrap();
        assert_eq!(creds.api_key, "7969ec0f-cb8b-648d-fde2-4b1d0ae24568");
        assert_eq!(creds.api_secret, "mi2y4j8VBM0FZgZVOsBJxecY6PnOkjOHbfGnoYIa-IU");
        assert_eq!(creds.api_passphrase, "05jcw6g7gKhQ-XMjjN_T2Q");
    }

    #[test]
    fn test_derive_api_key_is_deterministic() {
        let a = derive_api_key(&test_signature()).unwrap();
        let b = derive_api_key(&test_signature()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_api_key_uuid_grouping() {
        let creds = derive_api_key(&test_signature()).unwrap();
        let groups: Vec<&str> = creds.api_key.split('-').collect();
        assert_eq!(groups.len(), 5);
        let lens: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(lens, vec![8, 4, 4, 4, 12]);
        assert!(creds
            .api_key
            .chars()
            .all(|c| c == '-' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_derive_api_key_rejects_short_input() {
        let short = "0x".to_string() + &"ab".repeat(63);
        let err = derive_api_key(&short).unwrap_err();
        assert!(err.to_string().contains("63 bytes"));
    }

    #[test]
    fn test_derive_api_key_rejects_non_hex() {
        assert!(derive_api_key("0xnothex").is_err());
    }

    #[test]
    fn test_exactly_64_bytes_is_accepted() {
        let sig_no_v = "0x".to_string() + &"ab".repeat(32) + &"cd".repeat(32);
        let with_v = derive_api_key(&test_signature()).unwrap();
        let without_v = derive_api_key(&sig_no_v).unwrap();
        assert_eq!(with_v, without_v);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = derive_api_key(&test_signature()).unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains(&creds.api_key));
        assert!(!debug.contains(&creds.api_secret));
        assert!(!debug.contains(&creds.api_passphrase));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let creds = derive_api_key(&test_signature()).unwrap();
        let json = serde_json::to_value(&creds).unwrap();
        assert!(json.get("apiKey").is_some());
        assert!(json.get("apiSecret").is_some());
        assert!(json.get("apiPassphrase").is_some());
    }
}
