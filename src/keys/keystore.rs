//! Keystore composition and validation

use serde::{Deserialize, Serialize};

use crate::error::AuthResult;

use super::api_key::{derive_api_key, ApiKeyCredentials};
use super::l2::{derive_l2_key_pair, L2KeyPair};

/// Union of the API credentials and the L2 key pair.
///
/// Serializes flat, so a persisted keystore is one JSON object with the
/// six camelCase fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystore {
    #[serde(flatten)]
    pub credentials: ApiKeyCredentials,
    #[serde(flatten)]
    pub l2_key_pair: L2KeyPair,
}

/// Derive a full keystore from the two wallet signatures.
///
/// The first signature feeds API credential derivation, the second the L2
/// key pair. Either failure aborts the whole derivation.
#[tracing::instrument(skip(api_signature, stark_signature))]
pub fn derive_keystore(api_signature: &str, stark_signature: &str) -> AuthResult<Keystore> {
    let credentials = derive_api_key(api_signature)?;
    let l2_key_pair = derive_l2_key_pair(stark_signature)?;
    Ok(Keystore {
        credentials,
        l2_key_pair,
    })
}

/// True iff all six keystore fields are present and non-empty
pub fn validate_keystore(keystore: &Keystore) -> bool {
    keystore.credentials.is_complete() && keystore.l2_key_pair.is_complete()
}
