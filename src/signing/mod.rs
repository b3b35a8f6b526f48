//! L2 signature scheme for orders and withdrawals
//!
//! Every signed operation follows the same pipeline: validate the closed
//! parameter record, build a selector-tagged struct hash, bind it into the
//! chain domain with the message prefix and the signing position id, then
//! ECDSA-sign the result with a deterministic nonce. Signatures are emitted
//! as r || s, 128 lowercase hex chars.

pub mod compose;
pub mod hash;
pub mod order;
pub mod types;
pub mod withdrawal;

pub use compose::{
    build_cross_withdraw_params, build_eth_withdraw_params, build_trade_params, SigningContext,
    CREATE_CROSS_WITHDRAW_PATH, CREATE_ORDER_PATH, CREATE_WITHDRAWAL_PATH,
};
pub use types::{
    CrossWithdrawParams, OrderSide, OrderSignature, OrderType, SignOptions, SignatureType,
    SignedRequest, TradeParams, TriggerLeg, WithdrawParams, WithdrawalSignature,
};

use starknet_crypto::FieldElement;

use crate::error::AuthResult;
use crate::keys::l2::to_padded_hex;
use crate::keys::L2KeyPair;

use hash::{domain_hash, message_hash, sign_message_hash};

/// Order and withdrawal signer for one key pair on one chain.
///
/// The domain hash only depends on the chain id, so it is computed once at
/// construction.
#[derive(Debug, Clone)]
pub struct L2Signer {
    private_key: FieldElement,
    domain: FieldElement,
}

impl L2Signer {
    pub fn new(key_pair: &L2KeyPair, chain_id: &str) -> AuthResult<Self> {
        let private_key = key_pair.private_key_felt()?;
        Ok(Self {
            private_key,
            domain: domain_hash(chain_id),
        })
    }

    /// Sign a struct hash bound to a position id, yielding r || s hex
    pub(crate) fn sign_struct(
        &self,
        position_id: FieldElement,
        struct_hash: FieldElement,
    ) -> AuthResult<String> {
        let hash = message_hash(self.domain, position_id, struct_hash);
        let (r, s) = sign_message_hash(&self.private_key, &hash)?;
        Ok(format!("{}{}", to_padded_hex(&r), to_padded_hex(&s)))
    }

    #[cfg(test)]
    pub(crate) fn public_key(&self) -> FieldElement {
        starknet_crypto::get_public_key(&self.private_key)
    }
}
