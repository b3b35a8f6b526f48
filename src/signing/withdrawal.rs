//! Withdrawal signing
//!
//! Withdrawals carry no clock or generated id: every field of the signed
//! record comes from the caller, so the signature is deterministic by
//! construction. The plain record releases funds to an L1 address; the
//! cross-chain record additionally binds the bridge receiver (public key
//! and position id) and the target chain id.

use starknet_crypto::FieldElement;
use tracing::debug;

use crate::error::AuthResult;

use super::hash::{
    compute_hash_on_elements, compute_selector, decimal_id_to_felt, decimal_to_quantum_felt,
    hex_to_felt,
};
use super::order::parse_decimal;
use super::types::{CrossWithdrawParams, WithdrawParams, WithdrawalSignature};
use super::L2Signer;

const WITHDRAWAL_TYPE_STRING: &str =
    "Withdrawal(amount:felt,coinId:felt,ethAddress:felt,expiration:felt,clientId:felt,positionId:felt)";

const TRANSFER_TYPE_STRING: &str =
    "Transfer(amount:felt,coinId:felt,ethAddress:felt,receiverPublicKey:felt,receiverPositionId:felt,expiration:felt,clientId:felt,positionId:felt,chainId:felt)";

impl L2Signer {
    /// Sign a withdrawal to an L1 address
    pub fn sign_withdrawal(&self, params: &WithdrawParams) -> AuthResult<WithdrawalSignature> {
        params.validate()?;

        let amount = parse_decimal(&params.amount, "amount")?;
        let position_id = decimal_id_to_felt(&params.account_id, "accountId")?;
        let struct_hash = compute_hash_on_elements(&[
            compute_selector(WITHDRAWAL_TYPE_STRING),
            decimal_to_quantum_felt(&amount, "amount")?,
            decimal_id_to_felt(&params.coin_id, "coinId")?,
            hex_to_felt(&params.eth_address, "ethAddress")?,
            FieldElement::from(params.expire_time as u64),
            decimal_id_to_felt(&params.client_withdraw_id, "clientWithdrawId")?,
            position_id,
        ]);
        let l2_signature = self.sign_struct(position_id, struct_hash)?;

        debug!(coin_id = %params.coin_id, "signed withdrawal");
        Ok(WithdrawalSignature { l2_signature })
    }

    /// Sign a cross-chain withdrawal
    pub fn sign_cross_withdrawal(
        &self,
        params: &CrossWithdrawParams,
    ) -> AuthResult<WithdrawalSignature> {
        params.validate()?;

        let amount = parse_decimal(&params.amount, "amount")?;
        let position_id = decimal_id_to_felt(&params.account_id, "accountId")?;
        let struct_hash = compute_hash_on_elements(&[
            compute_selector(TRANSFER_TYPE_STRING),
            decimal_to_quantum_felt(&amount, "amount")?,
            decimal_id_to_felt(&params.coin_id, "coinId")?,
            hex_to_felt(&params.eth_address, "ethAddress")?,
            hex_to_felt(&params.receiver_public_key, "receiverPublicKey")?,
            decimal_id_to_felt(&params.receiver_position_id, "receiverPositionId")?,
            FieldElement::from(params.expire_time as u64),
            decimal_id_to_felt(&params.client_cross_withdraw_id, "clientCrossWithdrawId")?,
            position_id,
            decimal_id_to_felt(&params.chain_id, "chainId")?,
        ]);
        let l2_signature = self.sign_struct(position_id, struct_hash)?;

        debug!(
            coin_id = %params.coin_id,
            chain_id = %params.chain_id,
            "signed cross-chain withdrawal"
        );
        Ok(WithdrawalSignature { l2_signature })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::keys::derive_l2_key_pair;
    use crate::signing::hash::{domain_hash, message_hash};
    use rust_decimal_macros::dec;

    fn test_signer() -> L2Signer {
        let signature = format!("0x{}{}1b", "12".repeat(32), "34".repeat(32));
        let pair = derive_l2_key_pair(&signature).unwrap();
        L2Signer::new(&pair, "EDGEX_TESTNET").unwrap()
    }

    fn withdraw_params() -> WithdrawParams {
        WithdrawParams {
            account_id: "551109015904453258".to_string(),
            coin_id: "1000".to_string(),
            amount: "100.5".to_string(),
            eth_address: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            client_withdraw_id: "987654321098765432".to_string(),
            expire_time: 1_702_592_000_000,
        }
    }

    fn cross_params() -> CrossWithdrawParams {
        CrossWithdrawParams {
            account_id: "551109015904453258".to_string(),
            coin_id: "1000".to_string(),
            amount: "100.5".to_string(),
            eth_address: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            client_cross_withdraw_id: "987654321098765432".to_string(),
            expire_time: 1_702_592_000_000,
            receiver_public_key: format!("0x{}", "7a".repeat(31)),
            receiver_position_id: "1001".to_string(),
            chain_id: "11155111".to_string(),
        }
    }

    #[test]
    fn test_sign_withdrawal_is_deterministic_and_verifies() {
        let signer = test_signer();
        let params = withdraw_params();

        let a = signer.sign_withdrawal(&params).unwrap();
        let b = signer.sign_withdrawal(&params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.l2_signature.len(), 128);

        let position_id = decimal_id_to_felt(&params.account_id, "accountId").unwrap();
        let struct_hash = compute_hash_on_elements(&[
            compute_selector(WITHDRAWAL_TYPE_STRING),
            decimal_to_quantum_felt(&dec!(100.5), "amount").unwrap(),
            decimal_id_to_felt("1000", "coinId").unwrap(),
            hex_to_felt(&params.eth_address, "ethAddress").unwrap(),
            FieldElement::from(1_702_592_000_000u64),
            decimal_id_to_felt("987654321098765432", "clientWithdrawId").unwrap(),
            position_id,
        ]);
        let expected_hash =
            message_hash(domain_hash("EDGEX_TESTNET"), position_id, struct_hash);

        let r = FieldElement::from_hex_be(&a.l2_signature[..64]).unwrap();
        let s = FieldElement::from_hex_be(&a.l2_signature[64..]).unwrap();
        assert!(starknet_crypto::verify(&signer.public_key(), &expected_hash, &r, &s).unwrap());
    }

    #[test]
    fn test_sign_withdrawal_rejects_missing_field() {
        let mut params = withdraw_params();
        params.eth_address = String::new();
        let err = test_signer().sign_withdrawal(&params).unwrap_err();
        assert!(matches!(
            err,
            AuthError::MissingParameter { operation, field }
                if operation == "createWithdrawal" && field == "ethAddress"
        ));
    }

    #[test]
    fn test_sign_withdrawal_rejects_bad_address() {
        let mut params = withdraw_params();
        params.eth_address = "not-hex".to_string();
        let err = test_signer().sign_withdrawal(&params).unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "ethAddress"
        ));
    }

    #[test]
    fn test_sign_withdrawal_rejects_fine_amount() {
        let mut params = withdraw_params();
        params.amount = "0.000000001".to_string();
        let err = test_signer().sign_withdrawal(&params).unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "amount"
        ));
    }

    #[test]
    fn test_cross_withdrawal_binds_receiver() {
        let signer = test_signer();
        let base = signer.sign_cross_withdrawal(&cross_params()).unwrap();

        let mut other = cross_params();
        other.receiver_position_id = "1002".to_string();
        let changed = signer.sign_cross_withdrawal(&other).unwrap();

        assert_ne!(base.l2_signature, changed.l2_signature);
    }

    #[test]
    fn test_cross_and_plain_signatures_differ() {
        let signer = test_signer();
        let plain = signer.sign_withdrawal(&withdraw_params()).unwrap();
        let cross = signer.sign_cross_withdrawal(&cross_params()).unwrap();
        assert_ne!(plain.l2_signature, cross.l2_signature);
    }

    #[test]
    fn test_cross_withdrawal_requires_expire_time() {
        let mut params = cross_params();
        params.expire_time = 0;
        let err = test_signer().sign_cross_withdrawal(&params).unwrap_err();
        assert!(matches!(
            err,
            AuthError::MissingParameter { field, .. } if field == "expireTime"
        ));
    }
}
