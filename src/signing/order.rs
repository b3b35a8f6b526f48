//! Order signing
//!
//! The signed record for an order leg:
//! size, price, limitFee, symbol, expiration, clientId, positionId, side.
//!
//! Price is a rule, not always the caller's input: market buys sign at ten
//! times the oracle price (an aggressive worst-case bound), market sells at
//! the tick size, limit orders at the literal price. The fee cap is the
//! worse of the taker and maker rates applied to price * size, rounded up
//! to a whole unit.

use rand::Rng;
use rust_decimal::Decimal;
use starknet_crypto::FieldElement;
use tracing::debug;

use crate::config::{now_ms, CLIENT_ID_BOUND, L1_EXPIRE_BUFFER_MS, ORDER_EXPIRE_WINDOW_MS};
use crate::error::{AuthError, AuthResult};
use crate::metadata::SymbolModel;

use super::hash::{
    compute_hash_on_elements, compute_selector, decimal_id_to_felt, decimal_to_quantum_felt,
    nonce_from_client_id, string_to_felt,
};
use super::types::{OrderSide, OrderSignature, OrderType, SignOptions, SignatureType, TradeParams};
use super::L2Signer;

const ORDER_TYPE_STRING: &str =
    "Order(size:felt,price:felt,limitFee:felt,symbol:felt,expiration:felt,clientId:felt,positionId:felt,side:felt)";

impl L2Signer {
    /// Sign one leg of a trade.
    ///
    /// `signature_type` picks the leg: the top-level fields for
    /// `MainOrder`, or the nested take-profit / stop-loss record.
    pub fn sign_order(
        &self,
        symbol: &SymbolModel,
        params: &TradeParams,
        signature_type: SignatureType,
        options: &SignOptions,
    ) -> AuthResult<OrderSignature> {
        params.validate()?;
        let (side, size_input, price_input) = select_leg(params, signature_type)?;

        let size = parse_decimal(size_input, "size")?;
        let price = resolve_price(symbol, params.order_type, side, price_input)?;
        let l2_value = price
            .checked_mul(size)
            .ok_or_else(|| overflow_error("l2Value"))?;
        let fee_rate = symbol.taker_fee_rate.max(symbol.maker_fee_rate);
        let limit_fee = fee_rate
            .checked_mul(l2_value)
            .ok_or_else(|| overflow_error("l2LimitFee"))?
            .ceil();

        let timestamp = options.timestamp_ms.unwrap_or_else(now_ms);
        let expiration = timestamp + ORDER_EXPIRE_WINDOW_MS;
        let l1_expiration = expiration - L1_EXPIRE_BUFFER_MS;

        let client_order_id = options
            .client_order_id
            .clone()
            .unwrap_or_else(generate_client_id);
        let nonce = nonce_from_client_id(&client_order_id);

        let position_id = decimal_id_to_felt(&params.account_id, "accountId")?;
        let struct_hash = compute_hash_on_elements(&[
            compute_selector(ORDER_TYPE_STRING),
            decimal_to_quantum_felt(&size, "size")?,
            decimal_to_quantum_felt(&price, "price")?,
            decimal_to_quantum_felt(&limit_fee, "limitFee")?,
            string_to_felt(&params.symbol),
            FieldElement::from(expiration as u64),
            decimal_id_to_felt(&client_order_id, "clientOrderId")?,
            position_id,
            string_to_felt(side.as_str()),
        ]);
        let l2_signature = self.sign_struct(position_id, struct_hash)?;

        debug!(
            symbol = %params.symbol,
            signature_type = signature_type.as_str(),
            nonce,
            "signed order leg"
        );

        Ok(OrderSignature {
            client_order_id,
            expire_time: l1_expiration,
            nonce,
            l2_value: l2_value.normalize().to_string(),
            l2_size: size.normalize().to_string(),
            l2_limit_fee: limit_fee.normalize().to_string(),
            l2_expire_time: expiration,
            l2_signature,
        })
    }
}

fn select_leg<'a>(
    params: &'a TradeParams,
    signature_type: SignatureType,
) -> AuthResult<(OrderSide, &'a str, &'a str)> {
    match signature_type {
        SignatureType::MainOrder => Ok((params.side, &params.size, &params.price)),
        SignatureType::OpenTakeProfit => {
            let leg = params.take_profit.as_ref().ok_or_else(|| missing_leg("takeProfit"))?;
            Ok((leg.side, &leg.size, &leg.price))
        }
        SignatureType::OpenStopLoss => {
            let leg = params.stop_loss.as_ref().ok_or_else(|| missing_leg("stopLoss"))?;
            Ok((leg.side, &leg.size, &leg.price))
        }
    }
}

fn missing_leg(field: &str) -> AuthError {
    AuthError::MissingParameter {
        operation: "createOrder".to_string(),
        field: field.to_string(),
    }
}

fn overflow_error(field: &str) -> AuthError {
    AuthError::InvalidParameter {
        field: field.to_string(),
        reason: "value too large".to_string(),
    }
}

fn resolve_price(
    symbol: &SymbolModel,
    order_type: OrderType,
    side: OrderSide,
    literal: &str,
) -> AuthResult<Decimal> {
    match order_type {
        OrderType::Limit => parse_decimal(literal, "price"),
        OrderType::Market => match side {
            OrderSide::Buy => {
                let oracle = symbol.oracle_price.ok_or_else(|| AuthError::InvalidParameter {
                    field: "oraclePrice".to_string(),
                    reason: format!("no oracle price for {}", symbol.contract_name),
                })?;
                oracle
                    .checked_mul(Decimal::from(10u64))
                    .ok_or_else(|| overflow_error("oraclePrice"))
            }
            OrderSide::Sell => Ok(symbol.tick_size),
        },
    }
}

pub(crate) fn parse_decimal(value: &str, field: &str) -> AuthResult<Decimal> {
    value.trim().parse::<Decimal>().map_err(|_| AuthError::InvalidParameter {
        field: field.to_string(),
        reason: format!("expected a decimal string, got {:?}", value),
    })
}

fn generate_client_id() -> String {
    rand::thread_rng().gen_range(0..CLIENT_ID_BOUND).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_l2_key_pair;
    use crate::signing::hash::{domain_hash, message_hash};
    use crate::signing::types::TriggerLeg;
    use rust_decimal_macros::dec;

    const TEST_TIMESTAMP_MS: i64 = 1_700_000_000_000;

    fn test_signer() -> L2Signer {
        let signature = format!("0x{}{}1b", "12".repeat(32), "34".repeat(32));
        let pair = derive_l2_key_pair(&signature).unwrap();
        L2Signer::new(&pair, "EDGEX_TESTNET").unwrap()
    }

    fn btc_symbol() -> SymbolModel {
        SymbolModel {
            contract_id: "10000001".to_string(),
            contract_name: "BTC-USDT".to_string(),
            tick_size: dec!(0.1),
            taker_fee_rate: dec!(0.0005),
            maker_fee_rate: dec!(0.0002),
            oracle_price: Some(dec!(30000)),
            step_size: Some(dec!(0.001)),
        }
    }

    fn limit_buy() -> TradeParams {
        TradeParams {
            account_id: "551109015904453258".to_string(),
            symbol: "BTC-USDT".to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            size: "0.001".to_string(),
            price: "30000".to_string(),
            take_profit: None,
            stop_loss: None,
        }
    }

    fn pinned_options() -> SignOptions {
        SignOptions {
            timestamp_ms: Some(TEST_TIMESTAMP_MS),
            client_order_id: Some("123456789012345678".to_string()),
        }
    }

    #[test]
    fn test_sign_order_pinned_fields() {
        let result = test_signer()
            .sign_order(&btc_symbol(), &limit_buy(), SignatureType::MainOrder, &pinned_options())
            .unwrap();

        assert_eq!(result.client_order_id, "123456789012345678");
        assert_eq!(result.nonce, 2_485_637_015);
        assert_eq!(result.l2_expire_time, 1_702_592_000_000);
        assert_eq!(result.expire_time, 1_701_814_400_000);
        assert!(result.expire_time < result.l2_expire_time);
        assert_eq!(result.l2_value, "30");
        assert_eq!(result.l2_size, "0.001");
        // max(0.0005, 0.0002) * 30 = 0.015, rounded up
        assert_eq!(result.l2_limit_fee, "1");
        assert_eq!(result.l2_signature.len(), 128);
    }

    #[test]
    fn test_sign_order_is_deterministic_when_pinned() {
        let signer = test_signer();
        let a = signer
            .sign_order(&btc_symbol(), &limit_buy(), SignatureType::MainOrder, &pinned_options())
            .unwrap();
        let b = signer
            .sign_order(&btc_symbol(), &limit_buy(), SignatureType::MainOrder, &pinned_options())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_order_signature_verifies() {
        let signer = test_signer();
        let result = signer
            .sign_order(&btc_symbol(), &limit_buy(), SignatureType::MainOrder, &pinned_options())
            .unwrap();

        let expiration = TEST_TIMESTAMP_MS + ORDER_EXPIRE_WINDOW_MS;
        let position_id = decimal_id_to_felt("551109015904453258", "accountId").unwrap();
        let struct_hash = compute_hash_on_elements(&[
            compute_selector(ORDER_TYPE_STRING),
            decimal_to_quantum_felt(&dec!(0.001), "size").unwrap(),
            decimal_to_quantum_felt(&dec!(30000), "price").unwrap(),
            decimal_to_quantum_felt(&dec!(1), "limitFee").unwrap(),
            string_to_felt("BTC-USDT"),
            FieldElement::from(expiration as u64),
            decimal_id_to_felt("123456789012345678", "clientOrderId").unwrap(),
            position_id,
            string_to_felt("BUY"),
        ]);
        let expected_hash =
            message_hash(domain_hash("EDGEX_TESTNET"), position_id, struct_hash);

        let r = FieldElement::from_hex_be(&result.l2_signature[..64]).unwrap();
        let s = FieldElement::from_hex_be(&result.l2_signature[64..]).unwrap();
        assert!(starknet_crypto::verify(&signer.public_key(), &expected_hash, &r, &s).unwrap());
    }

    #[test]
    fn test_market_buy_signs_ten_times_oracle() {
        let mut symbol = btc_symbol();
        symbol.oracle_price = Some(dec!(5));
        let mut params = limit_buy();
        params.order_type = OrderType::Market;
        params.price = String::new();
        params.size = "1".to_string();

        let result = test_signer()
            .sign_order(&symbol, &params, SignatureType::MainOrder, &pinned_options())
            .unwrap();
        assert_eq!(result.l2_value, "50");
    }

    #[test]
    fn test_market_sell_signs_at_tick_size() {
        let mut symbol = btc_symbol();
        symbol.tick_size = dec!(0.01);
        let mut params = limit_buy();
        params.side = OrderSide::Sell;
        params.order_type = OrderType::Market;
        params.price = String::new();
        params.size = "1".to_string();

        let result = test_signer()
            .sign_order(&symbol, &params, SignatureType::MainOrder, &pinned_options())
            .unwrap();
        assert_eq!(result.l2_value, "0.01");
    }

    #[test]
    fn test_market_buy_without_oracle_fails() {
        let mut symbol = btc_symbol();
        symbol.oracle_price = None;
        let mut params = limit_buy();
        params.order_type = OrderType::Market;

        let err = test_signer()
            .sign_order(&symbol, &params, SignatureType::MainOrder, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "oraclePrice"
        ));
    }

    #[test]
    fn test_limit_fee_rounds_up() {
        let mut symbol = btc_symbol();
        symbol.taker_fee_rate = dec!(0.001);
        symbol.maker_fee_rate = dec!(0.0002);
        let mut params = limit_buy();
        params.size = "1".to_string();
        params.price = "100500".to_string();

        let result = test_signer()
            .sign_order(&symbol, &params, SignatureType::MainOrder, &pinned_options())
            .unwrap();
        // 0.001 * 100500 = 100.5
        assert_eq!(result.l2_limit_fee, "101");
    }

    #[test]
    fn test_take_profit_leg_signs_leg_fields() {
        let signer = test_signer();
        let mut params = limit_buy();
        params.take_profit = Some(TriggerLeg {
            side: OrderSide::Sell,
            size: "0.001".to_string(),
            price: "33000".to_string(),
            trigger_price: Some("32500".to_string()),
        });

        let main = signer
            .sign_order(&btc_symbol(), &params, SignatureType::MainOrder, &pinned_options())
            .unwrap();
        let tp = signer
            .sign_order(&btc_symbol(), &params, SignatureType::OpenTakeProfit, &pinned_options())
            .unwrap();

        assert_eq!(tp.l2_value, "33");
        assert_ne!(main.l2_signature, tp.l2_signature);
        assert_eq!(main.nonce, tp.nonce);
    }

    #[test]
    fn test_missing_stop_loss_leg_fails() {
        let err = test_signer()
            .sign_order(&btc_symbol(), &limit_buy(), SignatureType::OpenStopLoss, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::MissingParameter { field, .. } if field == "stopLoss"
        ));
    }

    #[test]
    fn test_size_finer_than_quantum_fails() {
        let mut params = limit_buy();
        params.size = "0.0000000001".to_string();
        let err = test_signer()
            .sign_order(&btc_symbol(), &params, SignatureType::MainOrder, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "size"
        ));
    }

    #[test]
    fn test_oversized_price_fails() {
        let mut params = limit_buy();
        params.price = "1000000000000000000000".to_string();
        let err = test_signer()
            .sign_order(&btc_symbol(), &params, SignatureType::MainOrder, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "price"
        ));
    }

    #[test]
    fn test_order_value_overflow_fails() {
        let mut params = limit_buy();
        params.price = Decimal::MAX.to_string();
        params.size = "2".to_string();
        let err = test_signer()
            .sign_order(&btc_symbol(), &params, SignatureType::MainOrder, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "l2Value"
        ));
    }

    #[test]
    fn test_limit_fee_overflow_fails() {
        let mut symbol = btc_symbol();
        symbol.taker_fee_rate = dec!(2);
        let mut params = limit_buy();
        params.price = Decimal::MAX.to_string();
        params.size = "1".to_string();
        let err = test_signer()
            .sign_order(&symbol, &params, SignatureType::MainOrder, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "l2LimitFee"
        ));
    }

    #[test]
    fn test_market_buy_oracle_bound_overflow_fails() {
        let mut symbol = btc_symbol();
        symbol.oracle_price = Some(Decimal::MAX);
        let mut params = limit_buy();
        params.order_type = OrderType::Market;
        params.size = "1".to_string();
        let err = test_signer()
            .sign_order(&symbol, &params, SignatureType::MainOrder, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "oraclePrice"
        ));
    }

    #[test]
    fn test_non_decimal_account_id_fails() {
        let mut params = limit_buy();
        params.account_id = "0xabc".to_string();
        let err = test_signer()
            .sign_order(&btc_symbol(), &params, SignatureType::MainOrder, &pinned_options())
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidParameter { field, .. } if field == "accountId"
        ));
    }

    #[test]
    fn test_defaults_generate_client_id_and_timestamp() {
        let result = test_signer()
            .sign_order(
                &btc_symbol(),
                &limit_buy(),
                SignatureType::MainOrder,
                &SignOptions::default(),
            )
            .unwrap();

        assert!(!result.client_order_id.is_empty());
        assert!(result.client_order_id.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(result.nonce, nonce_from_client_id(&result.client_order_id));
        assert_eq!(
            result.l2_expire_time - result.expire_time,
            L1_EXPIRE_BUFFER_MS
        );
        assert!(result.l2_expire_time > now_ms());
    }

    #[test]
    fn test_generated_client_ids_stay_in_bound() {
        for _ in 0..32 {
            let id = generate_client_id();
            let value: u64 = id.parse().unwrap();
            assert!((0..CLIENT_ID_BOUND).contains(&value));
        }
    }
}
