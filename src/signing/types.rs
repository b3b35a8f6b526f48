//! Parameter and result records for L2-signed operations
//!
//! These are closed records: every operation names its fields up front and
//! `validate` rejects a missing one before any hashing happens, naming the
//! field and the operation in the error.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::auth::AuthHeaders;
use crate::error::{AuthError, AuthResult};

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
        }
    }
}

/// Which leg of a trade the signature covers.
///
/// A trade with attached take-profit / stop-loss legs needs one signature
/// per leg; the signature type selects which sub-record (top level, TP leg
/// or SL leg) feeds the struct hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureType {
    MainOrder,
    OpenTakeProfit,
    OpenStopLoss,
}

impl SignatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureType::MainOrder => "MAIN_ORDER",
            SignatureType::OpenTakeProfit => "OPEN_TAKE_PROFIT",
            SignatureType::OpenStopLoss => "OPEN_STOP_LOSS",
        }
    }
}

/// Attached take-profit or stop-loss leg of a trade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerLeg {
    pub side: OrderSide,
    /// Quantity, decimal string
    pub size: String,
    /// Execution price, decimal string
    pub price: String,
    /// Trigger price, decimal string. Not part of the signed record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<String>,
}

/// Parameters for a signed trade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeParams {
    /// Account id, decimal string. Doubles as the signing position id.
    pub account_id: String,
    /// Symbol, e.g. "BTC-USDT"
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Quantity, decimal string
    pub size: String,
    /// Limit price, decimal string. Ignored for market orders.
    #[serde(default)]
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<TriggerLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<TriggerLeg>,
}

impl TradeParams {
    pub fn validate(&self) -> AuthResult<()> {
        let operation = "createOrder";
        require_field(operation, "accountId", &self.account_id)?;
        require_field(operation, "symbol", &self.symbol)?;
        require_field(operation, "size", &self.size)?;
        if self.order_type == OrderType::Limit {
            require_field(operation, "price", &self.price)?;
        }
        Ok(())
    }
}

/// Parameters for a signed withdrawal to an L1 address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawParams {
    /// Account id, decimal string
    pub account_id: String,
    /// Asset id, decimal string
    pub coin_id: String,
    /// Amount, decimal string
    pub amount: String,
    /// Destination L1 address, 0x-hex
    pub eth_address: String,
    /// Caller-chosen idempotency id, decimal string
    pub client_withdraw_id: String,
    /// Expiration, unix ms
    #[serde(default)]
    pub expire_time: i64,
}

impl WithdrawParams {
    pub fn validate(&self) -> AuthResult<()> {
        let operation = "createWithdrawal";
        require_field(operation, "accountId", &self.account_id)?;
        require_field(operation, "coinId", &self.coin_id)?;
        require_field(operation, "amount", &self.amount)?;
        require_field(operation, "ethAddress", &self.eth_address)?;
        require_field(operation, "clientWithdrawId", &self.client_withdraw_id)?;
        if self.expire_time <= 0 {
            return Err(AuthError::MissingParameter {
                operation: operation.to_string(),
                field: "expireTime".to_string(),
            });
        }
        Ok(())
    }
}

/// Parameters for a signed cross-chain withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossWithdrawParams {
    /// Sender account id, decimal string
    pub account_id: String,
    /// Asset id, decimal string
    pub coin_id: String,
    /// Amount, decimal string
    pub amount: String,
    /// Destination address on the target chain, 0x-hex
    pub eth_address: String,
    /// Caller-chosen idempotency id, decimal string
    pub client_cross_withdraw_id: String,
    /// Expiration, unix ms
    #[serde(default)]
    pub expire_time: i64,
    /// Bridge receiver public key, 0x-hex
    pub receiver_public_key: String,
    /// Bridge receiver position id, decimal string
    pub receiver_position_id: String,
    /// Target chain id, decimal string
    pub chain_id: String,
}

impl CrossWithdrawParams {
    pub fn validate(&self) -> AuthResult<()> {
        let operation = "createCrossWithdraw";
        require_field(operation, "accountId", &self.account_id)?;
        require_field(operation, "coinId", &self.coin_id)?;
        require_field(operation, "amount", &self.amount)?;
        require_field(operation, "ethAddress", &self.eth_address)?;
        require_field(
            operation,
            "clientCrossWithdrawId",
            &self.client_cross_withdraw_id,
        )?;
        require_field(operation, "receiverPublicKey", &self.receiver_public_key)?;
        require_field(operation, "receiverPositionId", &self.receiver_position_id)?;
        require_field(operation, "chainId", &self.chain_id)?;
        if self.expire_time <= 0 {
            return Err(AuthError::MissingParameter {
                operation: operation.to_string(),
                field: "expireTime".to_string(),
            });
        }
        Ok(())
    }
}

fn require_field(operation: &str, field: &str, value: &str) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::MissingParameter {
            operation: operation.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Explicit overrides for a signing call.
///
/// Defaults produce wall-clock timestamps and a random client order id;
/// pinning both makes the whole signature reproducible.
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Signing time, unix ms. Defaults to now.
    pub timestamp_ms: Option<i64>,
    /// Client order id, decimal string. Defaults to a random one.
    pub client_order_id: Option<String>,
}

/// Signature fields for an order, ready to merge into the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSignature {
    pub client_order_id: String,
    /// L1 expiration, unix ms
    pub expire_time: i64,
    pub nonce: u32,
    /// price * size in quantum units, decimal string
    pub l2_value: String,
    /// Size in quantum units, decimal string
    pub l2_size: String,
    /// Fee cap in quantum units, decimal string
    pub l2_limit_fee: String,
    /// L2 expiration, unix ms
    pub l2_expire_time: i64,
    /// r || s, 128 lowercase hex chars
    pub l2_signature: String,
}

/// Signature fields for a withdrawal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalSignature {
    /// r || s, 128 lowercase hex chars
    pub l2_signature: String,
}

/// A fully prepared private request: auth headers plus the signed body
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub path: String,
    pub headers: AuthHeaders,
    pub params: JsonValue,
}
