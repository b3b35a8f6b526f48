//! Exchange metadata needed by the order signer
//!
//! The metadata blob (coin list + contract list) is fetched out of band
//! and injected before signing. Tick sizes, fee rates and oracle prices
//! arrive as decimal strings and stay exact through `rust_decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{AuthError, AuthResult};

/// A settlement asset entry from the coin list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_id: String,
    pub coin_name: String,
    /// Smallest withdrawable increment, when the exchange publishes one
    #[serde(default)]
    pub step_size: Option<Decimal>,
}

/// Market metadata for one perpetual contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolModel {
    pub contract_id: String,
    pub contract_name: String,
    /// Minimum price increment; doubles as the market-SELL floor price
    pub tick_size: Decimal,
    pub taker_fee_rate: Decimal,
    pub maker_fee_rate: Decimal,
    /// Reference price bounding market orders; absent outside trading hours
    #[serde(default)]
    pub oracle_price: Option<Decimal>,
    #[serde(default)]
    pub step_size: Option<Decimal>,
}

/// Injected exchange metadata, read-only during signing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeMetadata {
    #[serde(default)]
    pub coin_list: Vec<Coin>,
    #[serde(default)]
    pub contract_list: Vec<SymbolModel>,
}

impl ExchangeMetadata {
    /// Parse the exchange's metadata JSON
    pub fn from_json(json: JsonValue) -> AuthResult<Self> {
        serde_json::from_value(json).map_err(|e| AuthError::InvalidParameter {
            field: "metadata".to_string(),
            reason: e.to_string(),
        })
    }

    /// Look up a contract by its name (e.g. "BTC-USDT")
    pub fn symbol(&self, contract_name: &str) -> Option<&SymbolModel> {
        self.contract_list
            .iter()
            .find(|c| c.contract_name == contract_name)
    }

    /// Look up a contract, failing with `UnknownSymbol` when absent
    pub fn require_symbol(&self, contract_name: &str) -> AuthResult<&SymbolModel> {
        self.symbol(contract_name)
            .ok_or_else(|| AuthError::UnknownSymbol(contract_name.to_string()))
    }

    /// Look up a coin by its id
    pub fn coin(&self, coin_id: &str) -> Option<&Coin> {
        self.coin_list.iter().find(|c| c.coin_id == coin_id)
    }
}
