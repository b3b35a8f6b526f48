//! Offline signing walkthrough
//!
//! Derives a keystore from wallet signatures, authenticates a sample
//! private request and signs a sample order. Everything runs locally;
//! nothing is sent anywhere.
//!
//! Usage:
//! ```bash
//! cargo run --bin sign_demo
//! ```
//!
//! Optional environment variables:
//! - EDGEX_API_SIGNATURE: onboarding wallet signature (0x-hex)
//! - EDGEX_STARK_SIGNATURE: key-derivation wallet signature (0x-hex)
//! - EDGEX_APP_NAME, EDGEX_CHAIN_ID, EDGEX_PRODUCTION: deployment config
//!
//! Without the signature variables a fixed demo pair is used, so the
//! output is reproducible but NOT a real account.

use std::env;

use serde_json::json;
use tracing::{info, warn};

use edgex_sdk::logging::{init_logging, sanitize_signature};
use edgex_sdk::signing::{OrderSide, OrderType, SignOptions, SignatureType, TradeParams};
use edgex_sdk::{AuthRequest, EdgeXSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    info!("═══════════════════════════════════════════════════════════");
    info!("🔐 edgeX SDK - offline signing walkthrough");
    info!("═══════════════════════════════════════════════════════════");

    let (api_signature, stark_signature) = load_signatures();

    let mut session = EdgeXSession::from_env()?;
    info!(
        chain_id = %session.config().chain_id,
        production = session.config().production,
        "session configured"
    );

    // 1. Derive the keystore from the two wallet signatures
    let keystore = session.derive_keys(&api_signature, &stark_signature)?;
    info!("🔑 apiKey:       {}", keystore.credentials.api_key);
    info!(
        "🔑 l2PublicKey:  {}",
        sanitize_signature(&keystore.l2_key_pair.l2_public_key)
    );

    // 2. Authenticate a sample private GET request
    let request = AuthRequest::new("GET", "/v1/private/account/getPositionTransactionPage")
        .with_query(json!({ "size": "10", "filterTypeList": ["SETTLE_FUNDING_FEE"] }));
    let headers = session.sign_request(&request)?;
    info!("📡 auth headers for {}:", "/v1/private/account/getPositionTransactionPage");
    for (name, value) in &headers {
        if name.ends_with("Signature") {
            info!("   {}: {}", name, sanitize_signature(value));
        } else {
            info!("   {}: {}", name, value);
        }
    }

    // 3. Sign an order against canned metadata
    session.load_metadata(json!({
        "contractList": [{
            "contractId": "10000001",
            "contractName": "BTC-USDT",
            "tickSize": "0.1",
            "takerFeeRate": "0.0005",
            "makerFeeRate": "0.0002",
            "oraclePrice": "30000",
            "stepSize": "0.001"
        }]
    }))?;

    let params = TradeParams {
        account_id: "551109015904453258".to_string(),
        symbol: "BTC-USDT".to_string(),
        side: OrderSide::Buy,
        order_type: OrderType::Limit,
        size: "0.001".to_string(),
        price: "30000".to_string(),
        take_profit: None,
        stop_loss: None,
    };
    let signed = session
        .create_order_params_with(
            &params,
            SignatureType::MainOrder,
            &SignOptions {
                timestamp_ms: None,
                client_order_id: None,
            },
        )
        .await?;

    info!("📝 signed order for POST {}:", signed.path);
    info!(
        "   clientOrderId: {}",
        signed.params["clientOrderId"].as_str().unwrap_or("")
    );
    info!("   nonce:         {}", signed.params["nonce"]);
    info!(
        "   l2Value:       {}",
        signed.params["l2Value"].as_str().unwrap_or("")
    );
    info!(
        "   l2LimitFee:    {}",
        signed.params["l2LimitFee"].as_str().unwrap_or("")
    );
    info!(
        "   l2Signature:   {}",
        sanitize_signature(signed.params["l2Signature"].as_str().unwrap_or(""))
    );

    info!("═══════════════════════════════════════════════════════════");
    info!("✅ done");
    Ok(())
}

fn load_signatures() -> (String, String) {
    match (
        env::var("EDGEX_API_SIGNATURE"),
        env::var("EDGEX_STARK_SIGNATURE"),
    ) {
        (Ok(api), Ok(stark)) => (api, stark),
        _ => {
            warn!("⚠️  EDGEX_API_SIGNATURE / EDGEX_STARK_SIGNATURE not set, using demo signatures");
            (
                format!("0x{}{}1c", "ab".repeat(32), "cd".repeat(32)),
                format!("0x{}{}1b", "12".repeat(32), "34".repeat(32)),
            )
        }
    }
}
