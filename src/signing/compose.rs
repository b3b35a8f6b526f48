//! Request composition for private endpoints
//!
//! One call per operation: validate the closed parameter record, resolve
//! metadata, run the struct signing on a blocking thread, merge the
//! signature fields into the outgoing body and authenticate the result
//! with HMAC headers. Validation failures surface before any signing
//! work is scheduled.

use serde_json::{json, Value as JsonValue};
use tokio::task;
use tracing::debug;

use crate::auth::{build_auth_headers, AuthRequest};
use crate::config::EdgeXConfig;
use crate::error::{AuthError, AuthResult};
use crate::keys::{ApiKeyCredentials, L2KeyPair};
use crate::metadata::ExchangeMetadata;

use super::types::{
    CrossWithdrawParams, SignOptions, SignatureType, SignedRequest, TradeParams, WithdrawParams,
};
use super::L2Signer;

pub const CREATE_ORDER_PATH: &str = "/v1/private/order/createOrder";
pub const CREATE_WITHDRAWAL_PATH: &str = "/v1/private/assets/createWithdrawal";
pub const CREATE_CROSS_WITHDRAW_PATH: &str = "/v1/private/assets/createCrossWithdraw";

/// Borrowed view of the session state a composition call needs
#[derive(Clone, Copy)]
pub struct SigningContext<'a> {
    pub credentials: &'a ApiKeyCredentials,
    pub key_pair: &'a L2KeyPair,
    pub metadata: &'a ExchangeMetadata,
    pub config: &'a EdgeXConfig,
}

/// Build a fully signed createOrder request
pub async fn build_trade_params(
    ctx: SigningContext<'_>,
    params: &TradeParams,
    signature_type: SignatureType,
    options: &SignOptions,
) -> AuthResult<SignedRequest> {
    params.validate()?;
    let symbol = ctx.metadata.require_symbol(&params.symbol)?.clone();
    let contract_id = symbol.contract_id.clone();
    let signer = L2Signer::new(ctx.key_pair, &ctx.config.chain_id)?;

    let sign_params = params.clone();
    let sign_options = options.clone();
    let signature = run_signing(move || {
        signer.sign_order(&symbol, &sign_params, signature_type, &sign_options)
    })
    .await?;

    let mut body = to_body(params)?;
    let record = body
        .as_object_mut()
        .ok_or_else(|| AuthError::InvalidSignatureInput("params are not an object".to_string()))?;
    record.remove("symbol");
    record.insert("contractId".to_string(), json!(contract_id));
    merge_signature(record, &signature)?;

    let request = authenticated(ctx, CREATE_ORDER_PATH, body.clone(), options.timestamp_ms);
    let headers = build_auth_headers(ctx.credentials, &request)?;

    debug!(path = CREATE_ORDER_PATH, contract_id = %contract_id, "composed order request");
    Ok(SignedRequest {
        path: CREATE_ORDER_PATH.to_string(),
        headers,
        params: body,
    })
}

/// Build a fully signed createWithdrawal request
pub async fn build_eth_withdraw_params(
    ctx: SigningContext<'_>,
    params: &WithdrawParams,
) -> AuthResult<SignedRequest> {
    params.validate()?;
    let signer = L2Signer::new(ctx.key_pair, &ctx.config.chain_id)?;

    let sign_params = params.clone();
    let signature = run_signing(move || signer.sign_withdrawal(&sign_params)).await?;

    let mut body = to_body(params)?;
    let record = body
        .as_object_mut()
        .ok_or_else(|| AuthError::InvalidSignatureInput("params are not an object".to_string()))?;
    merge_signature(record, &signature)?;

    let request = authenticated(ctx, CREATE_WITHDRAWAL_PATH, body.clone(), None);
    let headers = build_auth_headers(ctx.credentials, &request)?;

    debug!(path = CREATE_WITHDRAWAL_PATH, "composed withdrawal request");
    Ok(SignedRequest {
        path: CREATE_WITHDRAWAL_PATH.to_string(),
        headers,
        params: body,
    })
}

/// Build a fully signed createCrossWithdraw request
pub async fn build_cross_withdraw_params(
    ctx: SigningContext<'_>,
    params: &CrossWithdrawParams,
) -> AuthResult<SignedRequest> {
    params.validate()?;
    let signer = L2Signer::new(ctx.key_pair, &ctx.config.chain_id)?;

    let sign_params = params.clone();
    let signature = run_signing(move || signer.sign_cross_withdrawal(&sign_params)).await?;

    let mut body = to_body(params)?;
    let record = body
        .as_object_mut()
        .ok_or_else(|| AuthError::InvalidSignatureInput("params are not an object".to_string()))?;
    merge_signature(record, &signature)?;

    let request = authenticated(ctx, CREATE_CROSS_WITHDRAW_PATH, body.clone(), None);
    let headers = build_auth_headers(ctx.credentials, &request)?;

    debug!(path = CREATE_CROSS_WITHDRAW_PATH, "composed cross-chain withdrawal request");
    Ok(SignedRequest {
        path: CREATE_CROSS_WITHDRAW_PATH.to_string(),
        headers,
        params: body,
    })
}

/// Signing is pure CPU (field arithmetic), so it runs off the async runtime
async fn run_signing<T, F>(f: F) -> AuthResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AuthResult<T> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::SigningFailed(format!("signing task failed: {}", e)))?
}

fn to_body<T: serde::Serialize>(params: &T) -> AuthResult<JsonValue> {
    serde_json::to_value(params)
        .map_err(|e| AuthError::InvalidSignatureInput(format!("params not serializable: {}", e)))
}

fn merge_signature<T: serde::Serialize>(
    record: &mut serde_json::Map<String, JsonValue>,
    signature: &T,
) -> AuthResult<()> {
    let fields = to_body(signature)?;
    let fields = fields
        .as_object()
        .ok_or_else(|| AuthError::InvalidSignatureInput("signature is not an object".to_string()))?;
    for (key, value) in fields {
        record.insert(key.clone(), value.clone());
    }
    Ok(())
}

fn authenticated(
    ctx: SigningContext<'_>,
    path: &str,
    body: JsonValue,
    timestamp_ms: Option<i64>,
) -> AuthRequest {
    let mut request = AuthRequest::new("POST", path)
        .with_body(body)
        .with_app_name(ctx.config.app_name.clone());
    if let Some(ts) = timestamp_ms {
        request = request.with_timestamp_ms(ts);
    }
    request
}
