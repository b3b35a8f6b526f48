//! Authentication header construction and validation

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value as JsonValue;
use sha2::Sha256;

use crate::config::{now_ms, API_PATH_PREFIX, CHANNEL_HEADER, CHANNEL_VALUE, DEFAULT_APP_NAME};
use crate::encoding::{encode_uri_component, to_query_string, Value};
use crate::error::{AuthError, AuthResult};
use crate::keys::ApiKeyCredentials;
use crate::logging::sanitize_signature;

type HmacSha256 = Hmac<Sha256>;

/// Header map for one authenticated request
pub type AuthHeaders = HashMap<String, String>;

/// Description of one REST request to authenticate.
///
/// `query` feeds the signing source for GET requests, `body` for
/// everything else; both are structured JSON values, canonicalized here.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    /// HTTP method, any casing
    pub method: String,
    /// Transport path as sent on the wire (e.g. "/v1/private/order/createOrder")
    pub path: String,
    /// Query parameters for GET signing
    pub query: Option<JsonValue>,
    /// Structured body for non-GET signing
    pub body: Option<JsonValue>,
    /// Header brand; defaults to "EdgeX"
    pub app_name: Option<String>,
    /// Signing timestamp in epoch ms; defaults to the current time
    pub timestamp_ms: Option<i64>,
}

impl AuthRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: JsonValue) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}

/// Ephemeral signing input assembled per request
struct SignatureParams<'a> {
    timestamp: i64,
    http_method: String,
    request_uri: String,
    request_body: String,
    secret: &'a str,
}

impl SignatureParams<'_> {
    /// HMAC-SHA256 over `timestamp + METHOD + uri + body`, lowercase hex.
    ///
    /// The HMAC key is not the raw secret: the secret string is
    /// percent-escaped, then base64-encoded, and the resulting string's
    /// UTF-8 bytes key the MAC. The remote verifier derives its key the
    /// same way, so this transformation is load-bearing.
    fn sign(&self) -> AuthResult<String> {
        let key = derive_hmac_key(self.secret);
        let message = format!(
            "{}{}{}{}",
            self.timestamp, self.http_method, self.request_uri, self.request_body
        );
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| AuthError::SigningFailed(format!("hmac init: {}", e)))?;
        mac.update(message.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Percent-escape then base64-encode the secret into the HMAC key string
fn derive_hmac_key(secret: &str) -> String {
    STANDARD.encode(encode_uri_component(secret))
}

/// Build the authentication headers for one request.
///
/// Fails before any cryptographic work if a credential field, the method,
/// or the path is missing. Returns the four signed `X-{app}-*` headers
/// plus the static channel header.
#[tracing::instrument(skip(credentials, request), fields(method = %request.method, path = %request.path))]
pub fn build_auth_headers(
    credentials: &ApiKeyCredentials,
    request: &AuthRequest,
) -> AuthResult<AuthHeaders> {
    if credentials.api_key.is_empty() {
        return Err(AuthError::MissingCredential("apiKey".to_string()));
    }
    if credentials.api_secret.is_empty() {
        return Err(AuthError::MissingCredential("apiSecret".to_string()));
    }
    if credentials.api_passphrase.is_empty() {
        return Err(AuthError::MissingCredential("apiPassphrase".to_string()));
    }
    if request.method.is_empty() {
        return Err(AuthError::MissingRequestField("method".to_string()));
    }
    if request.path.is_empty() {
        return Err(AuthError::MissingRequestField("path".to_string()));
    }

    let http_method = request.method.to_uppercase();
    let request_body = if http_method == "GET" {
        to_query_string(filtered_get_query(request.query.as_ref()).as_ref())
    } else {
        match &request.body {
            Some(body) if !is_empty_body(body) => to_query_string(Some(&Value::from(body))),
            _ => String::new(),
        }
    };

    let params = SignatureParams {
        timestamp: request.timestamp_ms.unwrap_or_else(now_ms),
        http_method,
        request_uri: signing_uri(&request.path),
        request_body,
        secret: &credentials.api_secret,
    };
    let signature = params.sign()?;
    tracing::debug!(
        uri = %params.request_uri,
        signature = %sanitize_signature(&signature),
        "built auth headers"
    );

    let app_name = request.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME);
    let mut headers = AuthHeaders::new();
    headers.insert(
        format!("X-{}-Api-Key", app_name),
        credentials.api_key.clone(),
    );
    headers.insert(
        format!("X-{}-Passphrase", app_name),
        credentials.api_passphrase.clone(),
    );
    headers.insert(format!("X-{}-Signature", app_name), signature);
    headers.insert(
        format!("X-{}-Timestamp", app_name),
        params.timestamp.to_string(),
    );
    headers.insert(CHANNEL_HEADER.to_string(), CHANNEL_VALUE.to_string());

    Ok(headers)
}

/// True iff all five required headers are present and non-empty
pub fn validate_auth_headers(headers: &AuthHeaders, app_name: &str) -> bool {
    let required = [
        format!("X-{}-Api-Key", app_name),
        format!("X-{}-Passphrase", app_name),
        format!("X-{}-Signature", app_name),
        format!("X-{}-Timestamp", app_name),
        CHANNEL_HEADER.to_string(),
    ];
    required
        .iter()
        .all(|name| headers.get(name).map(|v| !v.is_empty()).unwrap_or(false))
}

/// Resolve the uri the signature covers.
///
/// Versioned private paths ("/v1/…") are signed with the fixed API root
/// prepended when absent. The transport path itself is never altered;
/// only the signed string carries the prefix.
fn signing_uri(path: &str) -> String {
    if is_versioned_path(path) && !path.starts_with("/api/") {
        format!("{}{}", API_PATH_PREFIX, path)
    } else {
        path.to_string()
    }
}

/// "/v1/…", "/v2/…" style paths
fn is_versioned_path(path: &str) -> bool {
    match path.strip_prefix("/v") {
        Some(rest) => rest.chars().next().map_or(false, |c| c.is_ascii_digit()),
        None => false,
    }
}

/// GET signing source: drop null and empty-string entries, join array
/// values with commas, stringify the rest
fn filtered_get_query(query: Option<&JsonValue>) -> Option<Value> {
    let JsonValue::Object(map) = query? else {
        return None;
    };
    let mut entries: Vec<(String, Value)> = Vec::new();
    for (key, val) in map {
        match val {
            JsonValue::Null => continue,
            JsonValue::String(s) if s.is_empty() => continue,
            JsonValue::Array(items) => {
                let joined = items
                    .iter()
                    .map(json_scalar_string)
                    .collect::<Vec<_>>()
                    .join(",");
                entries.push((key.clone(), Value::Scalar(joined)));
            }
            other => entries.push((key.clone(), Value::Scalar(json_scalar_string(other)))),
        }
    }
    Some(Value::Map(entries))
}

fn json_scalar_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn is_empty_body(body: &JsonValue) -> bool {
    match body {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        _ => false,
    }
}
