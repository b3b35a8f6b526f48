//! Stateful session over the credential, auth and signing layers
//!
//! All derived state is explicit: a session starts empty and only holds
//! what was derived or set on it. Derivations assign state only after they
//! succeed, so a failed call never clobbers working credentials.

use serde_json::Value as JsonValue;
use tracing::info;

use crate::auth::{build_auth_headers, AuthHeaders, AuthRequest};
use crate::config::EdgeXConfig;
use crate::error::{AuthError, AuthResult};
use crate::keys::{
    derive_api_key, derive_keystore, derive_l2_key_pair, ApiKeyCredentials, Keystore, L2KeyPair,
};
use crate::metadata::ExchangeMetadata;
use crate::signing::{
    build_cross_withdraw_params, build_eth_withdraw_params, build_trade_params, CrossWithdrawParams,
    SignOptions, SignatureType, SignedRequest, SigningContext, TradeParams, WithdrawParams,
};

/// One authenticated identity against one deployment.
#[derive(Debug, Clone)]
pub struct EdgeXSession {
    config: EdgeXConfig,
    credentials: Option<ApiKeyCredentials>,
    l2_key_pair: Option<L2KeyPair>,
    metadata: Option<ExchangeMetadata>,
}

impl EdgeXSession {
    pub fn new(config: EdgeXConfig) -> Self {
        Self {
            config,
            credentials: None,
            l2_key_pair: None,
            metadata: None,
        }
    }

    /// Session for the deployment described by the environment
    pub fn from_env() -> AuthResult<Self> {
        let config = EdgeXConfig::from_env();
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EdgeXConfig {
        &self.config
    }

    /// Derive and store API credentials from an onboarding signature
    pub fn derive_credentials(&mut self, signature: &str) -> AuthResult<&ApiKeyCredentials> {
        let credentials = derive_api_key(signature)?;
        info!("API credentials derived");
        Ok(self.credentials.insert(credentials))
    }

    /// Derive and store the L2 key pair from a key-derivation signature
    pub fn derive_l2_keys(&mut self, signature: &str) -> AuthResult<&L2KeyPair> {
        let key_pair = derive_l2_key_pair(signature)?;
        info!("L2 key pair derived");
        Ok(self.l2_key_pair.insert(key_pair))
    }

    /// Derive both credential sets at once, returning the full keystore
    pub fn derive_keys(
        &mut self,
        api_signature: &str,
        stark_signature: &str,
    ) -> AuthResult<Keystore> {
        let keystore = derive_keystore(api_signature, stark_signature)?;
        self.credentials = Some(keystore.credentials.clone());
        self.l2_key_pair = Some(keystore.l2_key_pair.clone());
        info!("keystore derived");
        Ok(keystore)
    }

    pub fn set_credentials(&mut self, credentials: ApiKeyCredentials) {
        self.credentials = Some(credentials);
    }

    pub fn set_l2_key_pair(&mut self, key_pair: L2KeyPair) {
        self.l2_key_pair = Some(key_pair);
    }

    pub fn set_keystore(&mut self, keystore: Keystore) {
        self.credentials = Some(keystore.credentials);
        self.l2_key_pair = Some(keystore.l2_key_pair);
    }

    pub fn set_metadata(&mut self, metadata: ExchangeMetadata) {
        self.metadata = Some(metadata);
    }

    /// Parse and store exchange metadata from its wire JSON
    pub fn load_metadata(&mut self, json: JsonValue) -> AuthResult<()> {
        self.metadata = Some(ExchangeMetadata::from_json(json)?);
        Ok(())
    }

    /// Drop all derived state, keeping the deployment config
    pub fn reset(&mut self) {
        self.credentials = None;
        self.l2_key_pair = None;
        self.metadata = None;
    }

    pub fn credentials(&self) -> AuthResult<&ApiKeyCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| AuthError::NotSet("API credentials".to_string()))
    }

    pub fn l2_key_pair(&self) -> AuthResult<&L2KeyPair> {
        self.l2_key_pair
            .as_ref()
            .ok_or_else(|| AuthError::NotSet("L2 key pair".to_string()))
    }

    pub fn metadata(&self) -> AuthResult<&ExchangeMetadata> {
        self.metadata
            .as_ref()
            .ok_or_else(|| AuthError::NotSet("Exchange metadata".to_string()))
    }

    /// True once every signed operation can run
    pub fn is_ready(&self) -> bool {
        self.credentials.is_some() && self.l2_key_pair.is_some() && self.metadata.is_some()
    }

    /// Authenticate an arbitrary private request.
    ///
    /// The session's app name applies unless the request pins its own.
    pub fn sign_request(&self, request: &AuthRequest) -> AuthResult<AuthHeaders> {
        let credentials = self.credentials()?;
        let mut request = request.clone();
        if request.app_name.is_none() {
            request.app_name = Some(self.config.app_name.clone());
        }
        build_auth_headers(credentials, &request)
    }

    pub async fn create_order_params(
        &self,
        params: &TradeParams,
        signature_type: SignatureType,
    ) -> AuthResult<SignedRequest> {
        self.create_order_params_with(params, signature_type, &SignOptions::default())
            .await
    }

    pub async fn create_order_params_with(
        &self,
        params: &TradeParams,
        signature_type: SignatureType,
        options: &SignOptions,
    ) -> AuthResult<SignedRequest> {
        build_trade_params(self.signing_context()?, params, signature_type, options).await
    }

    pub async fn create_withdrawal_params(
        &self,
        params: &WithdrawParams,
    ) -> AuthResult<SignedRequest> {
        build_eth_withdraw_params(self.signing_context()?, params).await
    }

    pub async fn create_cross_withdrawal_params(
        &self,
        params: &CrossWithdrawParams,
    ) -> AuthResult<SignedRequest> {
        build_cross_withdraw_params(self.signing_context()?, params).await
    }

    fn signing_context(&self) -> AuthResult<SigningContext<'_>> {
        Ok(SigningContext {
            credentials: self.credentials()?,
            key_pair: self.l2_key_pair()?,
            metadata: self.metadata()?,
            config: &self.config,
        })
    }
}
