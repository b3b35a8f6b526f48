//! edgeX SDK - authentication and signing
//!
//! Everything needed to act as an authenticated edgeX account:
//! - Credential derivation (API key triple and L2 key pair) from wallet signatures
//! - HMAC request authentication headers with canonical parameter encoding
//! - L2 order and withdrawal signatures over the Stark curve
//! - Request composition for the private endpoints

pub mod auth;
pub mod config;
pub mod encoding;
pub mod error;
pub mod keys;
pub mod logging;
pub mod metadata;
pub mod session;
pub mod signing;

pub use auth::{build_auth_headers, validate_auth_headers, AuthHeaders, AuthRequest};
pub use config::EdgeXConfig;
pub use error::{AuthError, AuthResult};
pub use keys::{
    derive_api_key, derive_keystore, derive_l2_key_pair, validate_keystore, ApiKeyCredentials,
    Keystore, L2KeyPair,
};
pub use metadata::{Coin, ExchangeMetadata, SymbolModel};
pub use session::EdgeXSession;
pub use signing::{
    CrossWithdrawParams, L2Signer, OrderSide, OrderSignature, OrderType, SignOptions,
    SignatureType, SignedRequest, TradeParams, TriggerLeg, WithdrawParams, WithdrawalSignature,
};
