//! SDK configuration and protocol constants
//!
//! Protocol constants are part of the remote verifier's scheme and are
//! deliberately not env-overridable; changing them breaks signature
//! verification. Deployment-level settings (app name, chain id, endpoint
//! selection) come from `EDGEX_*` environment variables.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AuthError, AuthResult};

// =============================================================================
// Protocol Constants
// =============================================================================

/// Fixed API root prepended to versioned paths for signing purposes
pub const API_PATH_PREFIX: &str = "/api";

/// Default application name used in the `X-{app}-*` header family
pub const DEFAULT_APP_NAME: &str = "EdgeX";

/// Static channel header sent with every authenticated request
pub const CHANNEL_HEADER: &str = "channel";

/// Value of the static channel header
pub const CHANNEL_VALUE: &str = "official";

/// Order lifetime window in milliseconds (30 days)
pub const ORDER_EXPIRE_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Settlement-layer safety margin in milliseconds (9 days).
///
/// The L1 expiration reported to the exchange is the L2 expiration minus
/// this buffer, so the L1 side always expires first.
pub const L1_EXPIRE_BUFFER_MS: i64 = 9 * 24 * 60 * 60 * 1000;

/// Upper bound (exclusive) for generated decimal client ids
pub const CLIENT_ID_BOUND: u64 = 1_000_000_000_000_000_000;

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// =============================================================================
// Configuration
// =============================================================================

/// Test chain id used across unit tests
#[cfg(test)]
pub(crate) const TEST_CHAIN_ID: &str = "EDGEX_TESTNET";

/// Deployment configuration for an SDK session
#[derive(Debug, Clone)]
pub struct EdgeXConfig {
    /// Application name for the signed header family (e.g. "EdgeX")
    pub app_name: String,
    /// Chain id string bound into the L2 signing domain
    pub chain_id: String,
    /// Use production endpoints (true) or testnet (false)
    pub production: bool,
}

impl EdgeXConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `EDGEX_APP_NAME`, `EDGEX_CHAIN_ID` and `EDGEX_PRODUCTION`;
    /// every variable has a working default.
    pub fn from_env() -> Self {
        let production = std::env::var("EDGEX_PRODUCTION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);
        let app_name =
            std::env::var("EDGEX_APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());
        let chain_id = std::env::var("EDGEX_CHAIN_ID")
            .unwrap_or_else(|_| Self::default_chain_id(production).to_string());

        Self {
            app_name,
            chain_id,
            production,
        }
    }

    /// Default signing-domain chain id for an endpoint tier
    pub fn default_chain_id(production: bool) -> &'static str {
        if production {
            "EDGEX_MAINNET"
        } else {
            "EDGEX_TESTNET"
        }
    }

    /// Get REST API base URL based on production flag
    pub fn rest_base_url(&self) -> String {
        if self.production {
            "https://pro.edgex.exchange".to_string()
        } else {
            "https://testnet.edgex.exchange".to_string()
        }
    }

    /// Get WebSocket base URL based on production flag
    pub fn ws_base_url(&self) -> String {
        if self.production {
            "wss://quote.edgex.exchange".to_string()
        } else {
            "wss://quote-testnet.edgex.exchange".to_string()
        }
    }

    /// Check the configuration is usable for signing
    pub fn validate(&self) -> AuthResult<()> {
        if self.app_name.is_empty() {
            return Err(AuthError::Config("app_name is empty".to_string()));
        }
        if self.chain_id.is_empty() {
            return Err(AuthError::Config("chain_id is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for EdgeXConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            chain_id: Self::default_chain_id(true).to_string(),
            production: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_expiration_windows() {
        assert_eq!(ORDER_EXPIRE_WINDOW_MS, 2_592_000_000);
        assert_eq!(L1_EXPIRE_BUFFER_MS, 777_600_000);
        assert!(L1_EXPIRE_BUFFER_MS < ORDER_EXPIRE_WINDOW_MS);
    }

    #[test]
    fn test_default_config() {
        let config = EdgeXConfig::default();
        assert_eq!(config.app_name, "EdgeX");
        assert_eq!(config.chain_id, "EDGEX_MAINNET");
        assert!(config.production);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_urls() {
        let prod = EdgeXConfig::default();
        assert_eq!(prod.rest_base_url(), "https://pro.edgex.exchange");
        assert!(prod.ws_base_url().starts_with("wss://"));

        let test = EdgeXConfig {
            production: false,
            ..EdgeXConfig::default()
        };
        assert_eq!(test.rest_base_url(), "https://testnet.edgex.exchange");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let config = EdgeXConfig {
            app_name: String::new(),
            ..EdgeXConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EdgeXConfig {
            chain_id: String::new(),
            ..EdgeXConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial(env)]
    fn test_from_env_defaults() {
        std::env::remove_var("EDGEX_APP_NAME");
        std::env::remove_var("EDGEX_CHAIN_ID");
        std::env::remove_var("EDGEX_PRODUCTION");

        let config = EdgeXConfig::from_env();
        assert_eq!(config.app_name, "EdgeX");
        assert_eq!(config.chain_id, "EDGEX_MAINNET");
        assert!(config.production);
    }

    #[test]
    #[serial(env)]
    fn test_from_env_overrides() {
        std::env::set_var("EDGEX_APP_NAME", "EdgeXDev");
        std::env::set_var("EDGEX_PRODUCTION", "0");
        std::env::remove_var("EDGEX_CHAIN_ID");

        let config = EdgeXConfig::from_env();
        assert_eq!(config.app_name, "EdgeXDev");
        assert!(!config.production);
        assert_eq!(config.chain_id, "EDGEX_TESTNET");

        std::env::remove_var("EDGEX_APP_NAME");
        std::env::remove_var("EDGEX_PRODUCTION");
    }

    #[test]
    fn test_now_ms_is_recent() {
        // Any date after 2023-01-01 in ms
        assert!(now_ms() > 1_672_531_200_000);
    }
}
