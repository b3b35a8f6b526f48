//! Authentication and signing error types
//!
//! All credential, canonicalization, and signing failures are wrapped in
//! the AuthError enum which implements thiserror for consistent handling.

use thiserror::Error;

/// Authentication-layer error for derivation, header building, and signing
#[derive(Error, Debug)]
pub enum AuthError {
    /// A credential field (api key, secret, passphrase, L2 key) is missing or empty
    #[error("Missing credential field: {0}")]
    MissingCredential(String),

    /// The request method or path was not supplied
    #[error("Missing request field: {0}")]
    MissingRequestField(String),

    /// A required trade/withdrawal/transfer field was not supplied
    #[error("Missing required field {field} for {operation}")]
    MissingParameter { operation: String, field: String },

    /// A supplied field could not be parsed or quantized
    #[error("Invalid value for {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    /// A wallet signature could not be decoded into derivation input
    #[error("Invalid signature input: {0}")]
    InvalidSignatureInput(String),

    /// Order signing referenced a contract absent from the metadata
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// A session operation ran before the required state was derived/set
    #[error("{0} not set")]
    NotSet(String),

    /// The L2 signing operation itself failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Environment configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for authentication operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;
