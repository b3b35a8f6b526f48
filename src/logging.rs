//! Structured logging for the SDK
//!
//! Built on the `tracing` crate with:
//! - JSON output by default (parseable by log aggregation tools)
//! - Pretty-print format for development (`LOG_FORMAT=pretty`)
//! - Log level filtering via `RUST_LOG`
//! - Sanitization helpers so credentials and signatures never reach logs whole
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `edgex_sdk=info` | Log level filter (standard tracing format) |
//! | `LOG_FORMAT` | `json` | Output format: `json` or `pretty` |
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use edgex_sdk::logging::{init_logging, sanitize};
//!
//! init_logging();
//!
//! let api_key = "7969ec0f-cb8b-648d-fde2-4b1d0ae24568";
//! tracing::info!(api_key = %sanitize(api_key), "credentials derived");
//! // Output: api_key = "7969...REDACTED"
//! ```

use std::env;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt as ts_fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Flag to track if logging has been initialized (prevents double-init)
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "edgex_sdk=info";

/// Field name patterns that must never be logged verbatim.
///
/// Wrap matching values with [`sanitize`] / [`sanitize_signature`] before
/// logging, and add `skip(...)` to `#[instrument]` on functions that take
/// them as parameters.
pub const SENSITIVE_FIELD_PATTERNS: &[&str] = &[
    "api_key",
    "api_secret",
    "api_passphrase",
    "private_key",
    "secret",
    "signature",
    "keystore",
    "credential",
];

/// Wrapper for sensitive data that is redacted when displayed.
///
/// Values longer than 8 characters show their first 4 characters followed
/// by "...REDACTED"; shorter values are fully redacted.
#[derive(Clone)]
pub struct SanitizedValue<'a>(&'a str);

impl<'a> SanitizedValue<'a> {
    /// Create a new sanitized wrapper around a sensitive string value.
    pub fn new(value: &'a str) -> Self {
        Self(value)
    }

    /// Get the actual value, for processing only, never for logging.
    pub fn expose(&self) -> &str {
        self.0
    }
}

impl<'a> fmt::Display for SanitizedValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 8 {
            write!(f, "{}...REDACTED", &self.0[..4])
        } else {
            write!(f, "REDACTED")
        }
    }
}

impl<'a> fmt::Debug for SanitizedValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SanitizedValue(***)")
    }
}

/// Shorthand for `SanitizedValue::new(value)`.
pub fn sanitize(value: &str) -> SanitizedValue<'_> {
    SanitizedValue::new(value)
}

/// Sanitize a signature by showing only the first 8 characters.
///
/// Signatures here are 128-char hex strings, so a longer prefix still
/// protects the value while keeping log lines correlatable.
pub fn sanitize_signature(sig: &str) -> String {
    if sig.len() > 12 {
        format!("{}...", &sig[..8])
    } else {
        "REDACTED".to_string()
    }
}

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter string (e.g., "edgex_sdk=debug,edgex_sdk::signing=trace")
    pub level_filter: String,
    /// Use pretty format instead of JSON
    pub use_pretty_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT` into a config.
    pub fn from_env() -> Self {
        let level_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "pretty")
            .unwrap_or(false);

        Self {
            level_filter,
            use_pretty_format,
        }
    }
}

/// Initialize the logging system from environment variables.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::from_env());
}

/// Initialize the logging system with a specific configuration.
pub fn init_logging_with_config(config: LoggingConfig) {
    // Prevent double initialization
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if config.use_pretty_format {
        // Human-readable format for development
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    } else {
        // JSON format for production (default)
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_current_span(true),
            )
            .with(env_filter)
            .init();
    }
}

/// Initialize logging for tests with a specific level.
///
/// Tests may run in parallel, so double-init errors are ignored.
#[cfg(test)]
pub fn init_test_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
