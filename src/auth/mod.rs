//! Per-request HMAC authentication
//!
//! Builds the `X-{app}-*` header family over a canonicalized request
//! description. Stateless; safe to call concurrently.

pub mod headers;

// Re-export the authentication surface
pub use headers::{build_auth_headers, validate_auth_headers, AuthHeaders, AuthRequest};
