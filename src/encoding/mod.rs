//! Canonical encoding of signable parameter records
//!
//! This module provides:
//! - A closed tagged value type (`Value`: scalar | sequence | map)
//! - Deep key sorting (`sort_keys_deep`)
//! - Deterministic query-string flattening (`to_query_string`)
//!
//! Two independent implementations of this encoding must produce identical
//! bytes for the same logical payload; the remote verifier recomputes the
//! HMAC over exactly this serialization.

pub mod query;
pub mod value;

// Re-export the canonicalization surface
pub use query::{encode_uri_component, to_query_string};
pub use value::{sort_keys_deep, Value};
