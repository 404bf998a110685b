//! crt.sh certificate-transparency lookups
//!
//! Provides a client for the crt.sh search endpoint and the normalization
//! of its loosely-typed JSON records into [`Certificate`] values:
//! - Whitespace-separated subject names split into a list
//! - Zone-less timestamp strings parsed as UTC
//! - Unparseable timestamps left unset and reported as warnings

mod client;
pub mod normalize;
mod types;

pub use client::{
    get, get_blocking, CrtShClient, Normalized, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};
pub use types::{Certificate, FieldWarning, LookupResult, TimestampField};
