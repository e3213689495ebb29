//! Error types for the cache gate
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use thiserror::Error;

/// Boxed backend error, kept as-is so callers can downcast it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Store Operation ==
/// Which backend call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOp::Read => f.write_str("read"),
            StoreOp::Write => f.write_str("write"),
        }
    }
}

// == Gate Error Enum ==
/// Unified error type for the cache gate.
#[derive(Error, Debug)]
pub enum GateError {
    /// A threshold tier is missing one of its durations
    #[error("threshold tier #{index}: `{field}` is required for every tier")]
    Configuration { index: usize, field: &'static str },

    /// No tier table and no per-call ceiling
    #[error("fetch of '{key}' needs a ceiling: no threshold tiers are configured and none was supplied")]
    MissingCeiling { key: String },

    /// The backing store failed
    #[error("cache store {op} failed for key '{key}'")]
    Store {
        op: StoreOp,
        key: String,
        #[source]
        source: BoxError,
    },
}

impl GateError {
    pub(crate) fn store<E>(op: StoreOp, key: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GateError::Store {
            op,
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache gate.
pub type Result<T> = std::result::Result<T, GateError>;
