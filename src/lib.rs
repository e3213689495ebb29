//! Cache If Slow - a gate that caches only expensive computations
//!
//! Wraps a key-value store and, after running a computation on a miss,
//! stores the result only if it took longer than a ceiling, keeping it for a
//! window picked from tiered thresholds.

pub mod config;
pub mod error;
pub mod gate;
pub mod log;
pub mod store;

pub use config::GateConfig;
pub use error::{GateError, Result};
pub use gate::{CacheOptions, Gate, TierSpec};
pub use store::{CacheBackend, MemoryStore};
