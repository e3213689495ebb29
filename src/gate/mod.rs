//! Gate Module
//!
//! Decides after the fact whether a computed value was slow enough to cache,
//! and for how long.

mod fetch;
mod options;
mod stats;
mod tier;


// Re-export public types
pub use fetch::Gate;
pub use options::CacheOptions;
pub use stats::{GateStats, GateStatsSnapshot};
pub use tier::{ThresholdTable, ThresholdTier, TierSpec};
