//! Configuration Module
//!
//! Loads the gate's tiers and per-call defaults from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::gate::{CacheOptions, TierSpec};

/// Gate configuration parameters.
///
/// All values can be configured via environment variables; anything missing
/// or unparseable is left unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateConfig {
    /// Threshold tiers, validated when the gate is built
    pub tiers: Vec<TierSpec>,
    /// Default per-call ceiling
    pub max_duration: Option<Duration>,
    /// Fallback retention window when no tier applies
    pub expires_in: Option<Duration>,
}

impl GateConfig {
    /// Creates a new GateConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_IF_SLOW_TIERS` - JSON array of tiers in seconds, e.g.
    ///   `[{"slower_than": 0.5, "expires_in": 60}]` (default: none)
    /// - `CACHE_IF_SLOW_MAX_SECONDS` - Default ceiling in seconds (default: none)
    /// - `CACHE_IF_SLOW_EXPIRES_IN` - Fallback expiry in seconds (default: none)
    ///
    /// Tiers with a missing field are kept as-is so that building the gate
    /// reports which one is wrong.
    pub fn from_env() -> Self {
        Self {
            tiers: env::var("CACHE_IF_SLOW_TIERS")
                .ok()
                .map(|raw| parse_tiers(&raw))
                .unwrap_or_default(),
            max_duration: seconds_var("CACHE_IF_SLOW_MAX_SECONDS"),
            expires_in: seconds_var("CACHE_IF_SLOW_EXPIRES_IN"),
        }
    }

    /// Options to pass on each fetch, carrying the fallback expiry.
    pub fn default_options(&self) -> CacheOptions {
        CacheOptions {
            expires_in: self.expires_in,
            ..CacheOptions::default()
        }
    }
}

fn parse_tiers(raw: &str) -> Vec<TierSpec> {
    match serde_json::from_str(raw) {
        Ok(tiers) => tiers,
        Err(err) => {
            warn!("Ignoring CACHE_IF_SLOW_TIERS: {}", err);
            Vec::new()
        }
    }
}

fn seconds_var(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
