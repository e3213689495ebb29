//! Gate Statistics Module
//!
//! Counts what the gate decided on each fetch: hit, skipped or stored.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Gate Stats ==
/// Decision counters shared by every fetch on one gate.
#[derive(Debug, Default)]
pub struct GateStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    skipped_fast: AtomicU64,
    skipped_raced: AtomicU64,
}

impl GateStats {
    /// Creates a new GateStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Write ==
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Skips ==
    /// The computation finished within the ceiling.
    pub fn record_skipped_fast(&self) {
        self.skipped_fast.fetch_add(1, Ordering::Relaxed);
    }

    /// Another writer populated the key while we were computing.
    pub fn record_skipped_raced(&self) {
        self.skipped_raced.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Returns a point-in-time copy of the counters.
    pub fn snapshot(&self) -> GateStatsSnapshot {
        GateStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            skipped_fast: self.skipped_fast.load(Ordering::Relaxed),
            skipped_raced: self.skipped_raced.load(Ordering::Relaxed),
        }
    }
}

// == Gate Stats Snapshot ==
/// Copy of [`GateStats`] at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateStatsSnapshot {
    /// Fetches answered from the store
    pub hits: u64,
    /// Fetches that ran the computation
    pub misses: u64,
    /// Computed values written to the store
    pub writes: u64,
    /// Misses not cached because they were fast enough
    pub skipped_fast: u64,
    /// Misses not cached because the key was filled meanwhile
    pub skipped_raced: u64,
}

impl GateStatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was fetched yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
