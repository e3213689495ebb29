//! Threshold Tier Module
//!
//! Tiers map "the computation took longer than X" to "keep the result for Y".

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{GateError, Result};

// == Tier Spec ==
/// Caller-supplied tier before validation.
///
/// Durations deserialize from fractional seconds, so a JSON tier reads
/// `{"slower_than": 0.5, "expires_in": 60}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TierSpec {
    /// Elapsed time the computation must exceed
    #[serde(default, deserialize_with = "seconds")]
    pub slower_than: Option<Duration>,
    /// Retention window for values matching this tier
    #[serde(default, deserialize_with = "seconds")]
    pub expires_in: Option<Duration>,
}

impl TierSpec {
    /// Creates a fully specified tier.
    pub fn new(slower_than: Duration, expires_in: Duration) -> Self {
        Self {
            slower_than: Some(slower_than),
            expires_in: Some(expires_in),
        }
    }
}

fn seconds<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        Some(secs) => Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// == Threshold Tier ==
/// A validated tier: both durations present and non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdTier {
    pub slower_than: Duration,
    pub expires_in: Duration,
}

impl ThresholdTier {
    /// Validates a spec. `index` is its declaration position, used in errors.
    pub fn from_spec(index: usize, spec: TierSpec) -> Result<Self> {
        let slower_than = spec
            .slower_than
            .filter(|d| !d.is_zero())
            .ok_or(GateError::Configuration {
                index,
                field: "slower_than",
            })?;
        let expires_in = spec
            .expires_in
            .filter(|d| !d.is_zero())
            .ok_or(GateError::Configuration {
                index,
                field: "expires_in",
            })?;

        Ok(Self {
            slower_than,
            expires_in,
        })
    }
}

// == Threshold Table ==
/// Tiers sorted by `slower_than`, largest first. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdTable {
    tiers: Vec<ThresholdTier>,
}

impl ThresholdTable {
    /// Validates every spec in declaration order, then sorts descending.
    ///
    /// The sort is stable, so tiers sharing a `slower_than` keep their
    /// declaration order and the earlier one wins lookups.
    pub fn new(specs: impl IntoIterator<Item = TierSpec>) -> Result<Self> {
        let mut tiers = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| ThresholdTier::from_spec(index, spec))
            .collect::<Result<Vec<_>>>()?;

        tiers.sort_by(|a, b| b.slower_than.cmp(&a.slower_than));
        Ok(Self { tiers })
    }

    /// Smallest `slower_than` in the table, the default ceiling.
    pub fn floor(&self) -> Option<Duration> {
        self.tiers.last().map(|tier| tier.slower_than)
    }

    /// First tier (descending) that `elapsed` strictly exceeds.
    pub fn matching(&self, elapsed: Duration) -> Option<&ThresholdTier> {
        self.tiers.iter().find(|tier| tier.slower_than < elapsed)
    }

    /// Returns the tiers, largest `slower_than` first.
    pub fn tiers(&self) -> &[ThresholdTier] {
        &self.tiers
    }

    /// Returns the number of tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Returns true if no tiers are configured.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
