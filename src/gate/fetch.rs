//! Fetch Module
//!
//! Runs a computation on a cache miss and only stores the result when the
//! computation was slower than the effective ceiling.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::GateConfig;
use crate::error::{GateError, Result, StoreOp};
use crate::gate::{CacheOptions, GateStats, GateStatsSnapshot, ThresholdTable, TierSpec};
use crate::log::Logger;
use crate::store::CacheBackend;

// == Gate ==
/// Conditional cache gate in front of a [`CacheBackend`].
///
/// The store and logger are shared handles; one gate can serve any number of
/// concurrent `fetch` calls. Nothing stops two callers from computing the same
/// key at once: only the write is guarded, by re-reading the key first.
pub struct Gate<S: CacheBackend> {
    store: Arc<S>,
    table: ThresholdTable,
    logger: Arc<dyn Logger>,
    stats: GateStats,
}

impl<S: CacheBackend> Gate<S> {
    // == Constructors ==
    /// Creates a gate without tiers. Every `fetch` must then pass a ceiling.
    pub fn new(store: Arc<S>, logger: Arc<dyn Logger>) -> Self {
        Self::with_table(store, ThresholdTable::default(), logger)
    }

    /// Creates a gate from caller-supplied tiers.
    ///
    /// Fails with [`GateError::Configuration`] on the first tier missing
    /// `slower_than` or `expires_in`. An empty list means no table.
    pub fn with_tiers(
        store: Arc<S>,
        tiers: impl IntoIterator<Item = TierSpec>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self> {
        let table = ThresholdTable::new(tiers)?;
        Ok(Self::with_table(store, table, logger))
    }

    /// Creates a gate around an already validated table.
    pub fn with_table(store: Arc<S>, table: ThresholdTable, logger: Arc<dyn Logger>) -> Self {
        Self {
            store,
            table,
            logger,
            stats: GateStats::new(),
        }
    }

    /// Creates a gate with the tiers from configuration.
    pub fn from_config(store: Arc<S>, config: &GateConfig, logger: Arc<dyn Logger>) -> Result<Self> {
        Self::with_tiers(store, config.tiers.iter().copied(), logger)
    }

    // == Accessors ==
    /// Returns the validated tier table, empty when no tiers were given.
    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Returns the shared backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the decision counters accumulated so far.
    pub fn stats(&self) -> GateStatsSnapshot {
        self.stats.snapshot()
    }

    // == Effective Ceiling ==
    /// Resolves the ceiling a computation must exceed to be cached.
    ///
    /// The table floor applies when no override is given; an override only
    /// takes effect when it is above the floor.
    pub fn effective_ceiling(&self, key: &str, ceiling: Option<Duration>) -> Result<Duration> {
        match (self.table.floor(), ceiling) {
            (Some(floor), Some(ceiling)) => Ok(floor.max(ceiling)),
            (Some(floor), None) => Ok(floor),
            (None, Some(ceiling)) => Ok(ceiling),
            (None, None) => Err(GateError::MissingCeiling {
                key: key.to_string(),
            }),
        }
    }

    // == Lookup Expiry ==
    /// Picks the retention window for a computation that took `elapsed`.
    ///
    /// Uses the most generous tier `elapsed` exceeds, falling back to
    /// `options.expires_in` (possibly `None`) when nothing matches.
    pub fn lookup_expiry(&self, elapsed: Duration, options: &CacheOptions) -> Option<Duration> {
        self.table
            .matching(elapsed)
            .map(|tier| tier.expires_in)
            .or(options.expires_in)
    }

    // == Fetch ==
    /// Returns the value under `key`, computing it on a miss.
    ///
    /// On a hit the stored value is returned and `computation` never runs.
    /// On a miss the computation's result is always returned; it is written
    /// to the store only if it took longer than the effective ceiling and
    /// nobody else stored the key meanwhile.
    ///
    /// Errors from `computation` come back unchanged. Gate failures
    /// ([`GateError::MissingCeiling`], [`GateError::Store`]) are converted
    /// with `E: From<GateError>`, so `anyhow::Error` or `GateError` itself
    /// both work as `E`.
    pub async fn fetch<F, Fut, E>(
        &self,
        key: &str,
        ceiling: Option<Duration>,
        mut options: CacheOptions,
        computation: F,
    ) -> std::result::Result<S::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<S::Value, E>>,
        E: From<GateError>,
    {
        let ceiling = self.effective_ceiling(key, ceiling)?;

        if let Some(value) = self.read(key, &options).await? {
            self.stats.record_hit();
            return Ok(value);
        }
        self.stats.record_miss();

        let start = Instant::now();
        let value = computation().await?;
        let elapsed = start.elapsed();

        if elapsed <= ceiling {
            self.stats.record_skipped_fast();
            return Ok(value);
        }

        // Best effort only: another writer can still land between here and the write
        if self.read(key, &options).await?.is_some() {
            self.stats.record_skipped_raced();
            return Ok(value);
        }

        let expires_in = self.lookup_expiry(elapsed, &options);
        options.expires_in = expires_in;
        self.store
            .write(key, &value, &options)
            .await
            .map_err(|err| GateError::store(StoreOp::Write, key, err))?;
        self.stats.record_write();

        self.logger.info(format_args!(
            "Stored '{}' as {:?} > {:?}, expires_in: {}",
            key,
            elapsed,
            ceiling,
            expires_in.map_or_else(|| "store default".to_string(), |d| format!("{:?}", d)),
        ));

        Ok(value)
    }

    /// Builds a tierless gate for a single call and fetches through it.
    pub async fn fetch_once<F, Fut, E>(
        store: Arc<S>,
        logger: Arc<dyn Logger>,
        key: &str,
        ceiling: Duration,
        options: CacheOptions,
        computation: F,
    ) -> std::result::Result<S::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<S::Value, E>>,
        E: From<GateError>,
    {
        Self::new(store, logger)
            .fetch(key, Some(ceiling), options, computation)
            .await
    }

    async fn read(&self, key: &str, options: &CacheOptions) -> Result<Option<S::Value>> {
        self.store
            .read(key, options)
            .await
            .map_err(|err| GateError::store(StoreOp::Read, key, err))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NoOpLogger;
    use crate::store::MemoryStore;
    use tokio_test::{assert_err, assert_ok};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn mins(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }

    fn tiered_gate() -> Gate<MemoryStore<String>> {
        Gate::with_tiers(
            Arc::new(MemoryStore::new()),
            [
                TierSpec::new(ms(500), mins(1)),
                TierSpec::new(ms(2000), mins(10)),
                TierSpec::new(ms(5000), mins(30)),
            ],
            Arc::new(NoOpLogger),
        )
        .unwrap()
    }

    fn bare_gate() -> Gate<MemoryStore<String>> {
        Gate::new(Arc::new(MemoryStore::new()), Arc::new(NoOpLogger))
    }

    #[test]
    fn test_ceiling_defaults_to_table_floor() {
        assert_eq!(tiered_gate().effective_ceiling("k", None).unwrap(), ms(500));
    }

    #[test]
    fn test_ceiling_override_can_raise() {
        let gate = tiered_gate();
        assert_eq!(gate.effective_ceiling("k", Some(ms(800))).unwrap(), ms(800));
    }

    #[test]
    fn test_ceiling_override_cannot_lower() {
        let gate = tiered_gate();
        assert_eq!(gate.effective_ceiling("k", Some(ms(100))).unwrap(), ms(500));
    }

    #[test]
    fn test_ceiling_without_table_uses_override() {
        assert_eq!(bare_gate().effective_ceiling("k", Some(ms(100))).unwrap(), ms(100));
    }

    #[test]
    fn test_ceiling_missing() {
        let result = bare_gate().effective_ceiling("k", None);
        assert!(matches!(result, Err(GateError::MissingCeiling { key }) if key == "k"));
    }

    #[test]
    fn test_lookup_expiry_by_tier() {
        let gate = tiered_gate();
        let options = CacheOptions::new();
        assert_eq!(gate.lookup_expiry(ms(600), &options), Some(mins(1)));
        assert_eq!(gate.lookup_expiry(ms(2100), &options), Some(mins(10)));
        assert_eq!(gate.lookup_expiry(ms(5001), &options), Some(mins(30)));
    }

    #[test]
    fn test_lookup_expiry_falls_back_to_options() {
        let gate = tiered_gate();
        let options = CacheOptions::new().with_expires_in(mins(3));
        assert_eq!(gate.lookup_expiry(ms(300), &options), Some(mins(3)));
        assert_eq!(gate.lookup_expiry(ms(300), &CacheOptions::new()), None);
    }

    #[test]
    fn test_lookup_expiry_without_table() {
        let gate = bare_gate();
        let options = CacheOptions::new().with_expires_in(mins(3));
        assert_eq!(gate.lookup_expiry(ms(9000), &options), Some(mins(3)));
    }

    #[test]
    fn test_with_tiers_rejects_incomplete_tier() {
        let result = Gate::with_tiers(
            Arc::new(MemoryStore::<String>::new()),
            [TierSpec {
                slower_than: Some(ms(500)),
                expires_in: None,
            }],
            Arc::new(NoOpLogger),
        );
        assert!(matches!(
            result,
            Err(GateError::Configuration {
                field: "expires_in",
                ..
            })
        ));
    }

    #[test]
    fn test_from_config() {
        let config = GateConfig {
            tiers: vec![TierSpec::new(ms(250), mins(5))],
            ..GateConfig::default()
        };
        let gate = Gate::from_config(
            Arc::new(MemoryStore::<String>::new()),
            &config,
            Arc::new(NoOpLogger),
        )
        .unwrap();
        assert_eq!(gate.table().floor(), Some(ms(250)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_slow_miss_is_stored() {
        let gate = tiered_gate();

        let value = gate
            .fetch("k", None, CacheOptions::new(), || async {
                tokio::time::sleep(ms(600)).await;
                Ok::<_, GateError>("computed".to_string())
            })
            .await;
        assert_eq!(assert_ok!(value), "computed");

        let stored = gate.store().read("k", &CacheOptions::new()).await.unwrap();
        assert_eq!(stored.as_deref(), Some("computed"));
        assert_eq!(gate.stats().writes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_fast_miss_is_not_stored() {
        let gate = tiered_gate();

        let value = gate
            .fetch("k", None, CacheOptions::new(), || async {
                tokio::time::sleep(ms(300)).await;
                Ok::<_, GateError>("computed".to_string())
            })
            .await;
        assert_eq!(assert_ok!(value), "computed");

        assert!(gate.store().is_empty().await);
        assert_eq!(gate.stats().skipped_fast, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_elapsed_equal_to_ceiling_not_stored() {
        let gate = tiered_gate();

        let value = gate
            .fetch("k", None, CacheOptions::new(), || async {
                tokio::time::sleep(ms(500)).await;
                Ok::<_, GateError>("computed".to_string())
            })
            .await;
        assert_ok!(value);
        assert!(gate.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_missing_ceiling_skips_computation() {
        let gate = bare_gate();
        let mut ran = false;

        let result = gate
            .fetch("k", None, CacheOptions::new(), || {
                ran = true;
                async { Ok::<_, GateError>("computed".to_string()) }
            })
            .await;

        assert!(matches!(assert_err!(result), GateError::MissingCeiling { .. }));
        assert!(!ran);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_once_uses_flat_ceiling() {
        let store = Arc::new(MemoryStore::new());

        let value = Gate::fetch_once(
            store.clone(),
            Arc::new(NoOpLogger),
            "k",
            ms(100),
            CacheOptions::new().with_expires_in(mins(2)),
            || async {
                tokio::time::sleep(ms(150)).await;
                Ok::<_, GateError>(5u32)
            },
        )
        .await;
        assert_eq!(assert_ok!(value), 5);

        assert_eq!(store.read("k", &CacheOptions::new()).await.unwrap(), Some(5));
    }
}
