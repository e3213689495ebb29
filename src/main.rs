//! Cache If Slow - demo runner
//!
//! Simulates computations of the given lengths (in milliseconds) against an
//! in-memory store and reports what the gate decided for each one.
//!
//! ```text
//! CACHE_IF_SLOW_TIERS='[{"slower_than":0.5,"expires_in":60},{"slower_than":2,"expires_in":600}]' \
//!     cache_if_slow 300 600 2100
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_if_slow::log::TracingLogger;
use cache_if_slow::{CacheBackend, Gate, GateConfig, MemoryStore};

/// Entry point for the demo runner.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load gate configuration from environment variables
/// 3. Build the gate over a fresh in-memory store
/// 4. Fetch each simulated computation twice (miss, then hit if it was cached)
/// 5. Print the gate's counters as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_if_slow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let durations = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("'{}' is not a duration in milliseconds", arg))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    if durations.is_empty() {
        bail!("usage: cache_if_slow <milliseconds>...");
    }

    let config = GateConfig::from_env();
    info!(
        "Configuration loaded: tiers={}, max_duration={:?}, expires_in={:?}",
        config.tiers.len(),
        config.max_duration,
        config.expires_in
    );

    let store = Arc::new(MemoryStore::<String>::new());
    let gate = Gate::from_config(store.clone(), &config, Arc::new(TracingLogger))?;

    for (i, duration) in durations.into_iter().enumerate() {
        let key = format!("job-{}", i);

        for _ in 0..2 {
            let value = gate
                .fetch(&key, config.max_duration, config.default_options(), || async move {
                    tokio::time::sleep(duration).await;
                    Ok::<_, anyhow::Error>(format!("result after {:?}", duration))
                })
                .await?;
            println!("{}: {}", key, value);
        }

        let cached = store.read(&key, &config.default_options()).await?.is_some();
        println!("{}: cached={}", key, cached);
    }

    println!("{}", serde_json::to_string_pretty(&gate.stats())?);
    Ok(())
}
