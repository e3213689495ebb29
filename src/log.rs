//! Logging Module
//!
//! The gate reports its cache writes through an injected [`Logger`] rather
//! than a process-wide default.
//!
//! - `TracingLogger`: delegates to the `tracing` crate
//! - `NoOpLogger`: discards everything

use std::fmt::Arguments;

// == Logger Trait ==
/// Sink for the gate's informational messages.
///
/// Shared across gates and tasks, so implementations must be `Send + Sync`.
pub trait Logger: Send + Sync {
    /// Records an informational message.
    fn info(&self, args: Arguments<'_>);
}

// == Tracing Logger ==
/// Logger that forwards to `tracing::info!` under the `cache_if_slow` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, args: Arguments<'_>) {
        tracing::info!(target: "cache_if_slow", "{}", args);
    }
}

// == No-Op Logger ==
/// Logger that discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn info(&self, _args: Arguments<'_>) {}
}
