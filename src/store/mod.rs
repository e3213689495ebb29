//! Store Module
//!
//! The backing key-value store the gate reads from and writes to. The gate
//! does not own storage; anything implementing [`CacheBackend`] can sit
//! behind it.

mod memory;

use async_trait::async_trait;

use crate::gate::CacheOptions;

pub use memory::{MemoryStore, MemoryStoreError, MAX_KEY_LENGTH};

// == Cache Backend ==
/// Key-value store collaborator.
///
/// Shared between gates and tasks, so implementations must be safe for
/// concurrent use. Errors are returned to the caller of `fetch` unchanged,
/// boxed inside [`GateError::Store`](crate::error::GateError::Store).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Type of the cached values.
    type Value: Send + Sync;
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the value stored under `key`, or `None` when absent.
    async fn read(
        &self,
        key: &str,
        options: &CacheOptions,
    ) -> Result<Option<Self::Value>, Self::Error>;

    /// Stores `value` under `key`, keeping it for `options.expires_in` when set.
    async fn write(
        &self,
        key: &str,
        value: &Self::Value,
        options: &CacheOptions,
    ) -> Result<(), Self::Error>;
}
