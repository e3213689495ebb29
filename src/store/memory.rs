//! Memory Store Module
//!
//! HashMap-backed [`CacheBackend`] with lazy expiry. It has no capacity bound
//! and no background cleanup: expired entries are dropped when read.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::gate::CacheOptions;
use crate::store::CacheBackend;

/// Maximum allowed key length in bytes, namespace included
pub const MAX_KEY_LENGTH: usize = 256;

// == Memory Store Error ==
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("Key exceeds maximum length of {} bytes: {0} bytes", MAX_KEY_LENGTH)]
    KeyTooLong(usize),
}

// == Stored Entry ==
#[derive(Debug, Clone)]
struct StoredEntry<V> {
    value: V,
    /// None = no expiration
    expires_at: Option<Instant>,
}

impl<V> StoredEntry<V> {
    /// A TTL too large to represent as an instant never expires.
    fn new(value: V, expires_in: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: expires_in.and_then(|ttl| Instant::now().checked_add(ttl)),
        }
    }

    /// Expired once the current time reaches the expiration time.
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }
}

// == Memory Store ==
/// In-process store for demos and tests.
///
/// Honours `expires_in`, and the `namespace` extra option by storing under
/// `namespace:key`.
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, StoredEntry<V>>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> MemoryStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until read.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn full_key(key: &str, options: &CacheOptions) -> Result<String, MemoryStoreError> {
        let full = match options.extra("namespace").and_then(|ns| ns.as_str()) {
            Some(namespace) => format!("{}:{}", namespace, key),
            None => key.to_string(),
        };

        if full.len() > MAX_KEY_LENGTH {
            return Err(MemoryStoreError::KeyTooLong(full.len()));
        }
        Ok(full)
    }
}

#[async_trait]
impl<V> CacheBackend for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    type Value = V;
    type Error = MemoryStoreError;

    async fn read(&self, key: &str, options: &CacheOptions) -> Result<Option<V>, Self::Error> {
        let key = Self::full_key(key, options)?;

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it unless a fresh write landed in between
        let mut entries = self.entries.write().await;
        if entries.get(&key).is_some_and(StoredEntry::is_expired) {
            entries.remove(&key);
        }
        Ok(None)
    }

    async fn write(&self, key: &str, value: &V, options: &CacheOptions) -> Result<(), Self::Error> {
        let key = Self::full_key(key, options)?;
        let entry = StoredEntry::new(value.clone(), options.expires_in);
        self.entries.write().await.insert(key, entry);
        Ok(())
    }
}
