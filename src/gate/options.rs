//! Cache Options Module
//!
//! Typed options forwarded to the backing store on every read and write.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

// == Cache Options ==
/// Options passed through to the [`CacheBackend`](crate::store::CacheBackend).
///
/// The gate only ever touches `expires_in`, and only right before a write.
/// Anything backend-specific (namespace, serialization hints, ...) rides in
/// `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheOptions {
    /// Retention window; `None` leaves it to the backend default
    pub expires_in: Option<Duration>,
    /// Backend-specific pass-through options
    pub extra: BTreeMap<String, Value>,
}

impl CacheOptions {
    /// Creates empty options: backend default expiry, no extras.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback retention window.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Adds a backend-specific option.
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Looks up a backend-specific option.
    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_empty() {
        let options = CacheOptions::new();
        assert!(options.expires_in.is_none());
        assert!(options.extra.is_empty());
    }

    #[test]
    fn test_options_builders() {
        let options = CacheOptions::new()
            .with_expires_in(Duration::from_secs(30))
            .with_extra("namespace", "reports")
            .with_extra("compress", true);

        assert_eq!(options.expires_in, Some(Duration::from_secs(30)));
        assert_eq!(options.extra("namespace"), Some(&Value::from("reports")));
        assert_eq!(options.extra("compress"), Some(&Value::Bool(true)));
        assert!(options.extra("missing").is_none());
    }
}
