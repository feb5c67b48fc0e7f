//! Key-value backends.
//!
//! The store never touches ambient storage directly: a [`KeyValueBackend`]
//! is injected at construction. [`MemoryBackend`] serves tests and
//! embeddings without durable storage, [`UnavailableBackend`] models a
//! missing storage scope, and [`crate::SqliteBackend`] persists to disk.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::BackendError;

/// Minimal string key-value capability.
pub trait KeyValueBackend: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Delete `key`. Deleting an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), BackendError>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Arc<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove_item(key)
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Box<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove_item(key)
    }
}

/// In-process backend with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects writes once keys plus values would exceed
    /// `quota_bytes`, the way browser storage does.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let bytes = others + key.len() + value.len();
            if bytes > quota {
                return Err(BackendError::QuotaExceeded {
                    key: key.to_string(),
                    bytes,
                    quota,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Backend for contexts with no storage scope at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl KeyValueBackend for UnavailableBackend {
    fn get_item(&self, _key: &str) -> Result<Option<String>, BackendError> {
        Err(BackendError::Unavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), BackendError> {
        Err(BackendError::Unavailable)
    }

    fn remove_item(&self, _key: &str) -> Result<(), BackendError> {
        Err(BackendError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_set_get_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get_item("a").unwrap(), None);

        backend.set_item("a", "1").unwrap();
        assert_eq!(backend.get_item("a").unwrap().as_deref(), Some("1"));

        backend.set_item("a", "2").unwrap();
        assert_eq!(backend.get_item("a").unwrap().as_deref(), Some("2"));
        assert_eq!(backend.len(), 1);

        backend.remove_item("a").unwrap();
        assert!(backend.is_empty());
        // Removing twice is fine
        backend.remove_item("a").unwrap();
    }

    #[test]
    fn quota_rejects_oversized_writes_and_keeps_old_value() {
        let backend = MemoryBackend::with_quota(8);
        backend.set_item("k", "1234").unwrap();

        let err = backend.set_item("k", "123456789").unwrap_err();
        assert!(matches!(err, BackendError::QuotaExceeded { quota: 8, .. }));
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        let backend = MemoryBackend::with_quota(6);
        backend.set_item("k", "12345").unwrap();
        // Replacing the value must not double-count the old one
        backend.set_item("k", "abcde").unwrap();
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("abcde"));
    }

    #[test]
    fn unavailable_backend_fails_everything() {
        let backend = UnavailableBackend;
        assert!(matches!(
            backend.get_item("a"),
            Err(BackendError::Unavailable)
        ));
        assert!(matches!(
            backend.set_item("a", "b"),
            Err(BackendError::Unavailable)
        ));
        assert!(matches!(
            backend.remove_item("a"),
            Err(BackendError::Unavailable)
        ));
    }

    #[test]
    fn shared_backend_is_visible_through_both_handles() {
        let shared = Arc::new(MemoryBackend::new());
        let other = Arc::clone(&shared);
        shared.set_item("k", "v").unwrap();
        assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
    }
}
