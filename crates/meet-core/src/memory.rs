//! In-memory [`KeyValueStore`] for tests and ephemeral sessions.

use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex, MutexGuard},
};

use crate::{store::KeyValueStore, Error, Result};

/// An in-memory store with an optional byte quota.
///
/// Cloning is cheap and clones share the same contents. When a quota is set,
/// a write that would push the total size of keys and values past it fails
/// with [`Error::QuotaExceeded`], like a browser's storage would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: Arc<Mutex<BTreeMap<String, String>>>,
  quota:   Option<usize>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// A store that rejects writes once `bytes` would be exceeded.
  pub fn with_quota(bytes: usize) -> Self {
    Self { quota: Some(bytes), ..Self::default() }
  }

  /// Insert a raw value directly, bypassing the quota.
  pub fn insert_raw(&self, key: &str, value: &str) {
    self.lock().insert(key.to_owned(), value.to_owned());
  }

  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.lock().is_empty() }

  fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
    // A poisoned map is still a valid map.
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl KeyValueStore for MemoryStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.lock().get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    let mut entries = self.lock();
    if let Some(quota) = self.quota {
      let used: usize = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
      let needed = key.len() + value.len();
      let available = quota.saturating_sub(used);
      if needed > available {
        return Err(Error::QuotaExceeded { needed, available });
      }
    }
    entries.insert(key.to_owned(), value);
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    self.lock().remove(key);
    Ok(())
  }

  async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
    Ok(
      self
        .lock()
        .keys()
        .filter(|k| k.starts_with(prefix))
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("a").await.unwrap(), None);
    store.set("a", "1".into()).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
    store.remove("a").await.unwrap();
    store.remove("a").await.unwrap();
    assert!(store.is_empty());
  }

  #[tokio::test]
  async fn quota_rejects_oversized_writes() {
    let store = MemoryStore::with_quota(10);
    store.set("k", "12345".into()).await.unwrap();
    let err = store.set("j", "123456789".into()).await.unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded { .. }));
    // Overwriting an existing key only counts the new value.
    store.set("k", "123456789".into()).await.unwrap();
  }

  #[tokio::test]
  async fn prefix_listing_is_sorted() {
    let store = MemoryStore::new();
    store.set("x.b", String::new()).await.unwrap();
    store.set("x.a", String::new()).await.unwrap();
    store.set("y.a", String::new()).await.unwrap();
    assert_eq!(store.keys_with_prefix("x.").await.unwrap(), ["x.a", "x.b"]);
  }
}
