//! The `KeyValueStore` trait: the persistence capability injected into the
//! event store.
//!
//! Implemented by storage backends (e.g. `meet-store-sqlite`) and by
//! [`MemoryStore`](crate::memory::MemoryStore) for tests. Higher layers depend
//! on this abstraction, not on any concrete backend.

use std::future::Future;

/// A persistent, string-keyed, string-valued store.
///
/// Methods return `Send` futures so implementations can be shared across
/// tasks (e.g. by the debounced autosaver).
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`, if any.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `key`. Removing a missing key is not an error.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All keys starting with `prefix`, in ascending order.
  fn keys_with_prefix<'a>(
    &'a self,
    prefix: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;
}
