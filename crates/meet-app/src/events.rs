//! [`EventStore`]: best-effort persistence of event snapshots and their
//! index over an injected [`KeyValueStore`].
//!
//! Storage layout:
//!
//! | key                  | value                              |
//! |----------------------|------------------------------------|
//! | `meet.index`         | JSON list of [`EventIndexEntry`]   |
//! | `meet.event.<id>`    | JSON [`EventSnapshot`]             |
//! | `meet.theme`         | `light` or `dark`                  |
//! | `meet.last_open`     | event id                           |
//!
//! Nothing here returns an error. Reads of missing or corrupt data fall back
//! to empty defaults and failed writes are logged and dropped, so the caller
//! stays usable when durability is lost.

use chrono::Utc;
use meet_core::{
  event::{EventId, EventIndexEntry, EventSnapshot, Theme},
  store::KeyValueStore,
};
use serde::{Serialize, de::DeserializeOwned};

pub const INDEX_KEY: &str = "meet.index";
pub const EVENT_PREFIX: &str = "meet.event.";
pub const THEME_KEY: &str = "meet.theme";
pub const LAST_OPEN_KEY: &str = "meet.last_open";

pub fn event_key(id: &EventId) -> String { format!("{EVENT_PREFIX}{id}") }

/// Event persistence over a key-value backend.
#[derive(Debug, Clone)]
pub struct EventStore<S> {
  kv: S,
}

impl<S: KeyValueStore> EventStore<S> {
  pub fn new(kv: S) -> Self { Self { kv } }

  pub fn backend(&self) -> &S { &self.kv }

  // ── Raw access ──────────────────────────────────────────────────────────

  async fn read_raw(&self, key: &str) -> Option<String> {
    match self.kv.get(key).await {
      Ok(value) => value,
      Err(e) => {
        tracing::warn!(key, error = %e, "storage read failed");
        None
      }
    }
  }

  async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let raw = self.read_raw(key).await?;
    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(e) => {
        tracing::warn!(key, error = %e, "ignoring corrupt stored value");
        None
      }
    }
  }

  /// Returns whether the value was stored.
  async fn write_raw(&self, key: &str, value: String) -> bool {
    match self.kv.set(key, value).await {
      Ok(()) => true,
      Err(e) => {
        tracing::warn!(key, error = %e, "storage write failed; change not persisted");
        false
      }
    }
  }

  async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
      Ok(json) => self.write_raw(key, json).await,
      Err(e) => {
        tracing::warn!(key, error = %e, "could not serialise value");
        false
      }
    }
  }

  async fn remove(&self, key: &str) {
    if let Err(e) = self.kv.remove(key).await {
      tracing::warn!(key, error = %e, "storage remove failed");
    }
  }

  // ── Index ───────────────────────────────────────────────────────────────

  /// The stored index; empty if missing or unreadable.
  pub async fn load_index(&self) -> Vec<EventIndexEntry> {
    self.read_json(INDEX_KEY).await.unwrap_or_default()
  }

  pub async fn save_index(&self, entries: &[EventIndexEntry]) -> bool {
    self.write_json(INDEX_KEY, &entries).await
  }

  /// The index, most recently updated first.
  pub async fn list_events(&self) -> Vec<EventIndexEntry> {
    let mut entries = self.load_index().await;
    entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    entries
  }

  // ── Snapshots ───────────────────────────────────────────────────────────

  pub async fn load_event(&self, id: &EventId) -> Option<EventSnapshot> {
    self.read_json(&event_key(id)).await
  }

  /// Store a snapshot without touching the index. Returns whether it was
  /// stored.
  pub async fn save_event(&self, id: &EventId, snapshot: &EventSnapshot) -> bool {
    self.write_json(&event_key(id), snapshot).await
  }

  /// Remove an event's snapshot and index entry, and forget it as the last
  /// opened event.
  pub async fn delete_event(&self, id: &EventId) {
    self.remove(&event_key(id)).await;

    let mut index = self.load_index().await;
    let before = index.len();
    index.retain(|e| &e.id != id);
    if index.len() != before {
      self.save_index(&index).await;
    }

    if self.last_open().await.as_ref() == Some(id) {
      self.set_last_open(None).await;
    }
    tracing::info!(event = %id, "deleted event");
  }

  /// Create, persist and index a new empty event.
  pub async fn create_event(&self, title: &str) -> (EventId, EventSnapshot) {
    let id = EventId::generate();
    let snapshot = EventSnapshot::new(title);
    self.touch(&id, &snapshot).await;
    tracing::info!(event = %id, title, "created event");
    (id, snapshot)
  }

  /// Persist a snapshot and bring its index entry up to date, creating the
  /// entry if there is none. `updated_at` never moves backwards.
  ///
  /// The index is left alone when the snapshot write fails, so every entry
  /// names a stored event. Returns whether the snapshot was stored.
  pub async fn touch(&self, id: &EventId, snapshot: &EventSnapshot) -> bool {
    if !self.save_event(id, snapshot).await {
      return false;
    }

    let now = Utc::now();
    let mut index = self.load_index().await;
    match index.iter_mut().find(|e| &e.id == id) {
      Some(entry) => entry.touch(&snapshot.title, now),
      None => index.push(EventIndexEntry::new(id.clone(), snapshot.title.clone(), now)),
    }
    self.save_index(&index).await;
    true
  }

  /// Add an index entry for `id` if it has none, leaving timestamps of an
  /// existing entry alone.
  pub async fn ensure_indexed(&self, id: &EventId, title: &str) {
    let mut index = self.load_index().await;
    if index.iter().any(|e| &e.id == id) {
      return;
    }
    index.push(EventIndexEntry::new(id.clone(), title, Utc::now()));
    self.save_index(&index).await;
  }

  // ── Preferences ─────────────────────────────────────────────────────────

  pub async fn last_open(&self) -> Option<EventId> {
    self
      .read_raw(LAST_OPEN_KEY)
      .await
      .filter(|s| !s.is_empty())
      .map(EventId::from)
  }

  pub async fn set_last_open(&self, id: Option<&EventId>) {
    match id {
      Some(id) => {
        self.write_raw(LAST_OPEN_KEY, id.to_string()).await;
      }
      None => self.remove(LAST_OPEN_KEY).await,
    }
  }

  /// The stored theme, or `platform_default` when unset or unrecognised.
  pub async fn theme(&self, platform_default: Theme) -> Theme {
    self
      .read_raw(THEME_KEY)
      .await
      .and_then(|s| Theme::parse(&s))
      .unwrap_or(platform_default)
  }

  pub async fn set_theme(&self, theme: Theme) {
    self.write_raw(THEME_KEY, theme.as_str().to_owned()).await;
  }
}
