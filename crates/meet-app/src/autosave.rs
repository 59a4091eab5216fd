//! Debounced autosave.
//!
//! Every edit to an open event schedules a write after a short delay. A new
//! edit to the same event before the delay expires cancels the pending write
//! and starts the delay again, so a burst of edits costs one snapshot write
//! and one index update, and the stored snapshot is always the last one of
//! the burst.

use std::{
  collections::HashMap,
  future::Future,
  hash::Hash,
  sync::{Arc, Mutex, MutexGuard},
  time::Duration,
};

use meet_core::{
  event::{EventId, EventSnapshot},
  store::KeyValueStore,
};
use tokio::task::JoinHandle;

use crate::events::EventStore;

/// Default delay between the last edit and the write.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(350);

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> { m.lock().unwrap_or_else(|e| e.into_inner()) }

// ─── Debouncer ───────────────────────────────────────────────────────────────

/// Runs at most one delayed task per key; scheduling again for a key cancels
/// whatever was pending for it.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer<K> {
  delay:   Duration,
  pending: Mutex<HashMap<K, JoinHandle<()>>>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
  pub fn new(delay: Duration) -> Self { Self { delay, pending: Mutex::new(HashMap::new()) } }

  pub fn delay(&self) -> Duration { self.delay }

  /// Run `task` after the delay unless `key` is rescheduled or cancelled
  /// first.
  pub fn schedule<F>(&self, key: K, task: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let delay = self.delay;
    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      task.await;
    });

    let mut pending = lock(&self.pending);
    pending.retain(|_, h| !h.is_finished());
    if let Some(previous) = pending.insert(key, handle) {
      previous.abort();
    }
  }

  /// Cancel the pending task for `key`. Returns whether one was pending.
  pub fn cancel(&self, key: &K) -> bool {
    match lock(&self.pending).remove(key) {
      Some(handle) => {
        let was_pending = !handle.is_finished();
        handle.abort();
        was_pending
      }
      None => false,
    }
  }

  /// Cancel everything that is pending.
  pub fn cancel_all(&self) {
    for (_, handle) in lock(&self.pending).drain() {
      handle.abort();
    }
  }

  /// Number of tasks still waiting or running.
  pub fn pending(&self) -> usize {
    lock(&self.pending)
      .values()
      .filter(|h| !h.is_finished())
      .count()
  }
}

// ─── AutoSaver ───────────────────────────────────────────────────────────────

/// Debounced writer of event snapshots.
pub struct AutoSaver<S> {
  events:    Arc<EventStore<S>>,
  latest:    Arc<Mutex<HashMap<EventId, EventSnapshot>>>,
  debouncer: Debouncer<EventId>,
}

impl<S: KeyValueStore + 'static> AutoSaver<S> {
  pub fn new(events: Arc<EventStore<S>>, delay: Duration) -> Self {
    Self {
      events,
      latest: Arc::new(Mutex::new(HashMap::new())),
      debouncer: Debouncer::new(delay),
    }
  }

  /// Record that `snapshot` is the new state of event `id` and schedule a
  /// write.
  pub fn snapshot_changed(&self, id: &EventId, snapshot: EventSnapshot) {
    lock(&self.latest).insert(id.clone(), snapshot);

    let events = Arc::clone(&self.events);
    let latest = Arc::clone(&self.latest);
    let key = id.clone();
    self.debouncer.schedule(id.clone(), async move {
      // Stays in `latest` until written, so an aborted write is retried by
      // `flush`.
      let snapshot = lock(&latest).get(&key).cloned();
      let Some(snapshot) = snapshot else { return };
      if !events.touch(&key, &snapshot).await {
        return;
      }

      let mut latest = lock(&latest);
      if latest.get(&key) == Some(&snapshot) {
        latest.remove(&key);
      }
      tracing::debug!(event = %key, "autosaved");
    });
  }

  /// Drop the unsaved state of `id`, e.g. because the event was deleted.
  pub fn discard(&self, id: &EventId) {
    self.debouncer.cancel(id);
    lock(&self.latest).remove(id);
  }

  /// Write every unsaved snapshot now instead of waiting for the delay.
  ///
  /// Writes already in progress are abandoned and redone from the last
  /// recorded snapshot.
  pub async fn flush(&self) {
    self.debouncer.cancel_all();
    let unsaved: Vec<(EventId, EventSnapshot)> = lock(&self.latest).drain().collect();
    for (id, snapshot) in unsaved {
      self.events.touch(&id, &snapshot).await;
    }
  }

  pub fn pending(&self) -> usize { self.debouncer.pending() }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use meet_core::memory::MemoryStore;

  use super::*;

  #[tokio::test(start_paused = true)]
  async fn burst_runs_once() {
    let debouncer = Debouncer::new(Duration::from_millis(350));
    let runs = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(AtomicUsize::new(0));

    for i in 1..=5 {
      let runs = Arc::clone(&runs);
      let last = Arc::clone(&last);
      debouncer.schedule("event", async move {
        runs.fetch_add(1, Ordering::SeqCst);
        last.store(i, Ordering::SeqCst);
      });
      tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(runs.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(last.load(Ordering::SeqCst), 5);
    assert_eq!(debouncer.pending(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn keys_are_independent() {
    let debouncer = Debouncer::new(Duration::from_millis(50));
    let runs = Arc::new(AtomicUsize::new(0));
    for key in ["a", "b"] {
      let runs = Arc::clone(&runs);
      debouncer.schedule(key, async move {
        runs.fetch_add(1, Ordering::SeqCst);
      });
    }
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_prevents_run() {
    let debouncer = Debouncer::new(Duration::from_millis(50));
    let runs = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&runs);
    debouncer.schedule(1, async move {
      r.fetch_add(1, Ordering::SeqCst);
    });
    assert!(debouncer.cancel(&1));
    assert!(!debouncer.cancel(&1));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn autosave_persists_last_edit_of_burst() {
    let events = Arc::new(EventStore::new(MemoryStore::new()));
    let (id, mut snap) = events.create_event("Draft").await;
    let saver = AutoSaver::new(Arc::clone(&events), DEFAULT_DELAY);

    for title in ["D", "De", "Dec"] {
      snap.title = title.into();
      saver.snapshot_changed(&id, snap.clone());
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(events.load_event(&id).await.unwrap().title, "Draft");

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(events.load_event(&id).await.unwrap().title, "Dec");
    let index = events.load_index().await;
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].title, "Dec");
  }

  #[tokio::test(start_paused = true)]
  async fn flush_writes_immediately() {
    let events = Arc::new(EventStore::new(MemoryStore::new()));
    let (id, mut snap) = events.create_event("Draft").await;
    let saver = AutoSaver::new(Arc::clone(&events), Duration::from_secs(60));

    snap.title = "Final".into();
    saver.snapshot_changed(&id, snap);
    saver.flush().await;

    assert_eq!(events.load_event(&id).await.unwrap().title, "Final");
    assert_eq!(saver.pending(), 0);
  }

  /// Memory store whose writes take 100ms.
  #[derive(Debug, Clone, Default)]
  struct SlowStore(MemoryStore);

  impl KeyValueStore for SlowStore {
    type Error = meet_core::Error;

    async fn get(&self, key: &str) -> meet_core::Result<Option<String>> { self.0.get(key).await }

    async fn set(&self, key: &str, value: String) -> meet_core::Result<()> {
      tokio::time::sleep(Duration::from_millis(100)).await;
      self.0.set(key, value).await
    }

    async fn remove(&self, key: &str) -> meet_core::Result<()> { self.0.remove(key).await }

    async fn keys_with_prefix(&self, prefix: &str) -> meet_core::Result<Vec<String>> {
      self.0.keys_with_prefix(prefix).await
    }
  }

  #[tokio::test(start_paused = true)]
  async fn flush_during_write_keeps_last_edit() {
    let events = Arc::new(EventStore::new(SlowStore::default()));
    let (id, mut snap) = events.create_event("Draft").await;
    let saver = AutoSaver::new(Arc::clone(&events), DEFAULT_DELAY);

    snap.title = "Final".into();
    saver.snapshot_changed(&id, snap);
    // Past the delay, inside the snapshot write.
    tokio::time::sleep(Duration::from_millis(360)).await;
    saver.flush().await;

    assert_eq!(events.load_event(&id).await.unwrap().title, "Final");
    assert_eq!(events.load_index().await[0].title, "Final");
  }

  #[tokio::test(start_paused = true)]
  async fn edit_during_write_is_saved_next() {
    let events = Arc::new(EventStore::new(SlowStore::default()));
    let (id, mut snap) = events.create_event("Draft").await;
    let saver = AutoSaver::new(Arc::clone(&events), DEFAULT_DELAY);

    snap.title = "First".into();
    saver.snapshot_changed(&id, snap.clone());
    tokio::time::sleep(Duration::from_millis(360)).await;
    snap.title = "Second".into();
    saver.snapshot_changed(&id, snap);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(events.load_event(&id).await.unwrap().title, "Second");
  }

  #[tokio::test(start_paused = true)]
  async fn discard_drops_unsaved_state() {
    let events = Arc::new(EventStore::new(MemoryStore::new()));
    let (id, mut snap) = events.create_event("Keep").await;
    let saver = AutoSaver::new(Arc::clone(&events), DEFAULT_DELAY);

    snap.title = "Drop".into();
    saver.snapshot_changed(&id, snap);
    saver.discard(&id);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(events.load_event(&id).await.unwrap().title, "Keep");
  }
}
