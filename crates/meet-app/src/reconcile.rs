//! Reconciliation of incoming snapshots (share links, JSON imports) with the
//! local event store.
//!
//! The policy never overwrites and never merges. An incoming snapshot is
//! either new (adopted), identical to what is already stored (a no-op), or
//! divergent, in which case it is forked under a fresh id and the local
//! event is left untouched.

use meet_core::{
  event::{EventId, EventSnapshot},
  store::KeyValueStore,
};
use sha2::{Digest, Sha256};

use crate::events::EventStore;

/// What happened to an incoming snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
  /// No local event had this id; the snapshot was stored as-is.
  Adopted { id: EventId, snapshot: EventSnapshot },
  /// The local event already holds an identical snapshot.
  AlreadySynced { id: EventId, snapshot: EventSnapshot },
  /// The local event differs; the incoming snapshot now lives under `id`.
  Forked { original: EventId, id: EventId, snapshot: EventSnapshot },
}

impl Resolution {
  /// The event the caller should open.
  pub fn id(&self) -> &EventId {
    match self {
      Self::Adopted { id, .. } | Self::AlreadySynced { id, .. } | Self::Forked { id, .. } => id,
    }
  }

  pub fn snapshot(&self) -> &EventSnapshot {
    match self {
      Self::Adopted { snapshot, .. }
      | Self::AlreadySynced { snapshot, .. }
      | Self::Forked { snapshot, .. } => snapshot,
    }
  }
}

/// SHA-256 over the canonical JSON form of a snapshot.
///
/// Object keys are sorted by `serde_json::Value`, so two snapshots with the
/// same content always share a fingerprint.
pub fn fingerprint(snapshot: &EventSnapshot) -> Option<String> {
  let canonical = serde_json::to_value(snapshot).ok()?.to_string();
  Some(hex::encode(Sha256::digest(canonical.as_bytes())))
}

fn same_content(a: &EventSnapshot, b: &EventSnapshot) -> bool {
  match (fingerprint(a), fingerprint(b)) {
    (Some(x), Some(y)) => x == y,
    _ => false,
  }
}

/// Store an incoming snapshot without losing local data.
///
/// Repeated athlete ids in the incoming roster are re-keyed first.
pub async fn resolve_incoming<S: KeyValueStore>(
  events: &EventStore<S>,
  id: Option<EventId>,
  mut snapshot: EventSnapshot,
) -> Resolution {
  snapshot.normalize_athlete_ids();

  let id = id.unwrap_or_else(|| {
    let minted = EventId::generate();
    tracing::debug!(event = %minted, "incoming snapshot had no id; minted one");
    minted
  });

  let Some(local) = events.load_event(&id).await else {
    events.touch(&id, &snapshot).await;
    tracing::info!(event = %id, "adopted incoming event");
    return Resolution::Adopted { id, snapshot };
  };

  if same_content(&local, &snapshot) {
    events.ensure_indexed(&id, &local.title).await;
    tracing::info!(event = %id, "incoming event already synced");
    return Resolution::AlreadySynced { id, snapshot: local };
  }

  let forked = EventId::generate();
  events.touch(&forked, &snapshot).await;
  tracing::info!(original = %id, event = %forked, "incoming event diverged; forked");
  Resolution::Forked { original: id, id: forked, snapshot }
}
