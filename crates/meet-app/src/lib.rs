//! Application layer for Monthly Meet.
//!
//! Binds the scoring engine to persistence: the best-effort [`EventStore`]
//! over any [`KeyValueStore`](meet_core::store::KeyValueStore), import
//! reconciliation, and debounced autosave. The `meet` binary is a thin
//! command-line front end over these.

pub mod autosave;
pub mod config;
pub mod events;
pub mod reconcile;

pub use autosave::{AutoSaver, Debouncer};
pub use config::AppConfig;
pub use events::EventStore;
pub use reconcile::{Resolution, resolve_incoming};
