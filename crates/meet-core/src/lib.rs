//! Core types, scoring engine and storage abstraction for Monthly Meet.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! Everything else in the workspace depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod allocate;
pub mod athlete;
pub mod error;
pub mod event;
pub mod export;
pub mod leaderboard;
pub mod memory;
pub mod parse;
pub mod score;
pub mod store;

pub use error::{Error, Result};
