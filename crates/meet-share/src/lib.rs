//! Share-link codec for Monthly Meet events.
//!
//! Turns an `(event id, snapshot)` pair into a compact URL-safe token that
//! can ride in a link fragment (`#k=<token>`), and back. Pure synchronous; no
//! storage dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use meet_core::event::{EventId, EventSnapshot};
//! use meet_share::{SharePayload, decode, share_link};
//!
//! let payload = SharePayload::new(Some(EventId::generate()), EventSnapshot::new("May"));
//! let link = share_link("https://meet.example/", &payload).unwrap();
//! assert_eq!(decode(&link), Some(payload));
//! ```

pub mod error;
mod fragment;
mod token;

pub use error::{Error, Result};
pub use fragment::{Fragment, parse_fragment};
use meet_core::event::{EventId, EventSnapshot};
use serde::{Deserialize, Serialize};

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// The content of a share link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePayload {
  /// Absent in hand-built links; the receiver mints a new id.
  #[serde(default)]
  pub id:       Option<EventId>,
  pub snapshot: EventSnapshot,
}

impl SharePayload {
  pub fn new(id: Option<EventId>, snapshot: EventSnapshot) -> Self { Self { id, snapshot } }
}

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Encode a payload as a bare URL-safe token.
pub fn encode(payload: &SharePayload) -> Result<String> { token::encode(payload) }

/// Decode a bare token.
pub fn decode_token(token: &str) -> Result<SharePayload> { token::decode(token) }

/// The link fragment for a payload, including the leading `#`.
pub fn share_fragment(payload: &SharePayload) -> Result<String> {
  Ok(format!("#k={}", fragment::escape(&encode(payload)?)))
}

/// `base_url` with any existing fragment replaced by the share fragment.
pub fn share_link(base_url: &str, payload: &SharePayload) -> Result<String> {
  let base = base_url.split('#').next().unwrap_or_default();
  Ok(format!("{base}{}", share_fragment(payload)?))
}

/// Decode a full link, a fragment, or a bare token.
///
/// Never fails loudly: anything that is not a valid share payload yields
/// `None`, so a bad link falls back to a normal start.
pub fn decode(input: &str) -> Option<SharePayload> {
  let result = match parse_fragment(input) {
    Some(Fragment::Share(token)) => token::decode(&token),
    Some(Fragment::Event(_)) => Err(Error::MissingToken),
    None if input.contains('#') => Err(Error::MissingToken),
    None => token::decode(input),
  };

  match result {
    Ok(payload) => Some(payload),
    Err(e) => {
      tracing::debug!(error = %e, "ignoring undecodable share link");
      None
    }
  }
}
