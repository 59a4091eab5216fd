//! Link fragment parsing and escaping.

use std::sync::LazyLock;

use meet_core::event::EventId;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex_lite::Regex;

/// Characters left as-is inside a fragment value.
const FRAGMENT_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

static SHARE_PARAM: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[#&]k=([^&]+)").expect("valid share regex"));

static EVENT_PARAM: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[#&]event=([^&]+)").expect("valid event regex"));

/// What a link fragment points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
  /// `#k=<token>`: a full shared snapshot.
  Share(String),
  /// `#event=<id>`: legacy form naming a locally stored event.
  Event(EventId),
}

/// Find a share token or event id in a URL or bare fragment.
///
/// Extra fragment parameters are ignored. A `k` parameter wins over `event`.
pub fn parse_fragment(input: &str) -> Option<Fragment> {
  let fragment = &input[input.find('#')?..];

  if let Some(value) = capture(&SHARE_PARAM, fragment) {
    return Some(Fragment::Share(value));
  }
  capture(&EVENT_PARAM, fragment).map(|id| Fragment::Event(EventId::from(id)))
}

fn capture(re: &Regex, fragment: &str) -> Option<String> {
  let raw = re.captures(fragment)?.get(1)?.as_str();
  match percent_decode_str(raw).decode_utf8() {
    Ok(value) => Some(value.into_owned()),
    Err(e) => {
      tracing::debug!(error = %e, "fragment value is not UTF-8");
      None
    }
  }
}

pub fn escape(value: &str) -> String { utf8_percent_encode(value, FRAGMENT_VALUE).to_string() }
