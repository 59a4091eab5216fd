//! Parsing of free-text form fields into validated numbers.
//!
//! Nothing here ever fails loudly: malformed input is reported as a value
//! ([`ClockTime::Invalid`] or `None`) and the caller decides what "absent"
//! means for its field.

/// The outcome of parsing a run-time field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockTime {
  /// Nothing was entered yet.
  Empty,
  /// Something was entered but it is not a clock time.
  Invalid,
  /// Total duration in seconds.
  Seconds(f64),
}

impl ClockTime {
  /// The duration in seconds, if one was parsed.
  pub fn seconds(self) -> Option<f64> {
    match self {
      Self::Seconds(s) => Some(s),
      Self::Empty | Self::Invalid => None,
    }
  }

  pub fn is_invalid(self) -> bool { matches!(self, Self::Invalid) }
}

/// Parse `ss`, `mm:ss` or `hh:mm:ss` into seconds.
///
/// Every part must be a finite decimal number. Anything else, including an
/// empty part such as `"5:"`, makes the whole string [`ClockTime::Invalid`].
pub fn parse_clock_time(text: &str) -> ClockTime {
  let text = text.trim();
  if text.is_empty() {
    return ClockTime::Empty;
  }

  let parts: Vec<&str> = text.split(':').collect();
  if parts.len() > 3 {
    return ClockTime::Invalid;
  }

  let mut values = Vec::with_capacity(parts.len());
  for part in parts {
    match parse_number_or_null(part) {
      Some(v) => values.push(v),
      None => return ClockTime::Invalid,
    }
  }

  let seconds = match values.as_slice() {
    [s] => *s,
    [m, s] => m * 60.0 + s,
    [h, m, s] => h * 3600.0 + m * 60.0 + s,
    _ => return ClockTime::Invalid,
  };

  ClockTime::Seconds(seconds)
}

/// Parse a decimal number, treating blank or unparseable text as absent.
///
/// Non-finite results (`"inf"`, `"NaN"`) are absent too, so a parsed value
/// can always be stored in a numeric field.
pub fn parse_number_or_null(text: &str) -> Option<f64> {
  let text = text.trim();
  if text.is_empty() {
    return None;
  }
  text.parse::<f64>().ok().filter(|v| v.is_finite())
}
