//! Athlete: one roster entry of an event.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::parse::parse_number_or_null;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque athlete identifier, unique within its event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AthleteId(String);

impl AthleteId {
  pub fn generate() -> Self { Self(Uuid::new_v4().simple().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for AthleteId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for AthleteId {
  fn from(s: String) -> Self { Self(s) }
}

impl fmt::Display for AthleteId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

/// Sex used for strength normalisation.
///
/// `Unspecified` athletes still take part in the run but are never scored
/// for strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
  Male,
  Female,
  #[default]
  Unspecified,
}

impl Sex {
  /// Lenient parse of a form value; anything unrecognised is `Unspecified`.
  pub fn parse_lenient(text: &str) -> Self {
    match text.trim().to_ascii_lowercase().as_str() {
      "m" | "male" | "men" => Self::Male,
      "f" | "female" | "women" => Self::Female,
      _ => Self::Unspecified,
    }
  }
}

// ─── Athlete ─────────────────────────────────────────────────────────────────

/// A roster entry. Every numeric field is either a finite number or `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
  pub id:         AthleteId,
  #[serde(default)]
  pub name:       String,
  #[serde(default)]
  pub sex:        Sex,
  #[serde(default)]
  pub age:        Option<u32>,
  /// Kilograms.
  #[serde(default)]
  pub bodyweight: Option<f64>,
  #[serde(default)]
  pub squat:      Option<f64>,
  #[serde(default)]
  pub bench:      Option<f64>,
  #[serde(default)]
  pub deadlift:   Option<f64>,
  /// Raw clock-time text as entered, e.g. `"19:42"`. Empty means not run yet.
  #[serde(default)]
  pub run_time:   String,
}

impl Athlete {
  /// A fresh athlete with a generated id and nothing entered.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      id:         AthleteId::generate(),
      name:       name.into(),
      sex:        Sex::default(),
      age:        None,
      bodyweight: None,
      squat:      None,
      bench:      None,
      deadlift:   None,
      run_time:   String::new(),
    }
  }

  /// Sum of the three lifts, counting a missing lift as zero.
  pub fn total(&self) -> f64 {
    [self.squat, self.bench, self.deadlift]
      .into_iter()
      .flatten()
      .sum()
  }

  /// Apply a raw form edit to one field.
  ///
  /// Numeric input that does not parse clears the field.
  pub fn apply_edit(&mut self, field: AthleteField, text: &str) {
    match field {
      AthleteField::Name => self.name = text.trim().to_owned(),
      AthleteField::Sex => self.sex = Sex::parse_lenient(text),
      AthleteField::Age => {
        self.age = parse_number_or_null(text)
          .filter(|v| *v >= 0.0 && *v <= f64::from(u32::MAX))
          .map(|v| v.round() as u32);
      }
      AthleteField::Bodyweight => self.bodyweight = parse_number_or_null(text),
      AthleteField::Squat => self.squat = parse_number_or_null(text),
      AthleteField::Bench => self.bench = parse_number_or_null(text),
      AthleteField::Deadlift => self.deadlift = parse_number_or_null(text),
      AthleteField::RunTime => self.run_time = text.trim().to_owned(),
    }
  }
}

/// An editable athlete field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AthleteField {
  Name,
  Sex,
  Age,
  Bodyweight,
  Squat,
  Bench,
  Deadlift,
  RunTime,
}

impl std::str::FromStr for AthleteField {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "name" => Ok(Self::Name),
      "sex" => Ok(Self::Sex),
      "age" => Ok(Self::Age),
      "bodyweight" | "bw" => Ok(Self::Bodyweight),
      "squat" => Ok(Self::Squat),
      "bench" => Ok(Self::Bench),
      "deadlift" => Ok(Self::Deadlift),
      "run-time" | "run" | "time" => Ok(Self::RunTime),
      other => Err(format!("unknown athlete field: {other:?}")),
    }
  }
}
