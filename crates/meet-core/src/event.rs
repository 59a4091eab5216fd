//! Event identity, snapshot and index types.
//!
//! An [`EventSnapshot`] is the unit of persistence and of sharing. The
//! [`EventId`] names an event's lineage and outlives any single snapshot.

use std::{collections::HashSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  athlete::{Athlete, AthleteField, AthleteId},
  parse::parse_number_or_null,
  Error, Result,
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque, globally unique event identifier.
///
/// Generated identifiers are UUIDs, but identifiers arriving in share links
/// are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
  pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for EventId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for EventId {
  fn from(s: String) -> Self { Self(s) }
}

impl fmt::Display for EventId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Points table ────────────────────────────────────────────────────────────

const TOP10: [f64; 10] = [25.0, 18.0, 15.0, 12.0, 10.0, 8.0, 6.0, 4.0, 2.0, 1.0];
const TOP6: [f64; 6] = [10.0, 8.0, 6.0, 4.0, 2.0, 1.0];

/// Points awarded by finishing place; index 0 is first place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "lowercase")]
pub enum PointsTable {
  #[default]
  Top10,
  Top6,
  Custom { values: Vec<f64> },
}

impl PointsTable {
  pub fn values(&self) -> &[f64] {
    match self {
      Self::Top10 => &TOP10,
      Self::Top6 => &TOP6,
      Self::Custom { values } => values,
    }
  }

  /// Build a custom table from text such as `"25, 18, 15"`.
  ///
  /// Entries that are not finite numbers are skipped.
  pub fn parse_custom(text: &str) -> Self {
    let values = text
      .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
      .filter_map(parse_number_or_null)
      .collect();
    Self::Custom { values }
  }

  /// Resolve a preset name (`top10`, `top6`) or a custom list.
  pub fn from_selection(text: &str) -> Self {
    match text.trim().to_ascii_lowercase().as_str() {
      "top10" | "10" => Self::Top10,
      "top6" | "6" => Self::Top6,
      _ => Self::parse_custom(text),
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The full saved state of one event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
  #[serde(default)]
  pub title:        String,
  #[serde(default)]
  pub points_table: PointsTable,
  #[serde(default)]
  pub athletes:     Vec<Athlete>,
}

impl EventSnapshot {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Self::default() }
  }

  /// Append a new athlete and return its id.
  pub fn add_athlete(&mut self, name: impl Into<String>) -> AthleteId {
    let athlete = Athlete::new(name);
    let id = athlete.id.clone();
    self.athletes.push(athlete);
    id
  }

  /// Add one athlete per non-blank name; returns the new ids in order.
  pub fn seed_roster<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Vec<AthleteId> {
    names
      .into_iter()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .map(|n| self.add_athlete(n))
      .collect()
  }

  /// Remove an athlete; returns `false` if no athlete had that id.
  pub fn remove_athlete(&mut self, id: &AthleteId) -> bool {
    let before = self.athletes.len();
    self.athletes.retain(|a| &a.id != id);
    self.athletes.len() != before
  }

  pub fn athlete(&self, id: &AthleteId) -> Option<&Athlete> {
    self.athletes.iter().find(|a| &a.id == id)
  }

  pub fn athlete_mut(&mut self, id: &AthleteId) -> Option<&mut Athlete> {
    self.athletes.iter_mut().find(|a| &a.id == id)
  }

  /// Resolve user input to an athlete: exact id, then name (ignoring ASCII
  /// case), then a unique id prefix.
  pub fn find_athlete(&self, query: &str) -> Result<AthleteId> {
    let query = query.trim();
    if let Some(a) = self.athletes.iter().find(|a| a.id.as_str() == query) {
      return Ok(a.id.clone());
    }

    let by_name: Vec<&Athlete> = self
      .athletes
      .iter()
      .filter(|a| a.name.eq_ignore_ascii_case(query))
      .collect();
    match by_name.as_slice() {
      [a] => return Ok(a.id.clone()),
      [] => {}
      _ => return Err(Error::AmbiguousAthlete(query.to_owned())),
    }

    let by_prefix: Vec<&Athlete> = self
      .athletes
      .iter()
      .filter(|a| !query.is_empty() && a.id.as_str().starts_with(query))
      .collect();
    match by_prefix.as_slice() {
      [a] => Ok(a.id.clone()),
      [] => Err(Error::AthleteNotFound(query.to_owned())),
      _ => Err(Error::AmbiguousAthlete(query.to_owned())),
    }
  }

  /// Give every athlete a distinct, non-empty id.
  ///
  /// Snapshots from links and files may repeat ids. The first holder of an
  /// id keeps it; later holders get `<id>-<n>` with the smallest free `n`, so
  /// normalising the same input twice yields the same ids. Returns the
  /// number of athletes renamed.
  pub fn normalize_athlete_ids(&mut self) -> usize {
    let taken: HashSet<AthleteId> = self.athletes.iter().map(|a| a.id.clone()).collect();
    let mut seen = HashSet::with_capacity(self.athletes.len());
    let mut renamed = 0;

    for athlete in &mut self.athletes {
      if !athlete.id.as_str().is_empty() && seen.insert(athlete.id.clone()) {
        continue;
      }
      let base = match athlete.id.as_str() {
        "" => "athlete".to_owned(),
        id => id.to_owned(),
      };
      let mut n = 2usize;
      let fresh = loop {
        let candidate = AthleteId::from(format!("{base}-{n}"));
        if !taken.contains(&candidate) && !seen.contains(&candidate) {
          break candidate;
        }
        n += 1;
      };
      seen.insert(fresh.clone());
      athlete.id = fresh;
      renamed += 1;
    }

    if renamed > 0 {
      tracing::debug!(title = %self.title, renamed, "re-keyed duplicate athlete ids");
    }
    renamed
  }

  /// Apply a raw form edit to one athlete field.
  pub fn apply_edit(&mut self, id: &AthleteId, field: AthleteField, text: &str) -> Result<()> {
    let athlete = self
      .athlete_mut(id)
      .ok_or_else(|| Error::AthleteNotFound(id.to_string()))?;
    athlete.apply_edit(field, text);
    Ok(())
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Listing metadata for one stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventIndexEntry {
  pub id:         EventId,
  pub title:      String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl EventIndexEntry {
  pub fn new(id: EventId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
    Self { id, title: title.into(), created_at: now, updated_at: now }
  }

  /// Record a save at `now`. `updated_at` never moves backwards.
  pub fn touch(&mut self, title: &str, now: DateTime<Utc>) {
    title.clone_into(&mut self.title);
    self.updated_at = self.updated_at.max(now);
  }
}

// ─── Preferences ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Light => "light",
      Self::Dark => "dark",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim() {
      "light" => Some(Self::Light),
      "dark" => Some(Self::Dark),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  #[test]
  fn find_athlete_prefers_id_then_name_then_prefix() {
    let mut snap = EventSnapshot::new("Lookup");
    snap.seed_roster(["Ada", "Bo", "Bo"]);
    snap.athletes[0].id = AthleteId::from("f00d");
    snap.athletes[1].id = AthleteId::from("ada5");
    snap.athletes[2].id = AthleteId::from("b0b");

    assert_eq!(snap.find_athlete("ada").unwrap(), AthleteId::from("f00d"));
    assert_eq!(snap.find_athlete(" ADA ").unwrap(), AthleteId::from("f00d"));
    assert_eq!(snap.find_athlete("ada5").unwrap(), AthleteId::from("ada5"));
    assert_eq!(snap.find_athlete("f0").unwrap(), AthleteId::from("f00d"));
    assert_eq!(snap.find_athlete("b0b").unwrap(), AthleteId::from("b0b"));
    assert!(matches!(snap.find_athlete("bo"), Err(Error::AmbiguousAthlete(_))));
    assert!(matches!(snap.find_athlete("zz"), Err(Error::AthleteNotFound(_))));
    assert!(matches!(snap.find_athlete(""), Err(Error::AthleteNotFound(_))));
  }

  #[test]
  fn duplicate_athlete_ids_are_rekeyed() {
    let mut snap = EventSnapshot::new("Dupes");
    let ids = snap.seed_roster(["Ann", "Ben", "Cleo", "Dot", "Eve"]);
    snap.athletes[0].id = AthleteId::from("a");
    snap.athletes[1].id = AthleteId::from("a");
    snap.athletes[2].id = AthleteId::from("a-2");
    snap.athletes[3].id = AthleteId::from("");
    assert_eq!(snap.athletes[4].id, ids[4]);

    let mut again = snap.clone();
    assert_eq!(snap.normalize_athlete_ids(), 2);
    let got: Vec<&str> = snap.athletes.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(got, ["a", "a-3", "a-2", "athlete-2", ids[4].as_str()]);

    again.normalize_athlete_ids();
    assert_eq!(again, snap);
    assert_eq!(snap.normalize_athlete_ids(), 0);
  }

  #[test]
  fn snapshot_json_shape() {
    let mut snap = EventSnapshot::new("October");
    snap.points_table = PointsTable::Custom { values: vec![5.0, 3.0] };
    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["title"], "October");
    assert_eq!(json["pointsTable"]["preset"], "custom");
    assert_eq!(json["pointsTable"]["values"][1], 3.0);
    assert!(json["athletes"].as_array().unwrap().is_empty());

    let preset: PointsTable = serde_json::from_str(r#"{"preset":"top6"}"#).unwrap();
    assert_eq!(preset, PointsTable::Top6);
  }

  #[test]
  fn preset_tables() {
    assert_eq!(PointsTable::Top10.values().len(), 10);
    assert_eq!(PointsTable::Top6.values().len(), 6);
    assert_eq!(PointsTable::Top10.values()[0], 25.0);
  }

  #[test]
  fn custom_table_skips_junk() {
    let t = PointsTable::parse_custom("25, 18,x, 15 12");
    assert_eq!(t.values(), &[25.0, 18.0, 15.0, 12.0]);
    assert_eq!(PointsTable::from_selection("top6"), PointsTable::Top6);
  }

  #[test]
  fn roster_operations() {
    let mut snap = EventSnapshot::new("Meet");
    let ids = snap.seed_roster(["Ada", "  ", "Bo"]);
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    snap
      .apply_edit(&ids[1], AthleteField::Squat, "150")
      .unwrap();
    assert_eq!(snap.athlete(&ids[1]).unwrap().squat, Some(150.0));

    assert!(snap.remove_athlete(&ids[0]));
    assert!(!snap.remove_athlete(&ids[0]));
    assert_eq!(snap.athletes.len(), 1);
    assert!(snap.apply_edit(&ids[0], AthleteField::Name, "x").is_err());
  }

  #[test]
  fn index_updated_at_is_monotonic() {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut entry = EventIndexEntry::new(EventId::from("e1"), "May", t0);
    entry.touch("May meet", t0 - Duration::minutes(5));
    assert_eq!(entry.updated_at, t0);
    assert_eq!(entry.title, "May meet");
    entry.touch("May meet", t0 + Duration::minutes(5));
    assert_eq!(entry.updated_at, t0 + Duration::minutes(5));
    assert_eq!(entry.created_at, t0);
  }
}
