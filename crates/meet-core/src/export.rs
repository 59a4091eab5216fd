//! File export formats: a JSON envelope for whole events and a CSV rendering
//! of the leaderboard.

use serde::{Deserialize, Serialize};

use crate::{
  event::{EventId, EventSnapshot},
  leaderboard::LeaderboardRow,
  Result,
};

/// JSON export envelope, `{"eventId": ..., "snapshot": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventExport {
  #[serde(default)]
  pub event_id: Option<EventId>,
  pub snapshot: EventSnapshot,
}

impl EventExport {
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string_pretty(self)?) }

  /// Parse an export. Duplicate athlete ids are re-keyed.
  pub fn from_json(s: &str) -> Result<Self> {
    let mut export: Self = serde_json::from_str(s)?;
    export.snapshot.normalize_athlete_ids();
    Ok(export)
  }
}

pub const CSV_HEADER: [&str; 5] = ["Place", "Athlete", "StrengthPts", "5kPts", "TotalPts"];

/// Render the leaderboard as CSV. Every value is quoted.
pub fn leaderboard_csv(rows: &[LeaderboardRow]) -> String {
  let mut out = csv_line(CSV_HEADER);
  for row in rows {
    out.push_str(&csv_line([
      row.place.to_string().as_str(),
      row.name.as_str(),
      format_points(row.strength_points).as_str(),
      format_points(row.run_points).as_str(),
      format_points(row.total).as_str(),
    ]));
  }
  out
}

fn csv_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
  let mut line = fields
    .into_iter()
    .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
    .collect::<Vec<_>>()
    .join(",");
  line.push('\n');
  line
}

/// Points rounded to two decimals without trailing zeros.
pub fn format_points(points: f64) -> String {
  let s = format!("{points:.2}");
  let s = s.trim_end_matches('0').trim_end_matches('.');
  if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

#[cfg(test)]
mod tests {
  use crate::athlete::AthleteId;

  use super::*;

  fn row(place: usize, name: &str, s: f64, r: f64) -> LeaderboardRow {
    LeaderboardRow {
      id: AthleteId::from(name),
      name: name.into(),
      place,
      strength_points: s,
      run_points: r,
      total: s + r,
    }
  }

  #[test]
  fn csv_quotes_everything() {
    let csv = leaderboard_csv(&[row(1, "Ann \"The Tank\" Lee", 21.5, 25.0), row(2, "Bo", 15.0, 0.0)]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], r#""Place","Athlete","StrengthPts","5kPts","TotalPts""#);
    assert_eq!(lines[1], r#""1","Ann ""The Tank"" Lee","21.5","25","46.5""#);
    assert_eq!(lines[2], r#""2","Bo","15","0","15""#);
  }

  #[test]
  fn points_formatting() {
    assert_eq!(format_points(21.5), "21.5");
    assert_eq!(format_points(10.0), "10");
    assert_eq!(format_points(7.0 / 3.0), "2.33");
    assert_eq!(format_points(0.0), "0");
  }

  #[test]
  fn json_envelope_shape() {
    let export = EventExport {
      event_id: Some(EventId::from("e-1")),
      snapshot: EventSnapshot::new("June"),
    };
    let json: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
    assert_eq!(json["eventId"], "e-1");
    assert_eq!(json["snapshot"]["title"], "June");
    assert_eq!(EventExport::from_json(&export.to_json().unwrap()).unwrap(), export);
    assert!(EventExport::from_json("{not json").is_err());
  }

  #[test]
  fn import_with_repeated_athlete_ids_scores_each_athlete() {
    let text = r#"{
      "eventId": "e-7",
      "snapshot": {
        "title": "Copied",
        "athletes": [
          {"id": "a", "name": "Fast", "runTime": "10:00"},
          {"id": "a", "name": "Slow", "runTime": "20:00"}
        ]
      }
    }"#;
    let export = EventExport::from_json(text).unwrap();
    assert_ne!(export.snapshot.athletes[0].id, export.snapshot.athletes[1].id);

    let board = crate::leaderboard::score_event(&export.snapshot).leaderboard;
    let run = |name: &str| board.iter().find(|r| r.name == name).unwrap().run_points;
    assert_eq!(run("Fast"), 25.0);
    assert_eq!(run("Slow"), 18.0);
  }
}
