//! Combined leaderboard across both disciplines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  allocate::{Placement, rank},
  athlete::{Athlete, AthleteId},
  event::EventSnapshot,
  score::{run_score, strength_score},
};

/// One athlete's combined result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
  pub id:              AthleteId,
  pub name:            String,
  /// Competition place over equal totals.
  pub place:           usize,
  pub strength_points: f64,
  pub run_points:      f64,
  pub total:           f64,
}

/// Merge both disciplines' points into a ranked leaderboard.
///
/// Every roster athlete appears exactly once; a missing discipline entry
/// counts as zero. Equal totals keep roster order.
pub fn aggregate(
  roster: &[Athlete],
  strength: &HashMap<AthleteId, f64>,
  run: &HashMap<AthleteId, f64>,
) -> Vec<LeaderboardRow> {
  let mut rows: Vec<LeaderboardRow> = roster
    .iter()
    .map(|a| {
      let strength_points = strength.get(&a.id).copied().unwrap_or(0.0);
      let run_points = run.get(&a.id).copied().unwrap_or(0.0);
      LeaderboardRow {
        id: a.id.clone(),
        name: a.name.clone(),
        place: 0,
        strength_points,
        run_points,
        total: strength_points + run_points,
      }
    })
    .collect();

  rows.sort_by(|a, b| b.total.total_cmp(&a.total));

  let mut place = 1;
  for i in 0..rows.len() {
    if i > 0 && rows[i].total != rows[i - 1].total {
      place = i + 1;
    }
    rows[i].place = place;
  }

  rows
}

/// Everything the results view renders for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResults {
  pub strength:    Vec<Placement>,
  pub run:         Vec<Placement>,
  pub leaderboard: Vec<LeaderboardRow>,
}

/// Score, rank and aggregate a whole event.
pub fn score_event(snapshot: &EventSnapshot) -> EventResults {
  let table = snapshot.points_table.values();

  let strength_entries: Vec<(AthleteId, Option<f64>)> = snapshot
    .athletes
    .iter()
    .map(|a| (a.id.clone(), strength_score(a)))
    .collect();
  let run_entries: Vec<(AthleteId, Option<f64>)> = snapshot
    .athletes
    .iter()
    .map(|a| (a.id.clone(), run_score(a)))
    .collect();

  let strength = rank(&strength_entries, table);
  let run = rank(&run_entries, table);

  let points = |placements: &[Placement]| -> HashMap<AthleteId, f64> {
    placements.iter().map(|p| (p.id.clone(), p.points)).collect()
  };
  let leaderboard = aggregate(&snapshot.athletes, &points(&strength), &points(&run));

  tracing::debug!(
    athletes = snapshot.athletes.len(),
    strength_scored = strength.iter().filter(|p| p.score.is_some()).count(),
    run_scored = run.iter().filter(|p| p.score.is_some()).count(),
    "scored event"
  );

  EventResults { strength, run, leaderboard }
}
