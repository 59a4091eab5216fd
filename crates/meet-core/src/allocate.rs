//! Rank-to-points allocation for a single discipline.
//!
//! Entries are sorted by score (highest first, unscored last). A run of
//! exactly equal scores shares the points of the places it occupies, split
//! evenly. Places past the end of the points table are worth nothing.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::athlete::AthleteId;

/// One row of a discipline's result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
  pub id:     AthleteId,
  pub score:  Option<f64>,
  /// 1-based competition place; tied entries share the best place.
  /// `None` for unscored entries.
  pub place:  Option<usize>,
  pub points: f64,
}

/// Scored entries first by descending score, then unscored ones.
fn by_score_desc(a: &Option<f64>, b: &Option<f64>) -> Ordering {
  match (a, b) {
    (Some(x), Some(y)) => y.partial_cmp(x).unwrap_or(Ordering::Equal),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// Sort `entries` and award points from `table`.
///
/// The sort is stable, so equal scores and unscored entries keep their input
/// order in the returned table.
pub fn rank(entries: &[(AthleteId, Option<f64>)], table: &[f64]) -> Vec<Placement> {
  let mut sorted: Vec<&(AthleteId, Option<f64>)> = entries.iter().collect();
  sorted.sort_by(|a, b| by_score_desc(&a.1, &b.1));

  let slot = |rank: usize| table.get(rank).copied().unwrap_or(0.0);

  let mut placements = Vec::with_capacity(sorted.len());
  let mut start = 0;
  while start < sorted.len() {
    let score = sorted[start].1;

    let Some(value) = score else {
      placements.extend(sorted[start..].iter().map(|(id, _)| Placement {
        id:     id.clone(),
        score:  None,
        place:  None,
        points: 0.0,
      }));
      break;
    };

    let mut end = start + 1;
    while end < sorted.len() && sorted[end].1 == Some(value) {
      end += 1;
    }

    let shared: f64 = (start..end).map(slot).sum::<f64>() / (end - start) as f64;
    placements.extend(sorted[start..end].iter().map(|(id, _)| Placement {
      id:     id.clone(),
      score,
      place:  Some(start + 1),
      points: shared,
    }));
    start = end;
  }

  placements
}

/// Points per athlete. Every input id is present in the result.
pub fn allocate(entries: &[(AthleteId, Option<f64>)], table: &[f64]) -> HashMap<AthleteId, f64> {
  rank(entries, table)
    .into_iter()
    .map(|p| (p.id, p.points))
    .collect()
}
