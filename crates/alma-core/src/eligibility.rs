//! Reduction of the history tables to the quiz-ready player table.

use crate::{
  athlete::Athlete,
  history::{HistoryRow, HistoryTable},
};

/// Upstream placeholder for an athlete with no listed position.
pub const POSITION_PLACEHOLDER: &str = "-";

/// `true` if the athlete carries every field the quiz needs: a college, a real
/// position, and an experience count.
pub fn has_quiz_fields(athlete: &Athlete) -> bool {
  let position_ok = athlete
    .position
    .as_deref()
    .map(str::trim)
    .is_some_and(|p| !p.is_empty() && p != POSITION_PLACEHOLDER);

  athlete.college.is_present() && position_ok && athlete.experience_years.is_some()
}

/// `true` for the current row of an identity that [`has_quiz_fields`].
pub fn is_quiz_eligible(row: &HistoryRow) -> bool {
  row.is_latest && has_quiz_fields(&row.athlete)
}

/// The quiz-eligible subset of `table`, in table order.
pub fn quiz_ready(table: &HistoryTable) -> Vec<Athlete> {
  table
    .rows()
    .iter()
    .filter(|r| is_quiz_eligible(r))
    .map(|r| r.athlete.clone())
    .collect()
}
