//! The athlete history table, a slowly-changing dimension over pulls.
//!
//! Rows are append-only. The only derived state is the `is_latest` flag,
//! which is recomputed over the whole table after every merge: for each
//! identity, exactly one row (the one with the greatest pull timestamp) is
//! flagged current.

use std::{
  collections::{HashMap, HashSet},
  hash::Hash,
};

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  athlete::{Athlete, AthleteKey, Provenance},
};

// ─── Rows ────────────────────────────────────────────────────────────────────

/// An athlete snapshot together with its derived current-row flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
  pub athlete:   Athlete,
  pub is_latest: bool,
}

impl HistoryRow {
  pub fn new(athlete: Athlete) -> Self {
    Self { athlete, is_latest: false }
  }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// How [`HistoryTable::merge`] treats re-fetched records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
  /// Append every new row, even when identical to the current row.
  #[default]
  AppendAll,
  /// Drop a new row whose content matches the current row for its identity.
  SkipUnchanged,
}

/// Counts from one [`HistoryTable::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
  pub appended: usize,
  pub skipped:  usize,
}

/// Append `new_rows` to `existing` and recompute `is_latest` per `key`.
///
/// The existing rows keep their content and order; new rows follow in the
/// order given. For each key, the row with the greatest `pulled_at` wins. On
/// equal timestamps the row that appears later wins, so a later batch
/// replaces an earlier one pulled at the same instant.
pub fn merge_by<K, F>(
  mut existing: Vec<HistoryRow>,
  new_rows: Vec<Athlete>,
  key: F,
) -> Vec<HistoryRow>
where
  K: Eq + Hash,
  F: Fn(&Athlete) -> K,
{
  existing.extend(new_rows.into_iter().map(HistoryRow::new));
  mark_latest(&mut existing, key);
  existing
}

fn mark_latest<K, F>(rows: &mut [HistoryRow], key: F)
where
  K: Eq + Hash,
  F: Fn(&Athlete) -> K,
{
  let mut winners: HashMap<K, usize> = HashMap::new();
  for (idx, row) in rows.iter().enumerate() {
    winners
      .entry(key(&row.athlete))
      .and_modify(|best| {
        if row.athlete.pulled_at >= rows[*best].athlete.pulled_at {
          *best = idx;
        }
      })
      .or_insert(idx);
  }

  let winners: HashSet<usize> = winners.into_values().collect();
  for (idx, row) in rows.iter_mut().enumerate() {
    row.is_latest = winners.contains(&idx);
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// All pulls of one league, keyed by [`AthleteKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
  rows: Vec<HistoryRow>,
}

impl HistoryTable {
  pub fn new() -> Self { Self::default() }

  /// Build a table from stored rows. The stored `is_latest` flags are
  /// discarded and recomputed.
  pub fn from_rows(rows: Vec<HistoryRow>) -> Self {
    let mut table = Self { rows };
    mark_latest(&mut table.rows, Athlete::key);
    table
  }

  pub fn rows(&self) -> &[HistoryRow] { &self.rows }

  pub fn into_rows(self) -> Vec<HistoryRow> { self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// The current row of every identity.
  pub fn latest(&self) -> impl Iterator<Item = &Athlete> {
    self.rows.iter().filter(|r| r.is_latest).map(|r| &r.athlete)
  }

  pub fn latest_for(&self, key: &AthleteKey) -> Option<&Athlete> {
    self
      .rows
      .iter()
      .find(|r| r.is_latest && r.athlete.id == key.id && r.athlete.league == key.league)
      .map(|r| &r.athlete)
  }

  /// Number of stored pulls for one identity.
  pub fn pull_count(&self, key: &AthleteKey) -> usize {
    self
      .rows
      .iter()
      .filter(|r| r.athlete.id == key.id && r.athlete.league == key.league)
      .count()
  }

  /// Every identity with at least one row.
  pub fn keys(&self) -> HashSet<AthleteKey> {
    self.rows.iter().map(|r| r.athlete.key()).collect()
  }

  /// Merge a new pull into the table.
  pub fn merge(&mut self, new_rows: Vec<Athlete>, mode: MergeMode) -> Result<MergeReport> {
    let incoming = new_rows.len();
    let accepted = match mode {
      MergeMode::AppendAll => new_rows,
      MergeMode::SkipUnchanged => self.drop_unchanged(new_rows)?,
    };
    let report = MergeReport {
      appended: accepted.len(),
      skipped:  incoming - accepted.len(),
    };

    let rows = std::mem::take(&mut self.rows);
    self.rows = merge_by(rows, accepted, Athlete::key);
    Ok(report)
  }

  fn drop_unchanged(&self, new_rows: Vec<Athlete>) -> Result<Vec<Athlete>> {
    let mut current: HashMap<AthleteKey, String> = HashMap::new();
    for athlete in self.latest() {
      current.insert(athlete.key(), athlete.content_fingerprint()?);
    }

    let mut accepted = Vec::with_capacity(new_rows.len());
    for athlete in new_rows {
      let fingerprint = athlete.content_fingerprint()?;
      let key = athlete.key();
      if current.get(&key) == Some(&fingerprint) {
        continue;
      }
      current.insert(key, fingerprint);
      accepted.push(athlete);
    }
    Ok(accepted)
  }

  /// Row counts and the college-provenance breakdown of current rows.
  pub fn summary(&self) -> HistorySummary {
    let mut summary = HistorySummary {
      total: self.rows.len(),
      ..HistorySummary::default()
    };
    for athlete in self.latest() {
      summary.latest += 1;
      match athlete.college.provenance {
        Provenance::CollegeAthlete => summary.from_college_athlete += 1,
        Provenance::Direct => summary.from_direct += 1,
        Provenance::None => summary.no_college += 1,
      }
    }
    summary.historical = summary.total - summary.latest;
    summary
  }
}

/// Counts reported after an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistorySummary {
  pub total:                usize,
  pub latest:               usize,
  pub historical:           usize,
  pub from_college_athlete: usize,
  pub from_direct:          usize,
  pub no_college:           usize,
}
