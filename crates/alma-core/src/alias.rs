//! Accepted answers for the quiz: colleges and their free-text aliases.
//!
//! The alias table is built once from the manually curated reference file.
//! Matching is exact after normalisation; there is no fuzzy matching.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Normalise free text for alias comparison: trim, collapse inner whitespace
/// runs to one space, and lowercase.
pub fn normalize(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

// ─── Reference rows ──────────────────────────────────────────────────────────

/// One row of the curated alias reference table, before normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
  pub college_id:   String,
  /// Canonical college name, as ingested from the upstream API.
  pub college:      Option<String>,
  pub display_name: Option<String>,
  /// Free-text variants (abbreviations, nicknames).
  pub variants:     Vec<String>,
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// A college as the quiz knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollegeEntity {
  pub college_id:   String,
  pub display_name: String,
  aliases:          HashSet<String>,
}

impl CollegeEntity {
  fn from_record(record: AliasRecord) -> Self {
    let display_name = record
      .display_name
      .as_deref()
      .or(record.college.as_deref())
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .unwrap_or(record.college_id.trim())
      .to_string();

    let aliases = record
      .college
      .iter()
      .chain(record.display_name.iter())
      .chain(record.variants.iter())
      .map(|v| normalize(v))
      .filter(|v| !v.is_empty())
      .collect();

    Self {
      college_id: record.college_id.trim().to_string(),
      display_name,
      aliases,
    }
  }

  /// `true` if `guess` normalises to one of this college's aliases.
  pub fn accepts(&self, guess: &str) -> bool {
    self.aliases.contains(&normalize(guess))
  }

  pub fn aliases(&self) -> impl Iterator<Item = &str> {
    self.aliases.iter().map(String::as_str)
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// Lookup from college id to [`CollegeEntity`]. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
  colleges: HashMap<String, CollegeEntity>,
}

impl AliasTable {
  /// Build the table. When a college id appears on more than one row, the
  /// last row wins.
  pub fn from_records(records: impl IntoIterator<Item = AliasRecord>) -> Self {
    let colleges = records
      .into_iter()
      .filter(|r| !r.college_id.trim().is_empty())
      .map(CollegeEntity::from_record)
      .map(|c| (c.college_id.clone(), c))
      .collect();
    Self { colleges }
  }

  pub fn len(&self) -> usize { self.colleges.len() }

  pub fn is_empty(&self) -> bool { self.colleges.is_empty() }

  pub fn get(&self, college_id: &str) -> Option<&CollegeEntity> {
    self.colleges.get(college_id.trim())
  }

  /// Whether `guess` names the college `college_id`. Unknown colleges and
  /// empty guesses are always wrong.
  pub fn is_correct(&self, guess: &str, college_id: &str) -> bool {
    self.get(college_id).is_some_and(|c| c.accepts(guess))
  }

  /// The curated display name for `college_id`, if the college is known.
  pub fn display_name(&self, college_id: &str) -> Option<&str> {
    self.get(college_id).map(|c| c.display_name.as_str())
  }
}
