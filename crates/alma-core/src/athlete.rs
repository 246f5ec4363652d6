//! Athlete types: the fundamental row of the history tables.
//!
//! An athlete row is an immutable snapshot of one upstream record taken at a
//! point in time. Rows are never updated; a later pull produces a new row and
//! the history table decides which one is current.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

// ─── League ──────────────────────────────────────────────────────────────────

/// A professional league covered by the upstream API.
///
/// Declaration order is the order leagues are concatenated into the quiz
/// table.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum League {
  Nfl,
  Nhl,
  Nba,
  Mlb,
}

impl League {
  /// The sport path segment the upstream API files this league under.
  pub fn sport(self) -> &'static str {
    match self {
      Self::Nfl => "football",
      Self::Nhl => "hockey",
      Self::Nba => "basketball",
      Self::Mlb => "baseball",
    }
  }

  /// Parse a league abbreviation, case-insensitively.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse::<Self>()
      .map_err(|_| Error::UnknownLeague(s.to_string()))
  }
}

/// Accepts any spelling [`League::parse`] does, so query strings and config
/// values behave like the CLI.
impl<'de> Deserialize<'de> for League {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    Self::parse(&s).map_err(serde::de::Error::custom)
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The identity of an athlete across pulls: upstream id plus league.
///
/// Upstream ids are only unique within a league.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AthleteKey {
  pub id:     String,
  pub league: League,
}

impl AthleteKey {
  pub fn new(id: impl Into<String>, league: League) -> Self {
    Self { id: id.into(), league }
  }
}

impl fmt::Display for AthleteKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}_{}", self.id, self.league)
  }
}

// ─── College ─────────────────────────────────────────────────────────────────

/// Which resolution path produced a college attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
  /// Resolved through the athlete's college-athlete record.
  CollegeAthlete,
  /// Resolved through the college link on the athlete detail itself.
  Direct,
  /// Neither path produced a college.
  #[default]
  None,
}

impl Provenance {
  /// The tag written to the `college_source` column; `None` has no tag.
  pub fn tag(self) -> Option<&'static str> {
    match self {
      Self::CollegeAthlete => Some("collegeAthlete"),
      Self::Direct => Some("direct"),
      Self::None => None,
    }
  }

  /// Inverse of [`Provenance::tag`]. An empty tag means [`Provenance::None`].
  pub fn from_tag(tag: &str) -> Result<Self> {
    match tag.trim() {
      "collegeAthlete" => Ok(Self::CollegeAthlete),
      "direct" => Ok(Self::Direct),
      "" => Ok(Self::None),
      other => Err(Error::UnknownProvenance(other.to_string())),
    }
  }
}

/// The college an athlete is attributed to, with the path that found it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollegeAttribution {
  pub name:       Option<String>,
  pub id:         Option<String>,
  pub provenance: Provenance,
}

impl CollegeAttribution {
  /// An attribution where neither resolution path succeeded.
  pub fn none() -> Self { Self::default() }

  /// `true` when a non-empty college name is known.
  pub fn is_present(&self) -> bool {
    self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
  }
}

// ─── Career sub-types ────────────────────────────────────────────────────────

/// Draft metadata, read inline from the athlete detail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Draft {
  pub year:  Option<u16>,
  pub round: Option<u8>,
  /// Overall selection number.
  pub pick:  Option<u16>,
  /// Abbreviation of the drafting team.
  pub team:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BirthPlace {
  pub city:    Option<String>,
  pub state:   Option<String>,
  pub country: Option<String>,
}

// ─── Athlete ─────────────────────────────────────────────────────────────────

/// One pulled snapshot of an upstream athlete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
  pub id:               String,
  pub league:           League,
  pub full_name:        Option<String>,
  pub first_name:       Option<String>,
  pub last_name:        Option<String>,
  pub position:         Option<String>,
  pub jersey:           Option<String>,
  pub active:           Option<bool>,
  /// Pounds.
  pub weight:           Option<f64>,
  /// Inches.
  pub height:           Option<f64>,
  pub age:              Option<u32>,
  pub date_of_birth:    Option<String>,
  pub experience_years: Option<u32>,
  pub birth_place:      BirthPlace,
  pub debut_year:       Option<u16>,
  pub college:          CollegeAttribution,
  pub draft:            Draft,
  /// Abbreviation of the current team.
  pub team:             Option<String>,
  /// When the run that produced this row started; shared by every row of a
  /// run.
  pub pulled_at:        DateTime<Utc>,
}

impl Athlete {
  /// A row carrying only identity and pull time; every other field empty.
  pub fn new(id: impl Into<String>, league: League, pulled_at: DateTime<Utc>) -> Self {
    Self {
      id: id.into(),
      league,
      full_name: None,
      first_name: None,
      last_name: None,
      position: None,
      jersey: None,
      active: None,
      weight: None,
      height: None,
      age: None,
      date_of_birth: None,
      experience_years: None,
      birth_place: BirthPlace::default(),
      debut_year: None,
      college: CollegeAttribution::none(),
      draft: Draft::default(),
      team: None,
      pulled_at,
    }
  }

  pub fn key(&self) -> AthleteKey { AthleteKey::new(self.id.clone(), self.league) }

  /// SHA-256 hex digest over every field except `pulled_at`.
  ///
  /// Two pulls of an unchanged upstream record have equal fingerprints.
  pub fn content_fingerprint(&self) -> Result<String> {
    // Key order is deterministic, so equal content gives equal text.
    let mut value = serde_json::to_value(self)?;
    if let Some(obj) = value.as_object_mut() {
      obj.remove("pulled_at");
    }
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    Ok(hex::encode(hasher.finalize()))
  }
}
