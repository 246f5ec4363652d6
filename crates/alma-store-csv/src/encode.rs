//! Encoding and decoding helpers between domain types and the plain-text
//! cells of the CSV files.
//!
//! Timestamps are written as RFC 3339; older files carrying naive ISO
//! timestamps are read as UTC. Booleans are written `true`/`false` (and the
//! `is_latest` flag as `1`/`0`) but read case-insensitively in any of those
//! spellings. Integer columns tolerate a trailing `.0`, which spreadsheet
//! tools add to integer columns with gaps.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use alma_core::{
  alias::AliasRecord,
  athlete::{Athlete, BirthPlace, CollegeAttribution, Draft, League, Provenance},
  history::HistoryRow,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  let s = s.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Scalars ─────────────────────────────────────────────────────────────────

fn present(cell: &Option<String>) -> Option<&str> {
  cell.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn text(cell: Option<String>) -> Option<String> {
  present(&cell).map(str::to_string)
}

pub fn decode_bool(column: &'static str, cell: &Option<String>) -> Result<Option<bool>> {
  let Some(s) = present(cell) else { return Ok(None) };
  match s.to_ascii_lowercase().as_str() {
    "true" | "1" | "1.0" => Ok(Some(true)),
    "false" | "0" | "0.0" => Ok(Some(false)),
    _ => Err(Error::Field { column, value: s.to_string() }),
  }
}

fn decode_int<T: TryFrom<i64>>(column: &'static str, cell: &Option<String>) -> Result<Option<T>> {
  let Some(s) = present(cell) else { return Ok(None) };
  let invalid = || Error::Field { column, value: s.to_string() };

  let whole = match s.parse::<i64>() {
    Ok(n) => n,
    Err(_) => {
      let f = s.parse::<f64>().map_err(|_| invalid())?;
      if f.fract() != 0.0 || !f.is_finite() {
        return Err(invalid());
      }
      f as i64
    }
  };
  T::try_from(whole).map(Some).map_err(|_| invalid())
}

fn decode_float(column: &'static str, cell: &Option<String>) -> Result<Option<f64>> {
  let Some(s) = present(cell) else { return Ok(None) };
  s.parse::<f64>()
    .map(Some)
    .map_err(|_| Error::Field { column, value: s.to_string() })
}

/// Upstream ids are integers; spreadsheet tools may have written them as
/// `103.0`.
fn decode_id(cell: Option<String>) -> Option<String> {
  let id = text(cell)?;
  match id.strip_suffix(".0") {
    Some(whole) if !whole.is_empty() && whole.bytes().all(|b| b.is_ascii_digit()) => {
      Some(whole.to_string())
    }
    _ => Some(id),
  }
}

fn encode_display<T: ToString>(v: Option<T>) -> Option<String> { v.map(|v| v.to_string()) }

// ─── Athlete rows ────────────────────────────────────────────────────────────

/// One line of a history or quiz table, exactly as it appears on disk.
///
/// Field order is column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAthleteRow {
  pub id:               String,
  pub league:           String,
  #[serde(rename = "fullName")]
  pub full_name:        Option<String>,
  #[serde(rename = "firstName")]
  pub first_name:       Option<String>,
  #[serde(rename = "lastName")]
  pub last_name:        Option<String>,
  pub position:         Option<String>,
  pub jersey:           Option<String>,
  pub active:           Option<String>,
  pub weight:           Option<String>,
  pub height:           Option<String>,
  pub age:              Option<String>,
  #[serde(rename = "dateOfBirth")]
  pub date_of_birth:    Option<String>,
  pub experience_years: Option<String>,
  #[serde(rename = "birthCity")]
  pub birth_city:       Option<String>,
  #[serde(rename = "birthState")]
  pub birth_state:      Option<String>,
  #[serde(rename = "birthCountry")]
  pub birth_country:    Option<String>,
  #[serde(rename = "debutYear")]
  pub debut_year:       Option<String>,
  pub college:          Option<String>,
  #[serde(rename = "collegeId")]
  pub college_id:       Option<String>,
  pub college_source:   Option<String>,
  #[serde(rename = "draftYear")]
  pub draft_year:       Option<String>,
  #[serde(rename = "draftRound")]
  pub draft_round:      Option<String>,
  #[serde(rename = "draftPick")]
  pub draft_pick:       Option<String>,
  #[serde(rename = "draftTeam")]
  pub draft_team:       Option<String>,
  pub team:             Option<String>,
  pub processed_ts:     String,
  pub is_latest:        Option<String>,
}

pub fn encode_row(athlete: &Athlete, is_latest: bool) -> RawAthleteRow {
  let a = athlete.clone();
  RawAthleteRow {
    id:               a.id,
    league:           a.league.to_string(),
    full_name:        a.full_name,
    first_name:       a.first_name,
    last_name:        a.last_name,
    position:         a.position,
    jersey:           a.jersey,
    active:           encode_display(a.active),
    weight:           encode_display(a.weight),
    height:           encode_display(a.height),
    age:              encode_display(a.age),
    date_of_birth:    a.date_of_birth,
    experience_years: encode_display(a.experience_years),
    birth_city:       a.birth_place.city,
    birth_state:      a.birth_place.state,
    birth_country:    a.birth_place.country,
    debut_year:       encode_display(a.debut_year),
    college:          a.college.name,
    college_id:       a.college.id,
    college_source:   a.college.provenance.tag().map(str::to_string),
    draft_year:       encode_display(a.draft.year),
    draft_round:      encode_display(a.draft.round),
    draft_pick:       encode_display(a.draft.pick),
    draft_team:       a.draft.team,
    team:             a.team,
    processed_ts:     encode_dt(a.pulled_at),
    is_latest:        Some(if is_latest { "1" } else { "0" }.to_string()),
  }
}

pub fn decode_row(raw: RawAthleteRow) -> Result<HistoryRow> {
  let league = League::parse(&raw.league)?;
  let provenance = Provenance::from_tag(present(&raw.college_source).unwrap_or(""))?;

  let athlete = Athlete {
    id: raw.id.trim().to_string(),
    league,
    position: text(raw.position),
    jersey: text(raw.jersey),
    active: decode_bool("active", &raw.active)?,
    weight: decode_float("weight", &raw.weight)?,
    height: decode_float("height", &raw.height)?,
    age: decode_int("age", &raw.age)?,
    date_of_birth: text(raw.date_of_birth),
    experience_years: decode_int("experience_years", &raw.experience_years)?,
    birth_place: BirthPlace {
      city:    text(raw.birth_city),
      state:   text(raw.birth_state),
      country: text(raw.birth_country),
    },
    debut_year: decode_int("debutYear", &raw.debut_year)?,
    college: CollegeAttribution {
      name: text(raw.college),
      id: decode_id(raw.college_id),
      provenance,
    },
    draft: Draft {
      year:  decode_int("draftYear", &raw.draft_year)?,
      round: decode_int("draftRound", &raw.draft_round)?,
      pick:  decode_int("draftPick", &raw.draft_pick)?,
      team:  text(raw.draft_team),
    },
    team: text(raw.team),
    full_name: text(raw.full_name),
    first_name: text(raw.first_name),
    last_name: text(raw.last_name),
    pulled_at: decode_dt(&raw.processed_ts)?,
  };

  let is_latest = decode_bool("is_latest", &raw.is_latest)?.unwrap_or(false);
  Ok(HistoryRow { athlete, is_latest })
}

// ─── Alias rows ──────────────────────────────────────────────────────────────

/// One line of the curated alias table. Missing variant columns read as
/// empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAliasRow {
  #[serde(rename = "collegeId")]
  pub college_id:   String,
  pub college:      Option<String>,
  pub display_name: Option<String>,
  pub variant_1:    Option<String>,
  pub variant_2:    Option<String>,
  pub variant_3:    Option<String>,
  pub variant_4:    Option<String>,
  pub variant_5:    Option<String>,
  pub variant_6:    Option<String>,
}

pub fn decode_alias(raw: RawAliasRow) -> AliasRecord {
  let variants = [
    raw.variant_1,
    raw.variant_2,
    raw.variant_3,
    raw.variant_4,
    raw.variant_5,
    raw.variant_6,
  ]
  .into_iter()
  .filter_map(text)
  .collect();

  AliasRecord {
    college_id: decode_id(Some(raw.college_id)).unwrap_or_default(),
    college: text(raw.college),
    display_name: text(raw.display_name),
    variants,
  }
}
