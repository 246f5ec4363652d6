//! Upstream response shapes.
//!
//! Only the fields the pipeline reads are modelled. Every optional field is
//! decoded leniently: a value of the wrong type reads as absent instead of
//! failing the whole record, so an odd field never costs us an athlete. The
//! only hard requirement is an athlete `id`.

use serde::{Deserialize, Deserializer, de::DeserializeOwned, de::Error as _};
use serde_json::Value;

/// Decode `T`, or `None` when the value is null or of the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Value::deserialize(deserializer)?;
  Ok(serde_json::from_value(value).ok())
}

/// Upstream ids arrive as strings on some endpoints and numbers on others.
fn id_text(value: Value) -> Option<String> {
  match value {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn required_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  id_text(Value::deserialize(deserializer)?)
    .ok_or_else(|| D::Error::custom("athlete id must be a string or number"))
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  Ok(id_text(Value::deserialize(deserializer)?))
}

/// Non-empty text, trimmed.
fn optional_text<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<String>, D::Error> {
  Ok(match Value::deserialize(deserializer)? {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    _ => None,
  })
}

// ─── Links ───────────────────────────────────────────────────────────────────

/// A `{"$ref": "..."}` pointer to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
  #[serde(rename = "$ref")]
  pub href: String,
}

impl Link {
  pub fn href(&self) -> Option<&str> {
    Some(self.href.trim()).filter(|h| !h.is_empty())
  }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// One page of the athlete listing. Items are kept raw and decoded one at a
/// time so a single malformed item does not discard the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
  #[serde(default)]
  pub items:      Vec<Value>,
  #[serde(default, deserialize_with = "lenient")]
  pub page_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Experience {
  #[serde(default, deserialize_with = "lenient")]
  pub years: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BirthPlacePayload {
  #[serde(default, deserialize_with = "optional_text")]
  pub city:    Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub state:   Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub country: Option<String>,
}

/// The summary of one athlete as it appears in the listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteStub {
  #[serde(deserialize_with = "required_id")]
  pub id:            String,
  #[serde(default, deserialize_with = "optional_text")]
  pub full_name:     Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub first_name:    Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub last_name:     Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub jersey:        Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub active:        Option<bool>,
  #[serde(default, deserialize_with = "lenient")]
  pub weight:        Option<f64>,
  #[serde(default, deserialize_with = "lenient")]
  pub height:        Option<f64>,
  #[serde(default, deserialize_with = "lenient")]
  pub age:           Option<u32>,
  #[serde(default, deserialize_with = "optional_text")]
  pub date_of_birth: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub experience:    Option<Experience>,
  #[serde(default, deserialize_with = "lenient")]
  pub birth_place:   Option<BirthPlacePayload>,
}

// ─── Detail ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DraftPayload {
  #[serde(default, deserialize_with = "lenient")]
  pub year:      Option<u16>,
  #[serde(default, deserialize_with = "lenient")]
  pub round:     Option<u8>,
  #[serde(default, deserialize_with = "lenient")]
  pub selection: Option<u16>,
  #[serde(default, deserialize_with = "lenient")]
  pub team:      Option<Link>,
}

/// The full record of one athlete. Related resources are links.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteDetail {
  #[serde(default, deserialize_with = "lenient")]
  pub position:        Option<Link>,
  #[serde(default, deserialize_with = "lenient")]
  pub team:            Option<Link>,
  #[serde(default, deserialize_with = "lenient")]
  pub college:         Option<Link>,
  #[serde(default, deserialize_with = "lenient")]
  pub college_athlete: Option<Link>,
  #[serde(default, deserialize_with = "lenient")]
  pub draft:           Option<DraftPayload>,
  #[serde(default, deserialize_with = "lenient")]
  pub debut_year:      Option<u16>,
}

// ─── Referenced resources ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollegePayload {
  #[serde(default, deserialize_with = "optional_text")]
  pub name: Option<String>,
  #[serde(default, deserialize_with = "optional_id")]
  pub id:   Option<String>,
}

/// The athlete's college-career record; only its college link matters here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollegeAthletePayload {
  #[serde(default, deserialize_with = "lenient")]
  pub college: Option<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamPayload {
  #[serde(default, deserialize_with = "optional_text")]
  pub abbreviation: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub abbrev:       Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionPayload {
  #[serde(default, deserialize_with = "optional_text")]
  pub abbreviation: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub name:         Option<String>,
}
