//! The per-run reference resolver and its cache.
//!
//! Thousands of athletes share a few hundred colleges and a few dozen teams
//! and positions. Every `$ref` is fetched at most once per run: the first
//! resolution (including "absent") is cached and reused.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
  fetch::Fetch,
  payload::{CollegeAthletePayload, CollegePayload, PositionPayload, TeamPayload},
};

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Resolved values keyed by reference URL. `None` records a reference that
/// was fetched and yielded nothing usable; it is never re-fetched.
#[derive(Debug, Clone)]
pub struct RefCache<V> {
  entries: HashMap<String, Option<V>>,
}

impl<V> Default for RefCache<V> {
  fn default() -> Self {
    Self { entries: HashMap::new() }
  }
}

impl<V: Clone> RefCache<V> {
  pub fn get(&self, reference: &str) -> Option<Option<V>> { self.entries.get(reference).cloned() }

  pub fn insert(&mut self, reference: impl Into<String>, value: Option<V>) {
    self.entries.insert(reference.into(), value);
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Counters for one run, reported in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverStats {
  /// Requests actually sent.
  pub fetches:  usize,
  /// Lookups answered from the cache.
  pub hits:     usize,
  /// Requests that failed or returned nothing usable.
  pub failures: usize,
}

// ─── Resolved values ─────────────────────────────────────────────────────────

/// A college's display name and upstream id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollegeRecord {
  pub name: String,
  pub id:   Option<String>,
}

fn decode<T: DeserializeOwned>(value: Value) -> Option<T> { serde_json::from_value(value).ok() }

fn decode_college(value: Value) -> Option<CollegeRecord> {
  let payload: CollegePayload = decode(value)?;
  Some(CollegeRecord { name: payload.name?, id: payload.id })
}

fn decode_college_link(value: Value) -> Option<String> {
  let payload: CollegeAthletePayload = decode(value)?;
  payload.college?.href().map(str::to_string)
}

fn decode_team(value: Value) -> Option<String> {
  let payload: TeamPayload = decode(value)?;
  payload.abbreviation.or(payload.abbrev)
}

fn decode_position(value: Value) -> Option<String> {
  let payload: PositionPayload = decode(value)?;
  payload.abbreviation.or(payload.name)
}

async fn resolve_cached<F, V>(
  fetcher: &F,
  cache: &mut RefCache<V>,
  stats: &mut ResolverStats,
  reference: &str,
  extract: fn(Value) -> Option<V>,
) -> Option<V>
where
  F: Fetch,
  V: Clone,
{
  let reference = reference.trim();
  if reference.is_empty() {
    return None;
  }
  if let Some(cached) = cache.get(reference) {
    stats.hits += 1;
    return cached;
  }

  stats.fetches += 1;
  let value = match fetcher.get_json(reference).await {
    Ok(body) => extract(body),
    Err(e) => {
      debug!(reference, error = %e, "reference fetch failed");
      None
    }
  };
  if value.is_none() {
    stats.failures += 1;
  }
  cache.insert(reference, value.clone());
  value
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Resolves `$ref` links through a [`Fetch`], caching every outcome for
/// the lifetime of the resolver (one ingestion run).
#[derive(Debug)]
pub struct ReferenceResolver<F> {
  fetcher:       F,
  colleges:      RefCache<CollegeRecord>,
  college_links: RefCache<String>,
  teams:         RefCache<String>,
  positions:     RefCache<String>,
  stats:         ResolverStats,
}

impl<F: Fetch> ReferenceResolver<F> {
  pub fn new(fetcher: F) -> Self {
    Self {
      fetcher,
      colleges: RefCache::default(),
      college_links: RefCache::default(),
      teams: RefCache::default(),
      positions: RefCache::default(),
      stats: ResolverStats::default(),
    }
  }

  /// The underlying fetcher, for requests that are not cached references.
  pub fn fetcher(&self) -> &F { &self.fetcher }

  pub fn stats(&self) -> ResolverStats { self.stats }

  /// Distinct references resolved so far.
  pub fn cached(&self) -> usize {
    self.colleges.len() + self.college_links.len() + self.teams.len() + self.positions.len()
  }

  /// A college resource: its `name` (required) and `id`.
  pub async fn college(&mut self, reference: &str) -> Option<CollegeRecord> {
    resolve_cached(
      &self.fetcher,
      &mut self.colleges,
      &mut self.stats,
      reference,
      decode_college,
    )
    .await
  }

  /// A college-athlete resource: the `$ref` of the college it points to.
  pub async fn college_link(&mut self, reference: &str) -> Option<String> {
    resolve_cached(
      &self.fetcher,
      &mut self.college_links,
      &mut self.stats,
      reference,
      decode_college_link,
    )
    .await
  }

  /// A team resource: `abbreviation`, falling back to `abbrev`.
  pub async fn team_abbreviation(&mut self, reference: &str) -> Option<String> {
    resolve_cached(&self.fetcher, &mut self.teams, &mut self.stats, reference, decode_team).await
  }

  /// A position resource: `abbreviation`, falling back to `name`.
  pub async fn position(&mut self, reference: &str) -> Option<String> {
    resolve_cached(
      &self.fetcher,
      &mut self.positions,
      &mut self.stats,
      reference,
      decode_position,
    )
    .await
  }
}
