//! One ingestion run for one league.
//!
//! [`Ingestor::pull`] walks the listing and enriches every athlete, sharing
//! one [`ReferenceResolver`] (and so one reference cache) across the run.
//! [`ingest_league`] wraps a pull with the history table: load, merge,
//! save, summarise.

use std::{
  collections::HashSet,
  time::{Duration, Instant},
};

use alma_core::{
  athlete::{Athlete, AthleteKey, League},
  history::{HistorySummary, MergeMode, MergeReport},
  store::DatasetStore,
};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::{
  Error, Result,
  endpoints::Endpoints,
  enrich::enrich,
  fetch::Fetch,
  paginate::fetch_all,
  resolve::{ReferenceResolver, ResolverStats},
};

/// Athletes the upstream API lists but whose records are known to be broken.
pub const DEFAULT_EXCLUDED_IDS: [&str; 6] =
  ["4246273", "4246281", "4246289", "4246247", "4246272", "4246274"];

const PROGRESS_EVERY: usize = 10;

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IngestSettings {
  pub page_size:     u32,
  /// Pause between listing pages.
  pub page_delay:    Duration,
  /// Pause between athlete detail fetches.
  pub athlete_delay: Duration,
  pub excluded_ids:  HashSet<String>,
}

impl Default for IngestSettings {
  fn default() -> Self {
    Self {
      page_size:     18_000,
      page_delay:    Duration::from_millis(500),
      athlete_delay: Duration::from_millis(50),
      excluded_ids:  DEFAULT_EXCLUDED_IDS.iter().map(|s| s.to_string()).collect(),
    }
  }
}

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
  /// Only enrich athletes with no row in the history table yet.
  pub skip_existing: bool,
  pub merge_mode:    MergeMode,
}

// ─── Pull ────────────────────────────────────────────────────────────────────

/// The rows produced by one pull, before merging.
#[derive(Debug, Clone, Default)]
pub struct Pull {
  pub athletes:           Vec<Athlete>,
  pub listed:             usize,
  pub excluded:           usize,
  pub skipped_existing:   usize,
  pub pages:              u32,
  pub stopped_on_failure: bool,
}

pub struct Ingestor<F> {
  resolver:  ReferenceResolver<F>,
  endpoints: Endpoints,
  settings:  IngestSettings,
}

impl<F: Fetch> Ingestor<F> {
  pub fn new(fetcher: F, endpoints: Endpoints, settings: IngestSettings) -> Self {
    Self {
      resolver: ReferenceResolver::new(fetcher),
      endpoints,
      settings,
    }
  }

  pub fn resolver_stats(&self) -> ResolverStats { self.resolver.stats() }

  /// List and enrich every athlete of `league`, skipping excluded ids and
  /// any identity in `skip`. Every row is stamped with `pulled_at`.
  ///
  /// Returns [`Error::EmptyListing`] when the listing yields no athletes.
  pub async fn pull(
    &mut self,
    league: League,
    pulled_at: DateTime<Utc>,
    skip: &HashSet<AthleteKey>,
  ) -> Result<Pull> {
    let listing = self.endpoints.listing(league, self.settings.page_size);
    let pages = fetch_all(self.resolver.fetcher(), &listing, self.settings.page_delay).await;
    if pages.stubs.is_empty() {
      error!(%league, pages = pages.pages, "listing returned no athletes");
      return Err(Error::EmptyListing(league));
    }

    let mut pull = Pull {
      listed: pages.stubs.len(),
      pages: pages.pages,
      stopped_on_failure: pages.stopped_on_failure,
      ..Pull::default()
    };

    let mut todo = Vec::with_capacity(pages.stubs.len());
    for stub in pages.stubs {
      if self.settings.excluded_ids.contains(&stub.id) {
        pull.excluded += 1;
      } else if skip.contains(&AthleteKey::new(stub.id.clone(), league)) {
        pull.skipped_existing += 1;
      } else {
        todo.push(stub);
      }
    }
    info!(
      %league,
      listed = pull.listed,
      excluded = pull.excluded,
      skipped_existing = pull.skipped_existing,
      to_enrich = todo.len(),
      "listing complete"
    );

    let started = Instant::now();
    let total = todo.len();
    for (i, stub) in todo.iter().enumerate() {
      let athlete = enrich(&mut self.resolver, &self.endpoints, league, stub, pulled_at).await;
      pull.athletes.push(athlete);

      let done = i + 1;
      if done % PROGRESS_EVERY == 0 || done == total {
        let elapsed = started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
        let eta_minutes = if rate > 0.0 { (total - done) as f64 / rate / 60.0 } else { 0.0 };
        info!(
          %league,
          done,
          total,
          rate = %format!("{rate:.1}/s"),
          eta = %format!("{eta_minutes:.1}m"),
          "enriching athletes"
        );
      }
      if done < total && !self.settings.athlete_delay.is_zero() {
        tokio::time::sleep(self.settings.athlete_delay).await;
      }
    }

    Ok(pull)
  }
}

// ─── Run ─────────────────────────────────────────────────────────────────────

/// What an ingestion run did.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
  pub league:   Option<League>,
  pub listed:   usize,
  pub excluded: usize,
  pub skipped:  usize,
  pub merge:    MergeReport,
  /// `false` when there was nothing new and the table was left untouched.
  pub written:  bool,
  pub summary:  HistorySummary,
  pub resolver: ResolverStats,
}

/// Pull `league`, merge the result into its history table, and persist it.
///
/// Nothing is written when the pull fails or produces no new rows.
pub async fn ingest_league<F, S>(
  ingestor: &mut Ingestor<F>,
  store: &S,
  league: League,
  options: IngestOptions,
  pulled_at: DateTime<Utc>,
) -> Result<IngestReport>
where
  F: Fetch,
  S: DatasetStore,
{
  let mut table = store
    .load_history(league)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let skip = if options.skip_existing { table.keys() } else { HashSet::new() };
  let pull = ingestor.pull(league, pulled_at, &skip).await?;

  let mut report = IngestReport {
    league: Some(league),
    listed: pull.listed,
    excluded: pull.excluded,
    skipped: pull.skipped_existing,
    resolver: ingestor.resolver_stats(),
    ..IngestReport::default()
  };

  if !pull.athletes.is_empty() {
    report.merge = table.merge(pull.athletes, options.merge_mode)?;
  }
  if report.merge.appended > 0 {
    store
      .save_history(league, &table)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    report.written = true;
  } else {
    info!(%league, "no new rows, history table left unchanged");
  }

  report.summary = table.summary();
  let s = report.summary;
  info!(
    %league,
    appended = report.merge.appended,
    unchanged = report.merge.skipped,
    total = s.total,
    latest = s.latest,
    historical = s.historical,
    "history updated"
  );
  info!(
    %league,
    college_athlete = s.from_college_athlete,
    direct = s.from_direct,
    none = s.no_college,
    references_fetched = report.resolver.fetches,
    cache_hits = report.resolver.hits,
    "college sources"
  );
  Ok(report)
}
