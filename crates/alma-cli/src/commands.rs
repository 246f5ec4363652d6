//! Subcommand implementations.

use std::sync::Arc;

use alma_api::{QuizState, api_router};
use alma_core::{
  athlete::{Athlete, League},
  eligibility::quiz_ready,
  history::MergeMode,
  store::DatasetStore,
};
use alma_espn::{Endpoints, HttpFetcher, IngestOptions, Ingestor, ingest_league};
use alma_store_csv::CsvStore;
use anyhow::{Context as _, bail};
use chrono::Utc;
use strum::IntoEnumIterator as _;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::settings::Settings;

// ─── ingest ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestFlags {
  pub skip_existing:  bool,
  pub skip_unchanged: bool,
}

/// Pull every league in `leagues` in turn. A failed league is logged and
/// the remaining leagues still run; the command fails if any league did.
pub async fn ingest(settings: &Settings, leagues: &[League], flags: IngestFlags) -> anyhow::Result<()> {
  let store = CsvStore::new(&settings.data_dir);
  let options = IngestOptions {
    skip_existing: flags.skip_existing,
    merge_mode:    if flags.skip_unchanged { MergeMode::SkipUnchanged } else { MergeMode::AppendAll },
  };

  let mut failed = Vec::new();
  for &league in leagues {
    // One fetcher and one reference cache per run.
    let fetcher = HttpFetcher::new(settings.request_timeout(), &settings.user_agent)
      .context("failed to build HTTP client")?;
    let mut ingestor = Ingestor::new(
      fetcher,
      Endpoints::new(settings.api_base_url.clone()),
      settings.ingest(),
    );

    let pulled_at = Utc::now();
    info!(%league, %pulled_at, "starting ingestion");
    match ingest_league(&mut ingestor, &store, league, options, pulled_at).await {
      Ok(report) => info!(
        %league,
        written = report.written,
        appended = report.merge.appended,
        "ingestion finished"
      ),
      Err(e) => {
        error!(%league, error = %e, "ingestion failed");
        failed.push(league);
      }
    }
  }

  if !failed.is_empty() {
    let names: Vec<String> = failed.iter().map(League::to_string).collect();
    bail!("ingestion failed for: {}", names.join(", "));
  }
  Ok(())
}

// ─── prepare ─────────────────────────────────────────────────────────────────

/// Reduce every league's history table to its quiz-eligible rows, in league
/// order.
pub async fn quiz_players<S>(store: &S) -> anyhow::Result<Vec<Athlete>>
where
  S: DatasetStore,
{
  let mut players = Vec::new();
  for league in League::iter() {
    let table = store
      .load_history(league)
      .await
      .with_context(|| format!("failed to load {league} history"))?;
    let eligible = quiz_ready(&table);
    info!(%league, current = table.latest().count(), eligible = eligible.len(), "filtered league");
    players.extend(eligible);
  }
  Ok(players)
}

pub async fn prepare(settings: &Settings) -> anyhow::Result<()> {
  let store = CsvStore::new(&settings.data_dir);
  let players = quiz_players(&store).await?;
  if players.is_empty() {
    bail!("no quiz-eligible players in {}", settings.data_dir.display());
  }
  store
    .save_quiz_players(&players)
    .await
    .context("failed to write quiz table")?;
  info!(players = players.len(), path = %store.quiz_path().display(), "quiz table ready");
  Ok(())
}

// ─── serve ───────────────────────────────────────────────────────────────────

pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
  let store = CsvStore::new(&settings.data_dir);
  let players = store
    .load_quiz_players()
    .await
    .context("failed to load quiz table (run `alma prepare` first)")?;
  let aliases = store
    .load_aliases()
    .await
    .context("failed to load accepted answers")?;
  info!(players = players.len(), colleges = aliases.len(), "loaded quiz data");

  let state = QuizState::new(players, aliases).with_session_ttl(settings.session_ttl());
  let app = axum::Router::new().nest("/api", api_router(Arc::new(state)));
  let address = settings.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}
