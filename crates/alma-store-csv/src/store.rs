//! [`CsvStore`], the CSV implementation of [`DatasetStore`].

use std::{
  fs,
  path::{Path, PathBuf},
};

use alma_core::{
  alias::AliasTable,
  athlete::{Athlete, League},
  history::{HistoryRow, HistoryTable},
  store::DatasetStore,
};

use crate::{
  Error, Result,
  encode::{RawAliasRow, RawAthleteRow, decode_alias, decode_row, encode_row},
};

// ─── Layout ──────────────────────────────────────────────────────────────────

const HISTORY_DIR: &str = "espn";
const MANUAL_DIR: &str = "manual";
const APP_DIR: &str = "app_data";
const ALIAS_FILE: &str = "accepted_answers.csv";
const QUIZ_FILE: &str = "player_college_data.csv";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dataset store rooted at one data directory:
///
/// ```text
/// <root>/espn/<league>_espn_api_players.csv   history, one per league
/// <root>/manual/accepted_answers.csv          curated aliases
/// <root>/app_data/player_college_data.csv     quiz-ready players
/// ```
#[derive(Debug, Clone)]
pub struct CsvStore {
  root: PathBuf,
}

impl CsvStore {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  pub fn history_path(&self, league: League) -> PathBuf {
    self
      .root
      .join(HISTORY_DIR)
      .join(format!("{league}_espn_api_players.csv"))
  }

  pub fn aliases_path(&self) -> PathBuf { self.root.join(MANUAL_DIR).join(ALIAS_FILE) }

  pub fn quiz_path(&self) -> PathBuf { self.root.join(APP_DIR).join(QUIZ_FILE) }
}

/// Run blocking file work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T>
where
  T: Send + 'static,
  F: FnOnce() -> Result<T> + Send + 'static,
{
  tokio::task::spawn_blocking(work).await?
}

// ─── Blocking file access ────────────────────────────────────────────────────

fn read_athletes(path: &Path) -> Result<Vec<HistoryRow>> {
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
  let mut rows = Vec::new();
  for record in reader.deserialize::<RawAthleteRow>() {
    rows.push(decode_row(record?)?);
  }
  Ok(rows)
}

/// Write to a sibling temp file, then rename over `path`, so an interrupted
/// write never truncates the previous table.
fn write_athletes<'a>(
  path: &Path,
  rows: impl IntoIterator<Item = (&'a Athlete, bool)>,
) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|source| Error::Io {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  let tmp = path.with_extension("csv.tmp");
  {
    let mut writer = csv::Writer::from_path(&tmp)?;
    for (athlete, is_latest) in rows {
      writer.serialize(encode_row(athlete, is_latest))?;
    }
    writer.flush().map_err(|source| Error::Io { path: tmp.clone(), source })?;
  }
  fs::rename(&tmp, path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })
}

fn read_aliases(path: &Path) -> Result<AliasTable> {
  if !path.exists() {
    return Err(Error::Missing(path.to_path_buf()));
  }
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
  let mut records = Vec::new();
  for record in reader.deserialize::<RawAliasRow>() {
    records.push(decode_alias(record?));
  }
  Ok(AliasTable::from_records(records))
}

// ─── DatasetStore impl ───────────────────────────────────────────────────────

impl DatasetStore for CsvStore {
  type Error = Error;

  async fn load_history(&self, league: League) -> Result<HistoryTable> {
    let path = self.history_path(league);
    blocking(move || {
      if !path.exists() {
        tracing::info!(path = %path.display(), "no history table yet, starting empty");
        return Ok(HistoryTable::new());
      }
      let rows = read_athletes(&path)?;
      tracing::debug!(path = %path.display(), rows = rows.len(), "loaded history table");
      Ok(HistoryTable::from_rows(rows))
    })
    .await
  }

  async fn save_history<'a>(&'a self, league: League, table: &'a HistoryTable) -> Result<()> {
    let path = self.history_path(league);
    let rows = table.rows().to_vec();
    blocking(move || {
      write_athletes(&path, rows.iter().map(|r| (&r.athlete, r.is_latest)))?;
      tracing::info!(path = %path.display(), rows = rows.len(), "wrote history table");
      Ok(())
    })
    .await
  }

  async fn load_aliases(&self) -> Result<AliasTable> {
    let path = self.aliases_path();
    blocking(move || read_aliases(&path)).await
  }

  async fn load_quiz_players(&self) -> Result<Vec<Athlete>> {
    let path = self.quiz_path();
    blocking(move || {
      if !path.exists() {
        return Err(Error::Missing(path));
      }
      Ok(read_athletes(&path)?.into_iter().map(|r| r.athlete).collect())
    })
    .await
  }

  async fn save_quiz_players<'a>(&'a self, players: &'a [Athlete]) -> Result<()> {
    let path = self.quiz_path();
    let players = players.to_vec();
    blocking(move || {
      write_athletes(&path, players.iter().map(|a| (a, true)))?;
      tracing::info!(path = %path.display(), rows = players.len(), "wrote quiz table");
      Ok(())
    })
    .await
  }
}
