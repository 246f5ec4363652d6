//! Scripted test doubles for the fetch and store seams.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::Mutex,
};

use alma_core::{
  alias::AliasTable,
  athlete::{Athlete, League},
  history::HistoryTable,
  store::DatasetStore,
};
use serde_json::Value;

use crate::{FetchError, fetch::Fetch};

/// Serves canned bodies by exact URL; anything else is a 404. Counts every
/// request per URL.
#[derive(Debug, Default)]
pub struct FakeFetcher {
  responses: HashMap<String, Value>,
  calls:     Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
  pub fn new() -> Self { Self::default() }

  pub fn with(mut self, url: impl Into<String>, body: Value) -> Self {
    self.responses.insert(url.into(), body);
    self
  }

  pub fn calls(&self, url: &str) -> usize {
    self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
  }

  pub fn total_calls(&self) -> usize { self.calls.lock().unwrap().values().sum() }
}

impl Fetch for FakeFetcher {
  async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
    *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
    self.responses.get(url).cloned().ok_or_else(|| FetchError::Status {
      url:    url.to_string(),
      status: 404,
    })
  }
}

/// History tables held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
  pub history: Mutex<HashMap<League, HistoryTable>>,
  pub saves:   Mutex<usize>,
}

impl MemoryStore {
  pub fn table(&self, league: League) -> HistoryTable {
    self.history.lock().unwrap().get(&league).cloned().unwrap_or_default()
  }

  pub fn saves(&self) -> usize { *self.saves.lock().unwrap() }
}

impl DatasetStore for MemoryStore {
  type Error = Infallible;

  async fn load_history(&self, league: League) -> Result<HistoryTable, Infallible> {
    Ok(self.table(league))
  }

  async fn save_history<'a>(
    &'a self,
    league: League,
    table: &'a HistoryTable,
  ) -> Result<(), Infallible> {
    self.history.lock().unwrap().insert(league, table.clone());
    *self.saves.lock().unwrap() += 1;
    Ok(())
  }

  async fn load_aliases(&self) -> Result<AliasTable, Infallible> { Ok(AliasTable::default()) }

  async fn load_quiz_players(&self) -> Result<Vec<Athlete>, Infallible> { Ok(Vec::new()) }

  async fn save_quiz_players<'a>(&'a self, _players: &'a [Athlete]) -> Result<(), Infallible> {
    Ok(())
  }
}
