//! The `DatasetStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `alma-store-csv`).
//! The ingestion pipeline, the CLI, and the quiz API depend on this
//! abstraction, not on any concrete file format.

use std::future::Future;

use crate::{
  alias::AliasTable,
  athlete::{Athlete, League},
  history::HistoryTable,
};

/// Abstraction over the persisted dataset: one history table per league,
/// the curated alias table, and the derived quiz-ready table.
///
/// History tables are append-only by contract: [`DatasetStore::save_history`]
/// is only ever called with a table that extends the one previously loaded.
pub trait DatasetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the history table for `league`. A missing table loads as empty.
  fn load_history(
    &self,
    league: League,
  ) -> impl Future<Output = Result<HistoryTable, Self::Error>> + Send + '_;

  /// Replace the stored history table for `league` with `table`.
  fn save_history<'a>(
    &'a self,
    league: League,
    table: &'a HistoryTable,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Load the curated alias table.
  fn load_aliases(&self) -> impl Future<Output = Result<AliasTable, Self::Error>> + Send + '_;

  /// Load the quiz-ready player table.
  fn load_quiz_players(
    &self,
  ) -> impl Future<Output = Result<Vec<Athlete>, Self::Error>> + Send + '_;

  /// Replace the quiz-ready player table.
  fn save_quiz_players<'a>(
    &'a self,
    players: &'a [Athlete],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
