//! Error type for `alma-store-csv`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] alma_core::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("i/o error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A required file (alias table, quiz table) does not exist.
  #[error("missing file: {0}")]
  Missing(PathBuf),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("invalid value {value:?} in column {column}")]
  Field {
    column: &'static str,
    value:  String,
  },

  #[error("blocking task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
