//! Error types for `alma-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown league: {0:?}")]
  UnknownLeague(String),

  #[error("unknown college provenance: {0:?}")]
  UnknownProvenance(String),

  #[error("no player is awaiting an answer")]
  NoCurrentPlayer,

  #[error("only an unchallenged incorrect answer can be challenged")]
  ChallengeNotAllowed,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
