//! Error types for `alma-espn`.

use alma_core::athlete::League;
use thiserror::Error;

/// Why a single upstream request produced no usable JSON.
///
/// These never escape the pipeline: the resolver and the drivers turn them
/// into absent values.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("unexpected status {status} from {url}")]
  Status { url: String, status: u16 },

  #[error("malformed body from {url}: {reason}")]
  Decode { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
  /// The listing endpoint produced no athletes at all, so there is nothing
  /// to enrich or merge.
  #[error("the {0} listing returned no athletes")]
  EmptyListing(League),

  #[error("could not build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("core error: {0}")]
  Core(#[from] alma_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
