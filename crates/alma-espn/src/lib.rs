//! Ingestion of athlete records from the ESPN sports-core API.
//!
//! The pipeline is strictly sequential: list every athlete page by page,
//! fetch each athlete's detail record, follow its `$ref` links (position,
//! team, college) through a per-run [`ReferenceResolver`], and merge the
//! resulting rows into the league's history table.
//!
//! Individual fetch failures never abort a run; they degrade to empty
//! fields.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod college;
pub mod endpoints;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod paginate;
pub mod payload;
pub mod resolve;

pub use endpoints::Endpoints;
pub use error::{Error, FetchError, Result};
pub use fetch::{Fetch, HttpFetcher};
pub use ingest::{IngestOptions, IngestReport, IngestSettings, Ingestor, ingest_league};
pub use resolve::ReferenceResolver;

#[cfg(test)]
mod testing;
