//! CSV backend for the alma dataset store.
//!
//! Wraps the [`csv`] crate so all file access runs on tokio's blocking pool
//! without stalling the async runtime.

mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::CsvStore;
