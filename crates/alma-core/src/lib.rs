//! Core types and trait definitions for the alma player/college dataset.
//!
//! This crate is deliberately free of HTTP and file-format dependencies.
//! The ingestion, storage, and API crates depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod alias;
pub mod athlete;
pub mod eligibility;
pub mod error;
pub mod history;
pub mod quiz;
pub mod store;

pub use error::{Error, Result};
