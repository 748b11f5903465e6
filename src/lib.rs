//! Product Harvester Core Library
//!
//! Fetches product detail payloads from a retail product API, normalizes them
//! into flat records, and appends each record durably to an xlsx workbook and
//! a CSV file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - HTTP session, retry state machine, diagnostic capture
//! - [`product`] - Canonical record and payload normalization
//! - [`sink`] - Incremental spreadsheet and CSV writers
//! - [`pipeline`] - Sequential fetch, normalize, write loop
//! - [`input`] - Identifier list reading
//! - [`sku`] - Identifier extraction from saved HTML pages

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fetch;
pub mod input;
pub mod pipeline;
pub mod product;
pub mod sink;
pub mod sku;
pub mod user_agent;

// Re-export commonly used types
pub use fetch::{FetchError, Fetcher, RetryPolicy, Session};
pub use input::{InputError, read_identifiers};
pub use pipeline::{Harvester, ItemError, RunStats};
pub use product::{NormalizeError, Normalizer, ProductRecord};
pub use sink::{AppendOutcome, DualSink, SinkError};
pub use sku::{SkuListError, extract_skus};
