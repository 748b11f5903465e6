//! Product API retrieval with retry, backoff and diagnostic capture.
//!
//! # Features
//!
//! - One cookie-carrying session per run with rotating browser user agents
//! - Explicit retry state machine: 429 and 403 back off and retry, transport
//!   errors back off and retry, every other non-200 fails at once
//! - Raw bodies of non-200 responses saved for offline debugging
//! - Transparent gzip/deflate/brotli decoding of response bodies
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use harvester_core::fetch::{Fetcher, FileDiagnostics, RetryPolicy, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::with_diagnostics(
//!     Session::new()?,
//!     RetryPolicy::with_max_attempts(5),
//!     Arc::new(FileDiagnostics::new(".")),
//! );
//! let body = fetcher.fetch_product("AB1234").await?;
//! println!("{} bytes", body.len());
//! # Ok(())
//! # }
//! ```

pub mod constants;
mod diagnostics;
mod error;
mod fetcher;
mod retry;
mod session;

pub use constants::{PRODUCT_MAX_ATTEMPTS, REQUEST_TIMEOUT_SECS};
pub use diagnostics::{DiagnosticSink, FileDiagnostics, NoDiagnostics};
pub use error::FetchError;
pub use fetcher::Fetcher;
pub use retry::{
    AttemptOutcome, BackoffSchedule, BackoffWindow, FailReason, FailureType, FetchState,
    RetryPolicy, classify_status,
};
pub use session::Session;
