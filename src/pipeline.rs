//! The sequential fetch, normalize and write loop.
//!
//! Identifiers are processed strictly one at a time, in input order. A failed
//! fetch or parse skips that identifier only. A paced, jittered delay
//! separates consecutive identifiers.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::fetch::constants::INTER_ITEM_DELAY;
use crate::fetch::{BackoffWindow, FetchError, Fetcher};
use crate::product::{NormalizeError, Normalizer};
use crate::sink::{AppendOutcome, DualSink};

/// Why an identifier produced no record.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Normalize(NormalizeError),
}

/// Counters for one pipeline run.
///
/// A record whose fetch and parse succeed counts as `succeeded` even if one
/// of the sinks rejects it; sink rejections are counted separately.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    succeeded: usize,
    fetch_failed: usize,
    parse_failed: usize,
    spreadsheet_failed: usize,
    csv_failed: usize,
}

impl RunStats {
    /// Creates empty stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers fetched and normalized.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Identifiers whose fetch failed.
    #[must_use]
    pub fn fetch_failed(&self) -> usize {
        self.fetch_failed
    }

    /// Identifiers whose payload failed to parse.
    #[must_use]
    pub fn parse_failed(&self) -> usize {
        self.parse_failed
    }

    /// Records the spreadsheet sink rejected.
    #[must_use]
    pub fn spreadsheet_failed(&self) -> usize {
        self.spreadsheet_failed
    }

    /// Records the CSV sink rejected.
    #[must_use]
    pub fn csv_failed(&self) -> usize {
        self.csv_failed
    }

    /// Identifiers skipped without a record.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.fetch_failed + self.parse_failed
    }

    /// Total identifiers processed (succeeded + skipped).
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped()
    }

    fn record_item(&mut self, result: &Result<AppendOutcome, ItemError>) {
        match result {
            Ok(outcome) => {
                self.succeeded += 1;
                if outcome.spreadsheet.is_err() {
                    self.spreadsheet_failed += 1;
                }
                if outcome.delimited.is_err() {
                    self.csv_failed += 1;
                }
            }
            Err(ItemError::Fetch(_)) => self.fetch_failed += 1,
            Err(ItemError::Normalize(_)) => self.parse_failed += 1,
        }
    }
}

/// Owns the fetcher, normalizer and sinks for one run.
#[derive(Debug)]
pub struct Harvester {
    fetcher: Fetcher,
    normalizer: Normalizer,
    sinks: DualSink,
    pacing: BackoffWindow,
}

impl Harvester {
    /// Creates a harvester with the default 2 to 4 second inter-item delay.
    #[must_use]
    pub fn new(fetcher: Fetcher, normalizer: Normalizer, sinks: DualSink) -> Self {
        Self {
            fetcher,
            normalizer,
            sinks,
            pacing: BackoffWindow::from(INTER_ITEM_DELAY),
        }
    }

    /// Replaces the inter-item delay window.
    #[must_use]
    pub fn with_pacing(mut self, pacing: BackoffWindow) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn sinks(&self) -> &DualSink {
        &self.sinks
    }

    /// Fetches, normalizes and writes one identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError`] if the fetch or parse fails; nothing is written
    /// in that case. Sink failures are reported inside the [`AppendOutcome`].
    #[instrument(skip(self))]
    pub async fn process(&mut self, identifier: &str) -> Result<AppendOutcome, ItemError> {
        let body = self
            .fetcher
            .fetch_product(identifier)
            .await
            .map_err(ItemError::Fetch)?;
        debug!(bytes = body.len(), "fetched product payload");

        let record = self
            .normalizer
            .normalize(identifier, &body)
            .map_err(ItemError::Normalize)?;

        let outcome = self.sinks.append(&record);
        if let Ok(row) = &outcome.spreadsheet {
            info!(id = %record.id, row, "record written");
        }
        Ok(outcome)
    }

    /// Processes every identifier in order and returns the run counters.
    pub async fn run<I, S>(&mut self, identifiers: I) -> RunStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = RunStats::new();
        let mut first = true;

        for identifier in identifiers {
            let identifier = identifier.as_ref();
            if !first {
                let delay = self.pacing.sample();
                debug!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "pausing before next identifier"
                );
                tokio::time::sleep(delay).await;
            }
            first = false;

            info!(id = identifier, "processing identifier");
            let result = self.process(identifier).await;
            if let Err(e) = &result {
                warn!(id = identifier, error = %e, "skipping identifier");
            }
            stats.record_item(&result);
        }

        info!(
            succeeded = stats.succeeded(),
            fetch_failed = stats.fetch_failed(),
            parse_failed = stats.parse_failed(),
            spreadsheet_failed = stats.spreadsheet_failed(),
            csv_failed = stats.csv_failed(),
            total = stats.total(),
            "run complete"
        );
        stats
    }
}
