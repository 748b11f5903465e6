//! Output sinks: an xlsx workbook and a CSV file fed the same rows.
//!
//! Both sinks persist every record before [`DualSink::append`] returns. They
//! are independent: a failure in one is reported and the other is still
//! written, so the two files can drift apart after a partial failure.

mod delimited;
mod error;
mod spreadsheet;

use std::path::Path;

use tracing::warn;

pub use delimited::DelimitedSink;
pub use error::SinkError;
pub use spreadsheet::{SHEET_NAME, SpreadsheetSink};

use crate::product::ProductRecord;

/// Per-sink result of one append.
#[derive(Debug)]
pub struct AppendOutcome {
    /// Row written in the spreadsheet.
    pub spreadsheet: Result<u32, SinkError>,
    pub delimited: Result<(), SinkError>,
}

impl AppendOutcome {
    /// True when both sinks accepted the record.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.spreadsheet.is_ok() && self.delimited.is_ok()
    }
}

/// The spreadsheet and CSV sinks, written together.
#[derive(Debug)]
pub struct DualSink {
    spreadsheet: SpreadsheetSink,
    delimited: DelimitedSink,
}

impl DualSink {
    /// Opens (or creates) both output files.
    ///
    /// # Errors
    ///
    /// Returns the first [`SinkError`] hit while opening either file.
    pub fn open(
        spreadsheet_path: impl AsRef<Path>,
        csv_path: impl AsRef<Path>,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            spreadsheet: SpreadsheetSink::open(spreadsheet_path)?,
            delimited: DelimitedSink::open(csv_path)?,
        })
    }

    #[must_use]
    pub fn spreadsheet(&self) -> &SpreadsheetSink {
        &self.spreadsheet
    }

    #[must_use]
    pub fn delimited(&self) -> &DelimitedSink {
        &self.delimited
    }

    /// Appends `record` to both sinks. The CSV is attempted even when the
    /// spreadsheet write fails.
    pub fn append(&mut self, record: &ProductRecord) -> AppendOutcome {
        let spreadsheet = self.spreadsheet.append(record);
        if let Err(e) = &spreadsheet {
            warn!(id = %record.id, error = %e, "failed to write spreadsheet row");
        }

        let delimited = self.delimited.append(record);
        if let Err(e) = &delimited {
            warn!(id = %record.id, error = %e, "failed to write CSV line");
        }

        AppendOutcome {
            spreadsheet,
            delimited,
        }
    }
}
