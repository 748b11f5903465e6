//! Append-mode CSV sink.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::error::SinkError;
use super::spreadsheet::file_size;
use crate::product::{COLUMN_HEADERS, ProductRecord};

/// CSV sink that relies on append mode for positioning.
///
/// The file length at open time only decides whether a header line is
/// written; it is never used as a write offset. Each line is encoded in
/// memory and written in one call, so a failed record leaves nothing buffered
/// for the next append.
#[derive(Debug)]
pub struct DelimitedSink {
    path: PathBuf,
    file: File,
}

impl DelimitedSink {
    /// Opens `path` for appending, creating it if absent.
    ///
    /// A header line is written (and flushed) only when the file is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be opened or the header
    /// cannot be written.
    #[instrument(level = "debug", fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SinkError::io(&path, e))?;
        let existing = file.metadata().map_err(|e| SinkError::io(&path, e))?.len();

        let mut sink = Self { path, file };

        if existing == 0 {
            sink.write_line(&COLUMN_HEADERS)?;
            info!(path = %sink.path.display(), "created new CSV file with header");
        } else {
            info!(path = %sink.path.display(), bytes = existing, "appending to existing CSV file");
        }
        Ok(sink)
    }

    /// CSV path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line for `record` and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if writing or flushing fails.
    #[instrument(level = "debug", skip(self, record), fields(id = %record.id))]
    pub fn append(&mut self, record: &ProductRecord) -> Result<(), SinkError> {
        self.write_line(&record.to_row())?;
        debug!(bytes = file_size(&self.path), "CSV size after write");
        Ok(())
    }

    fn write_line<I, T>(&mut self, fields: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let line = encode_line(fields).map_err(|e| SinkError::csv(&self.path, e))?;
        let before = self
            .file
            .metadata()
            .map_err(|e| SinkError::io(&self.path, e))?
            .len();

        if let Err(error) = write_encoded(&mut self.file, &line) {
            // Drop any partial line so the file still ends on a record boundary.
            if let Err(rollback) = self.file.set_len(before) {
                warn!(path = %self.path.display(), error = %rollback, "failed to roll back partial CSV line");
            }
            return Err(SinkError::io(&self.path, error));
        }
        Ok(())
    }
}

/// Encodes one CSV line (with terminator) without touching the output file.
fn encode_line<I, T>(fields: I) -> Result<Vec<u8>, csv::Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut encoder = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    encoder.write_record(fields)?;
    encoder
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn write_encoded<W: Write>(out: &mut W, line: &[u8]) -> io::Result<()> {
    out.write_all(line)?;
    out.flush()
}
