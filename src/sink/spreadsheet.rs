//! Row-oriented xlsx sink.
//!
//! The workbook is never held open between appends. Every append reads the
//! file, derives the next row from the highest populated row, writes one row
//! and saves the whole workbook before returning. That costs O(rows) per
//! record, but the on-disk file is always the authoritative cursor, so a run
//! killed at any point resumes at the right row.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use umya_spreadsheet::Spreadsheet;

use super::error::SinkError;
use crate::product::{COLUMN_HEADERS, ProductRecord};

/// Sheet that holds the product rows.
pub const SHEET_NAME: &str = "Products";

/// Width applied to every column of a fresh workbook.
const COLUMN_WIDTH: f64 = 20.0;

/// Append-only spreadsheet sink.
#[derive(Debug, Clone)]
pub struct SpreadsheetSink {
    path: PathBuf,
}

impl SpreadsheetSink {
    /// Opens the workbook at `path`, creating it with a header row if absent.
    ///
    /// Existing rows are preserved. A fresh workbook gets a bold header row and
    /// fixed column widths and is saved immediately.
    ///
    /// # Errors
    ///
    /// - [`SinkError::Layout`] if the path has no UTF-8 file extension or an existing
    ///   workbook lacks the `Products` sheet
    /// - [`SinkError::Workbook`] if reading or saving fails
    #[instrument(level = "debug", fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        // The xlsx writer stages to `<name>.<ext>tmp` and needs a UTF-8 extension.
        if path.extension().and_then(OsStr::to_str).is_none() {
            return Err(SinkError::layout(
                &path,
                "path needs a UTF-8 file extension (.xlsx)",
            ));
        }
        let sink = Self { path };

        if sink.path.exists() {
            let book = sink.load()?;
            if book.get_sheet_by_name(SHEET_NAME).is_none() {
                return Err(SinkError::layout(
                    &sink.path,
                    format!("missing sheet '{SHEET_NAME}'"),
                ));
            }
            info!(path = %sink.path.display(), "opened existing spreadsheet");
        } else {
            let book = new_workbook(&sink.path)?;
            sink.save(&book)?;
            info!(path = %sink.path.display(), "created new spreadsheet");
        }

        debug!(bytes = file_size(&sink.path), "initial spreadsheet size");
        Ok(sink)
    }

    /// Workbook path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest populated row on disk (the header counts as row 1).
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the workbook cannot be read.
    pub fn row_count(&self) -> Result<u32, SinkError> {
        let book = self.load()?;
        let sheet = book
            .get_sheet_by_name(SHEET_NAME)
            .ok_or_else(|| SinkError::layout(&self.path, format!("missing sheet '{SHEET_NAME}'")))?;
        Ok(sheet.get_highest_row())
    }

    /// Cell values of `row` (1-based), one per column.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the workbook cannot be read.
    pub fn row_values(&self, row: u32) -> Result<Vec<String>, SinkError> {
        let book = self.load()?;
        let sheet = book
            .get_sheet_by_name(SHEET_NAME)
            .ok_or_else(|| SinkError::layout(&self.path, format!("missing sheet '{SHEET_NAME}'")))?;
        Ok((1..=column_count())
            .map(|col| sheet.get_value((col, row)))
            .collect())
    }

    /// Writes `record` on the row after the last populated one and saves.
    ///
    /// Returns the row number written.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the workbook cannot be read, lacks the sheet,
    /// or cannot be saved. Nothing is written in that case.
    #[instrument(level = "debug", skip(self, record), fields(id = %record.id))]
    pub fn append(&self, record: &ProductRecord) -> Result<u32, SinkError> {
        let mut book = self.load()?;
        let sheet = book
            .get_sheet_by_name_mut(SHEET_NAME)
            .ok_or_else(|| SinkError::layout(&self.path, format!("missing sheet '{SHEET_NAME}'")))?;

        let row = sheet.get_highest_row() + 1;
        debug!(row, "writing spreadsheet row");
        for (col, value) in (1_u32..).zip(record.to_row()) {
            sheet.get_cell_mut((col, row)).set_value_string(value);
        }

        self.save(&book)?;
        debug!(
            row,
            bytes = file_size(&self.path),
            "spreadsheet size after write"
        );
        Ok(row)
    }

    fn load(&self) -> Result<Spreadsheet, SinkError> {
        umya_spreadsheet::reader::xlsx::read(&self.path)
            .map_err(|e| SinkError::workbook(&self.path, e))
    }

    fn save(&self, book: &Spreadsheet) -> Result<(), SinkError> {
        umya_spreadsheet::writer::xlsx::write(book, &self.path)
            .map_err(|e| SinkError::workbook(&self.path, e))
    }
}

fn new_workbook(path: &Path) -> Result<Spreadsheet, SinkError> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let sheet = book
        .new_sheet(SHEET_NAME)
        .map_err(|reason| SinkError::layout(path, reason))?;

    for (col, header) in (1_u32..).zip(COLUMN_HEADERS) {
        sheet.get_cell_mut((col, 1)).set_value_string(header);
        sheet.get_style_mut((col, 1)).get_font_mut().set_bold(true);
        sheet
            .get_column_dimension_mut(&column_letter(col))
            .set_width(COLUMN_WIDTH);
    }
    Ok(book)
}

fn column_count() -> u32 {
    u32::try_from(COLUMN_HEADERS.len()).unwrap_or(u32::MAX)
}

/// Spreadsheet column letter for a 1-based index (1 → "A", 27 → "AA").
fn column_letter(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

pub(super) fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}
