//! Integration tests for resuming the xlsx and CSV sinks across runs.

use tempfile::TempDir;

use harvester_core::product::{COLUMN_HEADERS, Normalizer};
use harvester_core::sink::{DualSink, SpreadsheetSink};
mod support;
use support::fixtures::product_json;

fn record(id: &str) -> harvester_core::ProductRecord {
    Normalizer::default()
        .normalize(id, product_json(id, "Runner").as_bytes())
        .unwrap()
}

fn csv_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|row| row.unwrap().iter().map(ToString::to_string).collect())
        .collect()
}

#[test]
fn test_rerun_appends_after_existing_rows_without_new_header() {
    let temp = TempDir::new().unwrap();
    let xlsx = temp.path().join("products.xlsx");
    let csv = temp.path().join("products.csv");

    // First run: two records.
    {
        let mut sinks = DualSink::open(&xlsx, &csv).unwrap();
        assert!(sinks.append(&record("AB1234")).is_complete());
        assert!(sinks.append(&record("CD5678")).is_complete());
    }

    // Second run: N = 3 rows on disk (header + 2), next write lands on row 4.
    let mut sinks = DualSink::open(&xlsx, &csv).unwrap();
    assert_eq!(sinks.spreadsheet().row_count().unwrap(), 3);
    let outcome = sinks.append(&record("EF9012"));
    assert_eq!(outcome.spreadsheet.unwrap(), 4);
    outcome.delimited.unwrap();

    let sheet = SpreadsheetSink::open(&xlsx).unwrap();
    assert_eq!(sheet.row_values(1).unwrap(), COLUMN_HEADERS.to_vec());
    let ids: Vec<String> = (2..=4)
        .map(|row| sheet.row_values(row).unwrap()[0].clone())
        .collect();
    assert_eq!(ids, vec!["AB1234", "CD5678", "EF9012"]);

    let rows = csv_rows(&csv);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], COLUMN_HEADERS.to_vec());
    assert_eq!(rows.iter().filter(|row| row[0] == "ID").count(), 1);
    assert_eq!(rows[3][0], "EF9012");
}

#[test]
fn test_both_sinks_share_column_layout() {
    let temp = TempDir::new().unwrap();
    let xlsx = temp.path().join("products.xlsx");
    let csv = temp.path().join("products.csv");

    let mut sinks = DualSink::open(&xlsx, &csv).unwrap();
    let product = record("AB1234");
    assert!(sinks.append(&product).is_complete());

    let sheet_row = sinks.spreadsheet().row_values(2).unwrap();
    let csv_row = csv_rows(&csv).remove(1);
    assert_eq!(sheet_row, csv_row);
    assert_eq!(sheet_row, product.to_row().to_vec());
    assert_eq!(sheet_row.len(), COLUMN_HEADERS.len());
    assert_eq!(sheet_row[3], "12100 JPY");
    assert_eq!(sheet_row[5], "26.0,27.0");
    assert_eq!(sheet_row[6], "black,white");
}

#[test]
fn test_existing_csv_without_workbook_keeps_its_content() {
    let temp = TempDir::new().unwrap();
    let xlsx = temp.path().join("products.xlsx");
    let csv = temp.path().join("products.csv");
    std::fs::write(&csv, "ID,URL\nOLD0001,https://old\n").unwrap();

    let mut sinks = DualSink::open(&xlsx, &csv).unwrap();
    assert!(sinks.append(&record("AB1234")).is_complete());

    let text = std::fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("ID,URL\nOLD0001,https://old\nAB1234,"), "{text}");
    assert_eq!(sinks.spreadsheet().row_count().unwrap(), 2);
}
