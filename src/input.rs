//! Identifier list input.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors reading the identifier list.
#[derive(Debug, Error)]
pub enum InputError {
    /// The list file could not be read.
    #[error("failed to read identifier list {path}: {source}")]
    Read {
        /// List path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Splits list text into identifiers: one per line, trimmed, blanks dropped.
///
/// Order and duplicates are preserved.
#[must_use]
pub fn parse_identifiers(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Reads the identifier list at `path`.
///
/// # Errors
///
/// Returns [`InputError::Read`] if the file cannot be read.
pub fn read_identifiers(path: impl AsRef<Path>) -> Result<Vec<String>, InputError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let identifiers = parse_identifiers(&text);
    debug!(path = %path.display(), count = identifiers.len(), "read identifier list");
    Ok(identifiers)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let ids = parse_identifiers("AB1234\n\n  CD5678  \r\n\t\nEF9012\n");
        assert_eq!(ids, vec!["AB1234", "CD5678", "EF9012"]);
    }

    #[test]
    fn test_parse_keeps_duplicates_in_order() {
        let ids = parse_identifiers("B\nA\nB\n");
        assert_eq!(ids, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_identifiers("").is_empty());
        assert!(parse_identifiers("\n  \n").is_empty());
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("skus.txt");
        let err = read_identifiers(&missing).unwrap_err();
        assert!(err.to_string().contains("skus.txt"), "{err}");
    }

    #[test]
    fn test_read_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("skus.txt");
        std::fs::write(&path, "AB1234\nCD5678\n").unwrap();
        assert_eq!(read_identifiers(&path).unwrap(), vec!["AB1234", "CD5678"]);
    }
}
