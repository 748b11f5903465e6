//! Product identifier (SKU) extraction from saved listing pages.
//!
//! Two passes run over the HTML: product links first, then any standalone
//! token of the same shape. New identifiers keep first-seen order and are
//! deduplicated against the existing list and within the scan.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[allow(clippy::expect_used)]
static PRODUCT_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="[^"]*/products/([A-Z]{2}[0-9]{4})[^"]*""#)
        .expect("product link regex is valid")
});

#[allow(clippy::expect_used)]
static BARE_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)([A-Z]{2}[0-9]{4})(?-u:\b)").expect("bare SKU regex is valid")
});

/// Errors reading or appending the identifier list.
#[derive(Debug, Error)]
pub enum SkuListError {
    #[error("failed to read SKU list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to SKU list {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of scanning one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuScan {
    /// Identifiers not already known, in discovery order.
    pub skus: Vec<String>,
    /// Raw number of product-link matches (before dedup).
    pub link_matches: usize,
    /// Raw number of standalone token matches (before dedup).
    pub text_matches: usize,
}

/// Scans `html` for identifiers absent from `existing`.
#[must_use]
pub fn scan_html(html: &str, existing: &HashSet<String>) -> SkuScan {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut scan = SkuScan::default();

    for (pattern, counter) in [
        (&*PRODUCT_LINK_PATTERN, &mut scan.link_matches),
        (&*BARE_TOKEN_PATTERN, &mut scan.text_matches),
    ] {
        for captures in pattern.captures_iter(html) {
            *counter += 1;
            let Some(sku) = captures.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if existing.contains(sku) || !seen.insert(sku) {
                continue;
            }
            debug!(sku, "extracted SKU");
            scan.skus.push(sku.to_string());
        }
    }

    scan
}

/// Identifiers in `html` that are not in `existing`, in discovery order.
#[must_use]
pub fn extract_skus(html: &str, existing: &HashSet<String>) -> Vec<String> {
    scan_html(html, existing).skus
}

/// Loads the identifier list as a set. A missing file is an empty list.
///
/// # Errors
///
/// Returns [`SkuListError::Read`] for any error other than "not found".
pub fn load_existing_skus(path: impl AsRef<Path>) -> Result<HashSet<String>, SkuListError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(source) => Err(SkuListError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Appends `skus` to the list, one per line, creating the file if needed.
///
/// # Errors
///
/// Returns [`SkuListError::Write`] if the file cannot be opened or written.
pub fn append_skus(path: impl AsRef<Path>, skus: &[String]) -> Result<(), SkuListError> {
    let path = path.as_ref();
    let write_err = |source| SkuListError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    for sku in skus {
        writeln!(writer, "{sku}").map_err(write_err)?;
    }
    writer.flush().map_err(write_err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    // ==================== Extraction Tests ====================

    #[test]
    fn test_known_link_and_new_bare_token() {
        let html = r#"<a href="/products/AB1234?x=1">x</a> CD5678"#;
        let skus = extract_skus(html, &set(&["AB1234"]));
        assert_eq!(skus, vec!["CD5678"]);
    }

    #[test]
    fn test_links_come_before_bare_tokens() {
        let html = r#"ZZ0001 <a href="https://shop.example.com/products/AB1234/">x</a>"#;
        let scan = scan_html(html, &HashSet::new());
        assert_eq!(scan.skus, vec!["AB1234", "ZZ0001"]);
        assert_eq!(scan.link_matches, 1);
        // AB1234 inside the href also matches the bare pattern.
        assert_eq!(scan.text_matches, 2);
    }

    #[test]
    fn test_duplicates_within_scan_are_dropped() {
        let html = r#"<a href="/products/AB1234">a</a><a href="/products/AB1234?c=2">b</a> AB1234"#;
        let scan = scan_html(html, &HashSet::new());
        assert_eq!(scan.skus, vec!["AB1234"]);
        assert_eq!(scan.link_matches, 2);
    }

    #[test]
    fn test_token_boundaries() {
        // Embedded in a longer word or number: no match.
        let html = "XAB1234 AB12345 ab1234 A1234 [EF9012]";
        assert_eq!(extract_skus(html, &HashSet::new()), vec!["EF9012"]);
    }

    #[test]
    fn test_no_matches() {
        let scan = scan_html("<html><body>nothing here</body></html>", &HashSet::new());
        assert!(scan.skus.is_empty());
        assert_eq!(scan.link_matches, 0);
        assert_eq!(scan.text_matches, 0);
    }

    // ==================== List File Tests ====================

    #[test]
    fn test_missing_list_is_empty() {
        let temp = TempDir::new().unwrap();
        let existing = load_existing_skus(temp.path().join("skus.txt")).unwrap();
        assert!(existing.is_empty());
    }

    #[test]
    fn test_append_creates_then_extends_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("skus.txt");

        append_skus(&path, &["AB1234".to_string()]).unwrap();
        append_skus(&path, &["CD5678".to_string(), "EF9012".to_string()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "AB1234\nCD5678\nEF9012\n");
        assert_eq!(load_existing_skus(&path).unwrap(), set(&["AB1234", "CD5678", "EF9012"]));
    }

    #[test]
    fn test_load_ignores_blank_lines_and_whitespace() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("skus.txt");
        std::fs::write(&path, "  AB1234 \n\n\tCD5678\n").unwrap();
        assert_eq!(load_existing_skus(&path).unwrap(), set(&["AB1234", "CD5678"]));
    }

    #[test]
    fn test_load_directory_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(load_existing_skus(temp.path()).is_err());
    }
}
