//! Diagnostic capture of non-200 response bodies.
//!
//! The fetcher hands every non-success body to a [`DiagnosticSink`]. The file
//! sink writes one artifact per failed attempt for offline inspection; the
//! program never reads them back.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Receives the raw body of every non-200 response.
pub trait DiagnosticSink: Send + Sync + Debug {
    /// Records one failed attempt. Implementations must not fail the fetch.
    fn record(&self, context: &str, status: u16, attempt: u32, body: &[u8]);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl DiagnosticSink for NoDiagnostics {
    fn record(&self, _context: &str, _status: u16, _attempt: u32, _body: &[u8]) {}
}

/// Writes `error_<status>_attempt_<n>.html` files into a directory.
///
/// A non-empty context (the identifier being fetched) prefixes the name so
/// artifacts from different identifiers do not overwrite each other.
#[derive(Debug, Clone)]
pub struct FileDiagnostics {
    dir: PathBuf,
}

impl FileDiagnostics {
    /// Creates a sink writing into `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact for this context/status/attempt is written to.
    #[must_use]
    pub fn artifact_path(&self, context: &str, status: u16, attempt: u32) -> PathBuf {
        self.dir.join(artifact_file_name(context, status, attempt))
    }
}

impl DiagnosticSink for FileDiagnostics {
    fn record(&self, context: &str, status: u16, attempt: u32, body: &[u8]) {
        let path = self.artifact_path(context, status, attempt);
        let written = std::fs::create_dir_all(&self.dir).and_then(|()| std::fs::write(&path, body));
        match written {
            Ok(()) => info!(path = %path.display(), status, attempt, "saved error response"),
            Err(error) => {
                warn!(path = %path.display(), status, attempt, %error, "failed to save error response");
            }
        }
    }
}

fn artifact_file_name(context: &str, status: u16, attempt: u32) -> String {
    let prefix: String = context
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if prefix.is_empty() {
        format!("error_{status}_attempt_{attempt}.html")
    } else {
        format!("{prefix}_error_{status}_attempt_{attempt}.html")
    }
}
