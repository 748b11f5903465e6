//! Error types for the fetch module.
//!
//! Each variant carries the URL it failed on so log lines and skip reports
//! can be read without the surrounding span.

use thiserror::Error;

/// Errors that end one logical fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure on the final attempt (DNS, refused connection, reset).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the configured timeout on the final attempt.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// A non-200 status that is not eligible for retry.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Every attempt in the budget returned a retryable status.
    #[error("all {attempts} attempts failed fetching {url} (last status {last_status})")]
    ExhaustedRetries {
        /// The URL that was retried.
        url: String,
        /// Attempts consumed.
        attempts: u32,
        /// Status of the last attempt.
        last_status: u16,
    },

    /// The URL could not be parsed; no request was sent.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a non-retryable HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an attempts-exhausted error.
    pub fn exhausted(url: impl Into<String>, attempts: u32, last_status: u16) -> Self {
        Self::ExhaustedRetries {
            url: url.into(),
            attempts,
            last_status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::ExhaustedRetries { last_status, .. } => Some(*last_status),
            Self::Network { .. } | Self::Timeout { .. } | Self::InvalidUrl { .. } => None,
        }
    }
}
