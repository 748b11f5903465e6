//! Retrying fetcher: drives the [`FetchState`] machine for one logical request.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::diagnostics::{DiagnosticSink, NoDiagnostics};
use super::error::FetchError;
use super::retry::{AttemptOutcome, FailReason, FetchState, RetryPolicy};
use super::session::Session;

/// Session + retry policy + diagnostic capture.
///
/// Created once per run and passed by reference to the pipeline; the
/// session's cookie jar is shared by every fetch made through it.
#[derive(Debug, Clone)]
pub struct Fetcher {
    session: Session,
    policy: RetryPolicy,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Fetcher {
    /// Creates a fetcher that discards diagnostic bodies.
    #[must_use]
    pub fn new(session: Session, policy: RetryPolicy) -> Self {
        Self::with_diagnostics(session, policy, Arc::new(NoDiagnostics))
    }

    /// Creates a fetcher that hands every non-200 body to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(
        session: Session,
        policy: RetryPolicy,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            session,
            policy,
            diagnostics,
        }
    }

    /// Underlying session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Retry policy in effect.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches the product detail payload for `identifier`.
    ///
    /// # Errors
    ///
    /// See [`Fetcher::fetch`].
    pub async fn fetch_product(&self, identifier: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.session.product_url(identifier);
        self.fetch(&url, identifier).await
    }

    /// Fetches `url`, retrying per the policy. `context` labels log lines and
    /// diagnostic artifacts (usually the identifier; may be empty).
    ///
    /// Returns the decoded body of the first 200 response.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if `url` does not parse (no request sent)
    /// - [`FetchError::HttpStatus`] on the first non-retryable status
    /// - [`FetchError::ExhaustedRetries`] if every attempt returned 429/403
    /// - [`FetchError::Network`] / [`FetchError::Timeout`] if the final attempt
    ///   failed at the transport level
    #[instrument(skip(self), fields(max_attempts = self.policy.max_attempts()))]
    pub async fn fetch(&self, url: &str, context: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let mut state = self.policy.start();
        let mut success_body: Option<Vec<u8>> = None;
        let mut last_network_error: Option<reqwest::Error> = None;

        loop {
            state = match state {
                FetchState::Attempting { attempt } => {
                    match self.attempt(&parsed, context, attempt).await {
                        Ok((status, body)) => {
                            if status == 200 {
                                success_body = Some(body);
                            }
                            self.policy.on_outcome(attempt, AttemptOutcome::Status(status))
                        }
                        Err(error) => {
                            warn!(id = context, attempt, %error, "attempt failed");
                            last_network_error = Some(error);
                            self.policy.on_outcome(attempt, AttemptOutcome::NetworkError)
                        }
                    }
                }
                FetchState::Backoff { kind, attempt } => {
                    let delay = self.policy.schedule().window(kind).sample();
                    info!(
                        id = context,
                        attempt,
                        ?kind,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    self.policy.resume(state)
                }
                FetchState::Succeeded { attempt } => {
                    debug!(id = context, attempt, "fetch succeeded");
                    return Ok(success_body.take().unwrap_or_default());
                }
                FetchState::Failed { attempt, reason } => {
                    return Err(self.failure(url, context, attempt, reason, last_network_error));
                }
            };
        }
    }

    /// Sends one attempt and reads the whole (decoded) body.
    ///
    /// `Ok` means a response arrived, whatever its status; non-200 bodies are
    /// handed to the diagnostic sink here.
    async fn attempt(
        &self,
        url: &Url,
        context: &str,
        attempt: u32,
    ) -> Result<(u16, Vec<u8>), reqwest::Error> {
        debug!(id = context, attempt, "sending request");
        let response = self.session.prepare_request(url).send().await?;
        let status = response.status().as_u16();

        if status == 200 {
            let body = response.bytes().await?.to_vec();
            info!(id = context, attempt, bytes = body.len(), "status OK");
            return Ok((status, body));
        }

        // The status alone decides the outcome; an unreadable error body is recorded empty.
        warn!(id = context, attempt, status, "non-success status");
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(error) => {
                warn!(id = context, attempt, status, %error, "failed to read error body");
                Vec::new()
            }
        };
        self.diagnostics.record(context, status, attempt, &body);
        Ok((status, body))
    }

    fn failure(
        &self,
        url: &str,
        context: &str,
        attempt: u32,
        reason: FailReason,
        last_network_error: Option<reqwest::Error>,
    ) -> FetchError {
        let error = match (reason, last_network_error) {
            (FailReason::HttpStatus(status), _) => FetchError::http_status(url, status),
            (FailReason::Exhausted { last_status }, _) => {
                FetchError::exhausted(url, attempt, last_status)
            }
            (FailReason::Network, Some(source)) if !source.is_timeout() => {
                FetchError::network(url, source)
            }
            (FailReason::Network, _) => FetchError::timeout(url),
        };
        warn!(id = context, attempt, %error, "fetch failed");
        error
    }
}
