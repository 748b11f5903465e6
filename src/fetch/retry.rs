//! Retry state machine with status-driven backoff for product API fetches.
//!
//! One logical fetch moves through [`FetchState`]s:
//!
//! ```text
//! Attempting(n) --200--------------------------> Succeeded(n)
//! Attempting(n) --network error, n < max-------> Backoff(Network, n)     --> Attempting(n+1)
//! Attempting(n) --429, n < max-----------------> Backoff(RateLimited, n) --> Attempting(n+1)
//! Attempting(n) --403, n < max-----------------> Backoff(Forbidden, n)   --> Attempting(n+1)
//! Attempting(n) --other status-----------------> Failed(HttpStatus)
//! Attempting(max) --network error--------------> Failed(Network)
//! Attempting(max) --429/403--------------------> Failed(Exhausted)
//! ```
//!
//! Transitions are computed by [`RetryPolicy::on_outcome`] from the attempt
//! classification alone. Sleeping, logging and diagnostic capture belong to
//! the caller ([`super::Fetcher`]), which samples the backoff duration from the
//! policy's [`BackoffSchedule`].
//!
//! # Example
//!
//! ```
//! use harvester_core::fetch::{AttemptOutcome, FailureType, FetchState, RetryPolicy};
//!
//! let policy = RetryPolicy::with_max_attempts(5);
//! let state = policy.on_outcome(1, AttemptOutcome::Status(429));
//! assert_eq!(state, FetchState::Backoff { kind: FailureType::RateLimited, attempt: 1 });
//! assert_eq!(policy.resume(state), FetchState::Attempting { attempt: 2 });
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::constants::{
    FORBIDDEN_BACKOFF, NETWORK_BACKOFF, PRODUCT_MAX_ATTEMPTS, RATE_LIMITED_BACKOFF,
};

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Transport failure before any response (refused, reset, DNS, timeout).
    Network,

    /// HTTP 429 Too Many Requests.
    RateLimited,

    /// HTTP 403 Forbidden. Usually bot detection; a fresh user agent and a
    /// pause tend to clear it.
    Forbidden,

    /// Any other non-200 status. Never retried.
    Permanent,
}

/// What one attempt observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The request failed before a response arrived.
    NetworkError,
    /// A response arrived with this status code.
    Status(u16),
}

impl AttemptOutcome {
    /// Returns the failure class, or `None` when the attempt succeeded.
    #[must_use]
    pub fn failure_type(self) -> Option<FailureType> {
        match self {
            Self::NetworkError => Some(FailureType::Network),
            Self::Status(status) => classify_status(status),
        }
    }
}

/// Classifies an HTTP status. Only 200 counts as success.
#[must_use]
pub fn classify_status(status: u16) -> Option<FailureType> {
    match status {
        200 => None,
        429 => Some(FailureType::RateLimited),
        403 => Some(FailureType::Forbidden),
        _ => Some(FailureType::Permanent),
    }
}

/// Why a fetch ended without a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// Transport failure on the final attempt.
    Network,
    /// Non-retryable status.
    HttpStatus(u16),
    /// Budget consumed by retryable statuses; carries the last one seen.
    Exhausted {
        /// Status of the final attempt.
        last_status: u16,
    },
}

/// States of one logical fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// About to send attempt `attempt` (1-indexed).
    Attempting {
        /// Attempt number.
        attempt: u32,
    },
    /// Waiting after a retryable failure of attempt `attempt`.
    Backoff {
        /// Failure class that selected the backoff window.
        kind: FailureType,
        /// The attempt that just failed.
        attempt: u32,
    },
    /// Attempt `attempt` returned 200.
    Succeeded {
        /// The successful attempt.
        attempt: u32,
    },
    /// The fetch is over without a body.
    Failed {
        /// The last attempt made.
        attempt: u32,
        /// Why it ended.
        reason: FailReason,
    },
}

impl FetchState {
    /// Returns true for `Succeeded` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Uniform jitter window `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffWindow {
    min: Duration,
    max: Duration,
}

impl BackoffWindow {
    /// Creates a window; bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A window that always yields `delay`.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws a duration uniformly from the window at millisecond resolution.
    #[must_use]
    pub fn sample(&self) -> Duration {
        let min_ms = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        if min_ms == max_ms {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }
}

impl From<(Duration, Duration)> for BackoffWindow {
    fn from((min, max): (Duration, Duration)) -> Self {
        Self::new(min, max)
    }
}

/// Backoff windows per retryable failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    /// After a transport failure.
    pub network: BackoffWindow,
    /// After HTTP 429.
    pub rate_limited: BackoffWindow,
    /// After HTTP 403.
    pub forbidden: BackoffWindow,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            network: NETWORK_BACKOFF.into(),
            rate_limited: RATE_LIMITED_BACKOFF.into(),
            forbidden: FORBIDDEN_BACKOFF.into(),
        }
    }
}

impl BackoffSchedule {
    /// A schedule with no pauses; used by tests and dry runs.
    #[must_use]
    pub fn immediate() -> Self {
        let zero = BackoffWindow::fixed(Duration::ZERO);
        Self {
            network: zero,
            rate_limited: zero,
            forbidden: zero,
        }
    }

    /// Window for a retryable failure class. `Permanent` never backs off.
    #[must_use]
    pub fn window(&self, kind: FailureType) -> BackoffWindow {
        match kind {
            FailureType::Network => self.network,
            FailureType::RateLimited => self.rate_limited,
            FailureType::Forbidden => self.forbidden,
            FailureType::Permanent => BackoffWindow::fixed(Duration::ZERO),
        }
    }
}

/// Attempt budget plus backoff schedule.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first one).
    max_attempts: u32,
    schedule: BackoffSchedule,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: PRODUCT_MAX_ATTEMPTS,
            schedule: BackoffSchedule::default(),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, schedule: BackoffSchedule) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            schedule,
        }
    }

    /// Creates a policy with a custom budget and the default schedule.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self::new(max_attempts, BackoffSchedule::default())
    }

    /// Returns the attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the backoff schedule.
    #[must_use]
    pub fn schedule(&self) -> &BackoffSchedule {
        &self.schedule
    }

    /// Initial state of every fetch.
    #[must_use]
    pub fn start(&self) -> FetchState {
        FetchState::Attempting { attempt: 1 }
    }

    /// Transition out of `Attempting { attempt }` given what the attempt observed.
    #[must_use]
    pub fn on_outcome(&self, attempt: u32, outcome: AttemptOutcome) -> FetchState {
        let Some(kind) = outcome.failure_type() else {
            return FetchState::Succeeded { attempt };
        };

        let last_attempt = attempt >= self.max_attempts;
        let next = match (kind, outcome) {
            (FailureType::Permanent, AttemptOutcome::Status(status)) => FetchState::Failed {
                attempt,
                reason: FailReason::HttpStatus(status),
            },
            (FailureType::Network, _) if last_attempt => FetchState::Failed {
                attempt,
                reason: FailReason::Network,
            },
            (_, AttemptOutcome::Status(status)) if last_attempt => FetchState::Failed {
                attempt,
                reason: FailReason::Exhausted {
                    last_status: status,
                },
            },
            _ => FetchState::Backoff { kind, attempt },
        };

        debug!(attempt, max = self.max_attempts, ?outcome, ?next, "fetch transition");
        next
    }

    /// Leaves `Backoff` for the next attempt; other states are returned unchanged.
    #[must_use]
    pub fn resume(&self, state: FetchState) -> FetchState {
        match state {
            FetchState::Backoff { attempt, .. } => FetchState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }
}
