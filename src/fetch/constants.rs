//! Constants for the fetch module (timeouts, attempt budget, backoff windows).

use std::time::Duration;

/// Default request timeout (30 seconds), applied to the whole request.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Attempt budget for product detail calls.
pub const PRODUCT_MAX_ATTEMPTS: u32 = 5;

/// Default product API host.
pub const DEFAULT_API_BASE: &str = "https://www.adidas.jp";

/// Backoff after a transport-level failure: 3 to 5 seconds.
pub const NETWORK_BACKOFF: (Duration, Duration) = (Duration::from_secs(3), Duration::from_secs(5));

/// Backoff after HTTP 429: 10 to 14 seconds.
pub const RATE_LIMITED_BACKOFF: (Duration, Duration) =
    (Duration::from_secs(10), Duration::from_secs(14));

/// Backoff after HTTP 403: 5 to 9 seconds.
pub const FORBIDDEN_BACKOFF: (Duration, Duration) =
    (Duration::from_secs(5), Duration::from_secs(9));

/// Pause between successive identifiers: 2 to 4 seconds.
pub const INTER_ITEM_DELAY: (Duration, Duration) =
    (Duration::from_secs(2), Duration::from_secs(4));
