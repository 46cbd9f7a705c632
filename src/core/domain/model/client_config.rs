//! Transport tuning shared by every request of a client.

use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-side request throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained number of requests per second.
    pub requests_per_second: u32,
    /// Number of requests allowed in a burst.
    pub burst_size: u32,
}

/// Settings of the HTTP layer.
///
/// The PRTG API offers no server-side session, so there is nothing to
/// refresh; only timeouts and optional throttling are tunable. Requests are
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Total time allowed for one request, connect and body included.
    pub timeout: Duration,
    /// Throttling applied before each request, disabled when `None`.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
        }
    }
}
