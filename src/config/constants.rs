//! Configuration constants.
//!
//! This module defines the default operational parameters used throughout the
//! crate: retry budgets, rate-limit settings, connection pool sizing, and the
//! set of status codes the default retry predicate treats as transient.

use std::time::Duration;

// constants (used as defaults)
/// Maximum number of attempts for a single logical request
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Requests per second granted by the token bucket (0 disables limiting)
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 3;
/// Maximum rate limit burst size (token bucket capacity)
pub const DEFAULT_BURST: usize = 20;
/// Smallest burst size we accept; a single-token bucket serializes all
/// traffic and defeats the point of burst tolerance
pub const MIN_BURST: usize = 2;
/// Floor on the refill task's sleep interval, preventing a tight loop at
/// high configured rates
pub const MIN_REFILL_INTERVAL: Duration = Duration::from_millis(100);

// Connection pool defaults
/// Maximum pooled connections per host
pub const DEFAULT_LIMIT_PER_HOST: usize = 10;
/// How long an idle connection (and the DNS resolution behind it) may be reused
pub const DEFAULT_DNS_CACHE_TTL: Duration = Duration::from_secs(300);

// Request defaults
/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("request_manager/", env!("CARGO_PKG_VERSION"));

// Throttling defaults
/// Wait applied when a 429 carries no Retry-After header, or one we cannot parse
pub const DEFAULT_RETRY_AFTER_DELAY: Duration = Duration::from_secs(60);

/// Status codes the default retry predicate treats as transient server errors.
///
/// 599 is non-standard (network connect timeout) but common enough behind
/// proxies to be worth retrying.
pub const RETRYABLE_STATUS_CODES: [u16; 5] = [500, 502, 503, 504, 599];
