//! Configuration types.
//!
//! This module defines the configuration struct consumed by
//! [`RequestManager`](crate::RequestManager).

use std::collections::HashMap;
use std::time::Duration;

use crate::config::constants::{
    DEFAULT_BURST, DEFAULT_DNS_CACHE_TTL, DEFAULT_LIMIT_PER_HOST, DEFAULT_MAX_RETRIES,
    DEFAULT_RATE_LIMIT_RPS, DEFAULT_RETRY_AFTER_DELAY, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Manager configuration.
///
/// This struct can be constructed programmatically; every field has a sensible
/// default, so callers typically set the API base and override the rest with
/// struct-update syntax.
///
/// # Examples
///
/// ```no_run
/// use request_manager::ManagerConfig;
///
/// let config = ManagerConfig {
///     api_base: "https://api.example.com".to_string(),
///     rate_limit_rps: 10,
///     max_retries: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Root URL of the API host; request paths are joined onto this base
    pub api_base: String,

    /// Headers added to every request (per-request headers take precedence)
    pub default_headers: HashMap<String, String>,

    /// Maximum number of attempts for a single logical request
    pub max_retries: u32,

    /// Requests per second granted by the token bucket; 0 disables rate
    /// limiting entirely (no bucket, no penalty box)
    pub rate_limit_rps: u32,

    /// Token bucket capacity (maximum burst size); values below 2 are
    /// clamped up when the bucket is created
    pub burst: usize,

    /// Maximum pooled connections per host
    pub limit_per_host: usize,

    /// Time to live for cached DNS resolutions, enforced by expiring idle
    /// pooled connections
    pub dns_cache_ttl: Duration,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Optional ceiling on the total number of requests this manager may
    /// dispatch over its lifetime; attempts count toward it
    pub max_requests: Option<u64>,

    /// Wait applied when a throttling response carries no usable Retry-After
    pub default_retry_after_delay: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            default_headers: HashMap::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            rate_limit_rps: DEFAULT_RATE_LIMIT_RPS,
            burst: DEFAULT_BURST,
            limit_per_host: DEFAULT_LIMIT_PER_HOST,
            dns_cache_ttl: DEFAULT_DNS_CACHE_TTL,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_requests: None,
            default_retry_after_delay: DEFAULT_RETRY_AFTER_DELAY,
        }
    }
}

impl ManagerConfig {
    /// Creates a configuration for the given API base with all defaults.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Default::default()
        }
    }
}
