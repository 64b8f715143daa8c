//! The request manager composition root.
//!
//! This module provides:
//! - [`RequestManager`]: owns the token bucket, the transport handle, and the
//!   dispatch loop
//! - [`RequestOptions`]: per-request headers, query parameters, and body

mod dispatch;
mod options;
mod stats;

pub use options::RequestOptions;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::config::ManagerConfig;
use crate::error_handling::{default_should_retry, RequestError, RetryPredicate};
use crate::rate_limit::TokenBucket;
use crate::transport::{build_client, BodyCodec, JsonCodec};

use stats::ManagerStats;

/// An async, retrying, rate-limited HTTP request manager.
///
/// A manager owns exactly one token bucket and one transport handle, shared
/// by all concurrent requests dispatched through it. Construction starts the
/// bucket's refill task, so a manager must be created inside a Tokio runtime.
///
/// Call [`close`](RequestManager::close) when done; a manager used after
/// `close()` returns [`RequestError::Closed`] from rate-limited requests and
/// is otherwise unsupported.
///
/// # Examples
///
/// ```no_run
/// use request_manager::{ManagerConfig, RequestManager, RequestOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), request_manager::RequestError> {
/// let manager = RequestManager::new(ManagerConfig::new("https://api.example.com"));
/// let body = manager.get("/v1/widgets", RequestOptions::new()).await?;
/// println!("{}", body);
/// manager.close().await;
/// # Ok(())
/// # }
/// ```
pub struct RequestManager {
    config: ManagerConfig,
    bucket: Option<TokenBucket>,
    client: Mutex<Option<Arc<reqwest::Client>>>,
    codec: Box<dyn BodyCodec>,
    should_retry: RetryPredicate,
    stats: ManagerStats,
    closed: AtomicBool,
}

impl RequestManager {
    /// Creates a manager with the default retry predicate.
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_retry_predicate(config, Arc::new(default_should_retry))
    }

    /// Creates a manager with a caller-supplied retry predicate.
    ///
    /// The predicate is consulted for every classified failure except
    /// throttling responses, which always retry within the attempt budget.
    pub fn with_retry_predicate(config: ManagerConfig, should_retry: RetryPredicate) -> Self {
        let bucket = if config.rate_limit_rps > 0 {
            Some(TokenBucket::start(config.rate_limit_rps, config.burst))
        } else {
            debug!("rate limiting disabled, requests are ungated");
            None
        };

        Self {
            config,
            bucket,
            client: Mutex::new(None),
            codec: Box::new(JsonCodec),
            should_retry,
            stats: ManagerStats::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Replaces the body codec (default: JSON).
    pub fn with_codec(mut self, codec: Box<dyn BodyCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// The manager's configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The token bucket gating dispatch, if rate limiting is enabled.
    pub fn rate_limiter(&self) -> Option<&TokenBucket> {
        self.bucket.as_ref()
    }

    /// Total attempts dispatched over this manager's lifetime.
    pub fn total_requests(&self) -> u64 {
        self.stats.total()
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(Method::DELETE, path, options).await
    }

    /// Sends a GET request.
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(Method::GET, path, options).await
    }

    /// Sends a HEAD request.
    pub async fn head(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(Method::HEAD, path, options).await
    }

    /// Sends an OPTIONS request.
    pub async fn options(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(Method::OPTIONS, path, options).await
    }

    /// Sends a PATCH request.
    pub async fn patch(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(Method::PATCH, path, options).await
    }

    /// Sends a POST request.
    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(Method::POST, path, options).await
    }

    /// Sends a PUT request.
    pub async fn put(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        self.request(Method::PUT, path, options).await
    }

    /// Stops the refill task, releases the transport handle, and logs a
    /// throughput summary.
    ///
    /// Idempotent: a second call returns without repeating any teardown.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let total = self.stats.total();
        let secs = self.stats.elapsed().as_secs_f64();
        let rate = if secs > 0.0 {
            total as f64 / secs
        } else {
            0.0
        };
        info!("{} requests in {:.2}s ({:.2} req/s)", total, secs, rate);

        if let Some(bucket) = &self.bucket {
            bucket.shutdown();
        }
        // Dropping the handle closes pooled connections; a handle that was
        // never created (or already released) is a no-op.
        self.client.lock().await.take();
    }

    /// Returns the shared transport handle, creating it on first use.
    pub(crate) async fn client(&self) -> Result<Arc<reqwest::Client>, RequestError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }
        debug!("creating transport client for {}", self.config.api_base);
        let client = Arc::new(build_client(&self.config)?);
        *guard = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Joins a request path onto the API base.
    pub(crate) fn build_url(&self, path: &str) -> Result<Url, RequestError> {
        let base = Url::parse(&self.config.api_base)?;
        Ok(base.join(path)?)
    }

    pub(crate) fn codec(&self) -> &dyn BodyCodec {
        self.codec.as_ref()
    }

    pub(crate) fn should_retry(&self, error: &RequestError) -> bool {
        (self.should_retry)(error)
    }

    pub(crate) fn stats(&self) -> &ManagerStats {
        &self.stats
    }
}
