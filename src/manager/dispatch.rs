//! The bounded-retry dispatch loop.
//!
//! One logical request is a loop of up to `max_retries` attempts. Each
//! attempt gates on the token bucket, performs the transport call, and
//! classifies the outcome: success returns, throttling updates the penalty
//! box and retries, other failures are put to the retry predicate.

use std::time::Duration;

use log::{debug, error, warn};
use reqwest::{header, Method, StatusCode, Url};
use serde_json::Value;

use crate::error_handling::RequestError;
use crate::manager::{RequestManager, RequestOptions};
use crate::rate_limit::parse_retry_after;

/// Classified result of a single attempt.
enum AttemptOutcome {
    /// 2xx response with a decoded body.
    Success(Value),
    /// 429 response; wait parsed from the Retry-After hint.
    Throttled(Duration),
    /// Anything else, already mapped into the error taxonomy.
    Failed(RequestError),
}

impl RequestManager {
    /// Sends a request with rate limiting, throttling cooperation, and retry.
    ///
    /// Attempts are bounded by `max_retries` (default 3). A throttling
    /// response (429) puts the token bucket in the penalty box for the
    /// server-hinted duration and consumes an attempt slot, so sustained
    /// server throttling can exhaust the budget without a hard failure. Any
    /// other failure is retried only if the retry predicate approves.
    ///
    /// # Errors
    ///
    /// - [`RequestError::MaxRequestsExceeded`] if the global ceiling is hit
    /// - [`RequestError::RetriesExceeded`] when the budget runs out
    /// - the classified failure itself when the predicate declines to retry
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        let url = self.build_url(path)?;
        let max_attempts = self.config().max_retries;
        let mut attempt = 0u32;

        while attempt < max_attempts {
            attempt += 1;
            let used = self.stats().record_request();
            if let Some(limit) = self.config().max_requests {
                if used > limit {
                    return Err(RequestError::MaxRequestsExceeded { used, limit });
                }
            }

            if let Some(bucket) = self.rate_limiter() {
                bucket.acquire().await?;
            }

            debug!("attempt {}/{}: {} {}", attempt, max_attempts, method, url);
            match self.perform(method.clone(), url.clone(), &options).await {
                AttemptOutcome::Success(body) => {
                    debug!("finished {} {}", method, url);
                    return Ok(body);
                }
                AttemptOutcome::Throttled(wait) => {
                    warn!("server throttling {} {}, backing off {:?}", method, url, wait);
                    if let Some(bucket) = self.rate_limiter() {
                        bucket.penalize(wait).await;
                    }
                    // The throttled attempt still consumed a budget slot.
                }
                AttemptOutcome::Failed(err) => {
                    error!("request {} {} failed: {}", method, url, err);
                    if !self.should_retry(&err) {
                        return Err(err);
                    }
                }
            }
        }

        Err(RequestError::RetriesExceeded {
            attempts: max_attempts,
        })
    }

    /// Performs one attempt and classifies its outcome.
    async fn perform(&self, method: Method, url: Url, options: &RequestOptions) -> AttemptOutcome {
        match self.send_once(method, url, options).await {
            Ok(outcome) => outcome,
            Err(err) => AttemptOutcome::Failed(err),
        }
    }

    /// Builds and sends the transport call, reading the full response.
    async fn send_once(
        &self,
        method: Method,
        url: Url,
        options: &RequestOptions,
    ) -> Result<AttemptOutcome, RequestError> {
        let client = self.client().await?;
        let mut request = client.request(method, url);

        for (name, value) in &self.config().default_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            let encoded = self.codec().encode(body)?;
            request = request
                .header(header::CONTENT_TYPE, self.codec().content_type())
                .body(encoded);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let hint = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let wait = parse_retry_after(
                hint.as_deref(),
                self.config().default_retry_after_delay,
            );
            return Ok(AttemptOutcome::Throttled(wait));
        }

        let raw = response.bytes().await?;
        if !status.is_success() {
            return Ok(AttemptOutcome::Failed(RequestError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&raw).into_owned(),
            }));
        }

        let body = self.codec().decode(&raw)?;
        Ok(AttemptOutcome::Success(body))
    }
}
