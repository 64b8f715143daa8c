//! Error retriability and the default retry predicate.

use std::sync::Arc;

use crate::config::RETRYABLE_STATUS_CODES;
use crate::error_handling::RequestError;

/// Caller-supplied classification deciding whether a failed attempt should be
/// retried.
///
/// The predicate is consulted for status errors and transport errors alike; a
/// throttling response (429) never reaches it because throttling always
/// retries within the attempt budget.
pub type RetryPredicate = Arc<dyn Fn(&RequestError) -> bool + Send + Sync>;

/// Determines whether an error is retriable under the default policy.
///
/// Retries only transient server error statuses (500, 502, 503, 504, 599).
/// Everything else, including client errors and transport failures, is
/// propagated on the first occurrence. Callers with idempotent traffic often
/// supply a broader predicate that also retries timeouts and connect errors.
///
/// # Examples
///
/// ```
/// use request_manager::{default_should_retry, RequestError};
///
/// let transient = RequestError::Status { status: 503, body: String::new() };
/// assert!(default_should_retry(&transient));
///
/// let not_found = RequestError::Status { status: 404, body: String::new() };
/// assert!(!default_should_retry(&not_found));
/// ```
pub fn default_should_retry(error: &RequestError) -> bool {
    match error {
        RequestError::Status { status, .. } => RETRYABLE_STATUS_CODES.contains(status),
        _ => false,
    }
}
