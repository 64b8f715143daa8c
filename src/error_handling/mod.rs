//! Error types and retry classification.
//!
//! This module provides:
//! - The [`RequestError`] taxonomy returned by every manager operation
//! - The [`RetryPredicate`] seam and the [`default_should_retry`] policy

mod retry;
mod types;

pub use retry::{default_should_retry, RetryPredicate};
pub use types::RequestError;
