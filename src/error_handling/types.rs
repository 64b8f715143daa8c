//! Error type definitions.
//!
//! This module defines the error taxonomy surfaced by the dispatch loop.
//! Callers see either a decoded result or exactly one of these variants;
//! low-level transport failures are wrapped, never leaked mid-classification.

use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Errors surfaced by [`RequestManager`](crate::RequestManager) operations.
#[derive(Error, Debug)]
pub enum RequestError {
    /// A network-layer failure (connect, timeout, TLS, body read), as opposed
    /// to an HTTP-level status code.
    #[error("transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The server answered with a non-success status other than 429.
    ///
    /// Whether this is retried is up to the retry predicate; the default
    /// predicate retries only a fixed set of 5xx codes.
    #[error("HTTP status {status}")]
    Status {
        /// The HTTP status code returned by the server.
        status: u16,
        /// Response body text, kept for caller diagnostics.
        body: String,
    },

    /// The response body could not be decoded by the configured codec.
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API base and request path did not combine into a valid URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The attempt budget was exhausted without a success or a fatal error.
    ///
    /// Distinct from any single underlying cause so callers can tell "kept
    /// failing the same way" apart from "ran out of budget".
    #[error("maximum retries exceeded after {attempts} attempts")]
    RetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// The configured global ceiling on dispatched requests was hit.
    #[error("request ceiling reached: used {used} of {limit}")]
    MaxRequestsExceeded {
        /// Requests dispatched so far, including this one.
        used: u64,
        /// The configured ceiling.
        limit: u64,
    },

    /// The manager was closed while this request was waiting for a token.
    #[error("request manager closed")]
    Closed,
}

impl RequestError {
    /// Returns the HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
