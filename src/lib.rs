//! request_manager: an async, rate-limited, retrying HTTP request manager
//!
//! This library protects a remote HTTP API from being overwhelmed by its own
//! caller. It enforces a maximum sustained request rate with burst tolerance
//! (token bucket), cooperates with server-signaled backpressure (HTTP 429
//! with a Retry-After hint pauses all traffic), and retries transient
//! failures up to a bound.
//!
//! # Example
//!
//! ```no_run
//! use request_manager::{ManagerConfig, RequestManager, RequestOptions};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ManagerConfig {
//!     api_base: "https://api.example.com".to_string(),
//!     rate_limit_rps: 10,
//!     burst: 20,
//!     ..Default::default()
//! };
//! let manager = RequestManager::new(config);
//!
//! let widgets = manager.get("/v1/widgets", RequestOptions::new()).await?;
//! let created = manager
//!     .post("/v1/widgets", RequestOptions::new().body(json!({"name": "sprocket"})))
//!     .await?;
//! println!("{} / {}", widgets, created);
//!
//! manager.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime: constructing a [`RequestManager`]
//! spawns the token bucket's background refill task. Use `#[tokio::main]` or
//! construct managers inside an async context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
mod manager;
mod rate_limit;
mod transport;

// Re-export public API
pub use config::ManagerConfig;
pub use error_handling::{default_should_retry, RequestError, RetryPredicate};
pub use manager::{RequestManager, RequestOptions};
pub use rate_limit::{parse_retry_after, TokenBucket};
pub use transport::{BodyCodec, JsonCodec};

// The HTTP method type callers pass to the generic `request` operation.
pub use reqwest::Method;
