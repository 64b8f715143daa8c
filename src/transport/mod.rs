//! HTTP transport construction and the body codec seam.
//!
//! This module provides:
//! - [`build_client`]: configures the single `reqwest::Client` a manager owns
//! - [`BodyCodec`]: pluggable request/response body encoding (default: JSON)

use std::time::Duration;

use reqwest::ClientBuilder;
use serde_json::Value;

use crate::config::ManagerConfig;
use crate::error_handling::RequestError;

/// Builds the HTTP client for a manager.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent and per-request timeout from the config
/// - Connection pooling capped at `limit_per_host` connections per host
/// - Idle connections expired after `dns_cache_ttl`, so a reused connection
///   never outlives the intended DNS cache window
///
/// # Errors
///
/// Returns [`RequestError::Transport`] if client creation fails.
pub fn build_client(config: &ManagerConfig) -> Result<reqwest::Client, RequestError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(config.limit_per_host)
        .pool_idle_timeout(config.dns_cache_ttl)
        .build()?;
    Ok(client)
}

/// Pluggable request/response body serialization.
///
/// The dispatch loop never touches wire bytes directly; it hands encoding and
/// decoding to the manager's codec. The default is [`JsonCodec`].
pub trait BodyCodec: Send + Sync {
    /// Serializes a structured body for the wire.
    fn encode(&self, body: &Value) -> Result<Vec<u8>, RequestError>;

    /// Deserializes a response body.
    ///
    /// An empty body is treated as an empty structured result, not an error.
    fn decode(&self, raw: &[u8]) -> Result<Value, RequestError>;

    /// Content type advertised for encoded bodies.
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// The default codec: JSON via serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl BodyCodec for JsonCodec {
    fn encode(&self, body: &Value) -> Result<Vec<u8>, RequestError> {
        Ok(serde_json::to_vec(body)?)
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, RequestError> {
        if raw.is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        Ok(serde_json::from_slice(raw)?)
    }
}
