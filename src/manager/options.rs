//! Per-request options.

use std::collections::HashMap;

use serde_json::Value;

/// Options for a single logical request.
///
/// All fields are optional; `RequestOptions::default()` sends a bare request.
/// Per-request headers take precedence over the manager's default headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers for this request, layered over the manager defaults
    pub headers: HashMap<String, String>,

    /// Query string parameters
    pub query: Vec<(String, String)>,

    /// Structured request body, encoded by the manager's codec
    pub body: Option<Value>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a query string parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}
