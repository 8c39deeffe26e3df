//! Fetch trait, errors and the in-process mock

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Read-only retrieval of a JSON document by API path.
pub trait Fetch {
    /// Fetch `path` (relative to the API root) and decode the body.
    fn get_json(&self, path: &str) -> Result<Value, FetchError>;
}

/// Fetch errors. Each one turns a single test into an ERROR verdict.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("GitHub API error {status} for {url}")]
    Status { url: String, status: u16, body: String },

    #[error("Failed to decode JSON from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Unable to find match for {key}={value}")]
    NoMatch { key: String, value: String },

    #[error("Field '{field}' missing from response for {path}")]
    MissingField { path: String, field: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

enum MockResponse {
    Json(Value),
    Status(u16),
}

/// Mock fetcher for testing - answers from canned responses.
///
/// Paths without a canned response answer with status 404.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `body`.
    pub fn with_json(mut self, path: impl Into<String>, body: Value) -> Self {
        self.responses.insert(path.into(), MockResponse::Json(body));
        self
    }

    /// Answer `path` with an HTTP error status.
    pub fn with_status(mut self, path: impl Into<String>, status: u16) -> Self {
        self.responses.insert(path.into(), MockResponse::Status(status));
        self
    }

    /// Paths requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Fetch for MockFetcher {
    fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.to_string());
        }

        match self.responses.get(path) {
            Some(MockResponse::Json(body)) => Ok(body.clone()),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: path.to_string(),
                status: *status,
                body: String::new(),
            }),
            None => Err(FetchError::Status {
                url: path.to_string(),
                status: 404,
                body: String::new(),
            }),
        }
    }
}
