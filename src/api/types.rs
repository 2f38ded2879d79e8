//! Request and response bodies shared by the REST and WebSocket endpoints

use serde::{Deserialize, Serialize};

/// Data query: filters plus optional scale and aggregator names
///
/// Missing or unknown names resolve to `Monthly` and `Count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GetDataRequest {
    /// `"name:value"` filter strings, combined with AND
    #[serde(default)]
    pub filters: Vec<String>,

    /// `Daily`, `Weekly` or `Monthly`
    #[serde(default)]
    pub scale: String,

    /// `Count`, `Sum` or `Avg`
    #[serde(default)]
    pub aggregator: String,
}

/// Filter catalog search
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GetFiltersRequest {
    /// Prefix to search for; empty lists the whole catalog
    #[serde(default)]
    pub query: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the server answers
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Error body returned with a non-2xx status
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create an error body
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
