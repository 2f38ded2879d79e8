//! REST handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use crate::config::ServerConfig;
use crate::engine::{MetricProcessor, ProcessorStats};
use crate::error::Error;
use crate::types::TimeDataPoint;

use super::types::{ErrorResponse, GetDataRequest, GetFiltersRequest, HealthResponse};

/// Shared state for all handlers
pub struct AppState {
    /// The engine instance filled at startup
    pub processor: Arc<MetricProcessor>,
    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create handler state
    pub fn new(processor: Arc<MetricProcessor>, config: ServerConfig) -> Self {
        Self { processor, config }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: Error) -> ApiError {
    let status = match err {
        Error::Filter(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(err.to_string())))
}

// =============================================================================
// Health & Stats Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Engine statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ProcessorStats> {
    Json(state.processor.stats())
}

// =============================================================================
// Query Handlers
// =============================================================================

/// Aggregated time series for a filter set
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetDataRequest>,
) -> Result<Json<Vec<TimeDataPoint>>, ApiError> {
    state
        .processor
        .query_request(&req.filters, &req.scale, &req.aggregator)
        .map(Json)
        .map_err(|e| {
            warn!(error = %e, filters = ?req.filters, "Rejected data query");
            api_error(e)
        })
}

/// Filter catalog search by prefix
pub async fn get_filters(
    State(state): State<Arc<AppState>>,
    Query(req): Query<GetFiltersRequest>,
) -> Json<Vec<String>> {
    Json(state.processor.filter_catalog(&req.query))
}
