//! HTTP and WebSocket transport
//!
//! # Endpoints
//!
//! ## Admin
//! - `GET /health` - Health check
//! - `GET /api/v1/stats` - Engine statistics
//!
//! ## Query
//! - `POST /api/v1/data` - Aggregated series for a filter set
//! - `GET /api/v1/filters?query=` - Filter catalog search
//!
//! ## Dashboard (WebSocket)
//! - `GET /getData` - Same as `POST /api/v1/data`, one request per text frame
//! - `GET /getFilters` - Same as `GET /api/v1/filters`, one request per text frame

pub mod handlers;
pub mod types;
pub mod ws;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::AppState;
pub use types::{ErrorResponse, GetDataRequest, GetFiltersRequest, HealthResponse};

/// Build CORS layer from configuration
fn build_cors_layer(cors_origins: &[String]) -> CorsLayer {
    if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and stats
        .route("/health", get(handlers::health))
        .route("/api/v1/stats", get(handlers::get_stats))
        // Query API
        .route("/api/v1/data", post(handlers::get_data))
        .route("/api/v1/filters", get(handlers::get_filters))
        // Dashboard sockets
        .route("/getData", get(ws::data_socket))
        .route("/getFilters", get(ws::filters_socket))
        // State, tracing and CORS
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&state.config.cors_allowed_origins))
}
