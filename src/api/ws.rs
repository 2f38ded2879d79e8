//! WebSocket endpoints used by the interactive dashboard
//!
//! Each text frame carries one JSON request and is answered with one JSON
//! text frame. A frame that cannot be decoded or answered is logged and
//! dropped; the connection stays open.
//!
//! ```text
//! /getData     {"filters":["location:Chicago"],"scale":"Weekly","aggregator":"Sum"}
//!              -> [{"timestamp":"2019-07-14T00:00:00Z","value":1234.5}, ...]
//! /getFilters  {"query":"loc"}
//!              -> ["location:Chicago", "location:California", ...]
//! ```

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::MetricProcessor;
use crate::error::{Error, Result};

use super::handlers::AppState;
use super::types::{GetDataRequest, GetFiltersRequest};

/// Upgrade handler for `/getData`
pub async fn data_socket(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| serve(socket, state, "getData", answer_data))
}

/// Upgrade handler for `/getFilters`
pub async fn filters_socket(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| serve(socket, state, "getFilters", answer_filters))
}

/// Answer one `/getData` frame
pub fn answer_data(processor: &MetricProcessor, text: &str) -> Result<String> {
    let req: GetDataRequest = decode(text)?;
    let points = processor.query_request(&req.filters, &req.scale, &req.aggregator)?;
    encode(&points)
}

/// Answer one `/getFilters` frame
pub fn answer_filters(processor: &MetricProcessor, text: &str) -> Result<String> {
    let req: GetFiltersRequest = decode(text)?;
    encode(&processor.filter_catalog(&req.query))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::Serialization(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
}

async fn serve(
    mut socket: WebSocket,
    state: Arc<AppState>,
    endpoint: &'static str,
    answer: fn(&MetricProcessor, &str) -> Result<String>,
) {
    debug!(endpoint, "WebSocket connection opened");

    while let Some(frame) = socket.recv().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                debug!(endpoint, error = %e, "WebSocket receive failed");
                break;
            }
        };

        match frame {
            Message::Text(text) => match answer(&state.processor, &text) {
                Ok(reply) => {
                    if socket.send(Message::Text(reply)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(endpoint, error = %e, "Dropping WebSocket message"),
            },
            Message::Close(_) => break,
            // Ping/pong are handled by axum; binary frames are not part of the protocol
            _ => {}
        }
    }

    debug!(endpoint, "WebSocket connection closed");
}
