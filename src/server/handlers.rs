use axum::{
    extract::{
        State,
        WebSocketUpgrade,
    },
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    Json,
};
use chrono::Utc;
use serde_json::{
    json,
    Value,
};

use super::AppState;
use crate::{
    config::CapabilityDocument,
    core::DashboardError,
    websocket::{
        connection::handle_socket_with,
        tracker::lock_tracker,
        types::iso_timestamp,
        TrackerStats,
    },
};

/// Error body returned by the JSON endpoints.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub async fn stats(State(state): State<AppState>) -> Json<TrackerStats> {
    Json(lock_tracker(&state.tracker).stats())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": iso_timestamp(Utc::now()) }))
}

pub async fn get_config(State(state): State<AppState>) -> Result<Json<CapabilityDocument>, ApiError> {
    state.capabilities.load().map(Json).map_err(|e| {
        tracing::error!(error = %e, "failed to read capability file");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load config")
    })
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let caps: CapabilityDocument = serde_json::from_value(body)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

    match state.capabilities.store(&caps) {
        Ok(()) => {
            tracing::info!(path = %state.capabilities.path().display(), "capability document updated");
            Ok(Json(json!({ "success": true })))
        }
        Err(DashboardError::InvalidCapabilities(reason)) => {
            Err(ApiError::new(StatusCode::BAD_REQUEST, reason))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to write capability file");
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save config"))
        }
    }
}

pub async fn websocket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket_with(socket, state.tracker, state.heartbeat))
}
