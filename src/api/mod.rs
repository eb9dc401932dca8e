//! HTTP API exposing the decoder.
//!
//! - `GET /convert?latitude=..&longitude=..` - decode a coordinate
//! - `GET /health` - readiness and dataset sizes

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::error::DecodeError;
use crate::models::AdminHierarchy;
use crate::pip::{DatasetFormat, Decoder};

/// Application state shared across handlers
pub struct AppState {
    pub decoder: Decoder,
}

impl AppState {
    pub fn new(decoder: Decoder) -> Self {
        Self { decoder }
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/convert", get(convert_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub data_loaded: bool,
    pub regions: usize,
    pub codes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DatasetFormat>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.decoder.status();

    Json(HealthResponse {
        status: "ok".to_string(),
        data_loaded: status.ready,
        regions: status.regions,
        codes: status.codes,
        format: status.format,
    })
}

/// Decode a coordinate to its administrative hierarchy
async fn convert_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConvertParams>,
) -> Result<Json<AdminHierarchy>, ApiError> {
    debug!(
        latitude = params.latitude,
        longitude = params.longitude,
        "Convert request"
    );

    match state.decoder.decode(params.latitude, params.longitude) {
        Ok(Some(hierarchy)) => Ok(Json(hierarchy)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            "Coordinate not found in any administrative boundary",
        )),
        Err(DecodeError::Unready { reason }) => {
            warn!("Convert request while decoder unready: {}", reason);
            Err(api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "Boundary data not loaded. Please ensure data is available.",
            ))
        }
        Err(e @ DecodeError::Internal { .. }) => {
            error!("Decode failed: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
