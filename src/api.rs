pub(crate) mod datasets;
pub(crate) mod health;
pub(crate) mod metrics;
pub(crate) mod sentiment;
pub(crate) mod visualizations;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(ErrorResponse {
        error: message.into(),
    });
    (status, body).into_response()
}

pub(crate) fn router(state: AppState) -> Router {
    let upload_limit = state.config().max_upload_bytes();

    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics::exporter))
        .route("/v1/sentiment", post(sentiment::classify_text))
        .route("/v1/sentiment/upload", post(sentiment::classify_upload))
        .route("/v1/datasets", get(datasets::list))
        .route("/v1/visualizations", post(visualizations::render))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
