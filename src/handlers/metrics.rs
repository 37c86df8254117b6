// Metrics endpoint for Prometheus

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, AppState};

/// Prometheus metrics endpoint
///
/// # Errors
///
/// Returns `NotFound` when the recorder was not installed (`METRICS_ENABLED=false`)
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    summary = "Prometheus metrics",
    responses(
        (status = 200, description = "Prometheus metrics", content_type = "text/plain"),
        (status = 404, description = "Metrics disabled")
    )
)]
pub async fn get_prometheus_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let handle = state
        .metrics_handle
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}
