//! Router configuration module - RESTful v1 API

use std::time::Duration;

use axum::{http::StatusCode, middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::middleware;

mod public;
mod v1;

pub use public::public_routes;
pub use v1::v1_routes;

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.request_timeout);

    public_routes()
        .nest("/api/v1", v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(CorsLayer::permissive())
                .layer(from_fn(middleware::request_logger_middleware))
                .layer(from_fn(middleware::metrics_middleware)),
        )
        .with_state(app_state)
}
