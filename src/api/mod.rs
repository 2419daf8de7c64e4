//! API module
//!
//! HTTP endpoints, middleware and the assembled application router.

pub mod middleware;
pub mod routes;

use std::path::Path;

use axum::{http::HeaderName, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;

pub use routes::{create_router, AppState, CheckoutRequest, CheckoutResponse};

/// Build the application router
///
/// When `public_dir` is given, unmatched paths are served from it (the signup page).
pub fn app(state: AppState, public_dir: Option<&Path>) -> Router {
    let request_id = HeaderName::from_static(middleware::REQUEST_ID_HEADER);

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(create_router());

    let router = match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::logging_middleware)),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> AppError {
    AppError::NotFound
}
