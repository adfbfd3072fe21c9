use axum::{http::StatusCode, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        health::{healthz, livez, readyz},
        render::render_page,
        static_files::serve_static,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
///
/// Health checks and client assets have their own routes; everything else is
/// rendered.
pub fn create_app(state: AppState) -> Router {
    let assets = format!("{}/{{*filename}}", state.assets_route);

    Router::new()
        // Health check endpoints
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(&assets, get(serve_static))
        .fallback(render_page)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout,
        ))
        .with_state(state)
}
