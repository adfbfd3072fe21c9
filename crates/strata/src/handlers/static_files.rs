//! Static file serving for built client assets.

use std::path::{Component, Path as FsPath};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
};

use crate::{handlers::AppError, state::AppState};

/// Serve a file from the client assets directory.
pub async fn serve_static(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response<Body>, AppError> {
    let relative = FsPath::new(&filename);
    let is_safe = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !is_safe {
        return not_found();
    }

    let contents = match tokio::fs::read(state.assets_dir.join(relative)).await {
        Ok(contents) => contents,
        Err(_) => return not_found(),
    };

    let content_type = content_type(&filename);

    // Build output file names carry a content hash
    let is_hashed = filename.contains('-') && !filename.ends_with(".map");
    let cache_control = if is_hashed {
        "public, max-age=31536000, immutable"
    } else {
        "public, max-age=3600"
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(contents))?)
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("map" | "json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

fn not_found() -> Result<Response<Body>, AppError> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("Not found"))?)
}
