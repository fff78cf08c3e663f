//! Embedded static asset serving.

use axum::{
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use include_dir::{Dir, include_dir};

use crate::application::error::ErrorReport;

static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// Serve embedded static assets under `/static/{*path}`.
pub async fn serve_static(path: Option<Path<String>>) -> Response {
    let candidate = path
        .map(|Path(value)| value.trim_start_matches('/').to_string())
        .unwrap_or_default();

    // No traversal, no directory listings.
    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return not_found_response();
    }

    let Some(file) = STATIC_ASSETS.get_file(&candidate) else {
        return not_found_response();
    };

    let mime = mime_guess::from_path(&candidate).first_or_octet_stream();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(file.contents()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn not_found_response() -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    ErrorReport::from_message(
        "infra::assets::serve_static",
        StatusCode::NOT_FOUND,
        "Static asset not found",
    )
    .attach(&mut response);
    response
}
