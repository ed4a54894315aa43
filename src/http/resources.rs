//! Static retrieval of thumbnails, playlists and segments.
//!
//! Missing files answer 404 with an empty body rather than the error
//! envelope; these routes are consumed by players, not API clients.

use axum::body::Body;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::path::Path;

use super::AppState;
use crate::av::transcode::M3U8_NAME;
use crate::error::AppError;
use crate::paths::check_path;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(rename = "imagePath")]
    pub image_path: String,
}

/// Serve a thumbnail from the image tree. Cached for three days.
pub async fn image_resource(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, AppError> {
    check_path(&query.image_path)?;
    let path = state.config.image_dir().join(&query.image_path);
    Ok(serve_file(&path, true).await)
}

/// Serve the playlist descriptor of a packaged output folder.
pub async fn video_playlist(
    State(state): State<AppState>,
    UrlPath((date, folder)): UrlPath<(String, String)>,
) -> Result<Response, AppError> {
    check_path(&date)?;
    check_path(&folder)?;
    let path = state
        .config
        .video_dir()
        .join(date)
        .join(folder)
        .join(M3U8_NAME);
    Ok(serve_file(&path, false).await)
}

/// Serve a single segment file from a packaged output folder.
pub async fn video_segment(
    State(state): State<AppState>,
    UrlPath((date, folder, file)): UrlPath<(String, String, String)>,
) -> Result<Response, AppError> {
    check_path(&date)?;
    check_path(&folder)?;
    check_path(&file)?;
    let path = state.config.video_dir().join(date).join(folder).join(file);
    Ok(serve_file(&path, false).await)
}

async fn serve_file(path: &Path, cacheable: bool) -> Response {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type);
    if cacheable {
        builder = builder.header(CACHE_CONTROL, "max-age=259200");
    }
    builder
        .body(Body::from(data))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
