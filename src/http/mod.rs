//! HTTP surface: upload, compare trigger and static resource retrieval.

pub mod compare;
pub mod resources;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::pipeline::UploadPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<UploadPipeline>,
    pub config: Arc<AppConfig>,
}

/// Uniform response envelope with a stable code/message pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub code: u32,
    pub info: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: String::from("success"),
            code: 200,
            info: String::from("ok"),
            data: Some(data),
        }
    }

    pub fn error(code: u32, info: String) -> Self {
        Self {
            status: String::from("error"),
            code,
            info,
            data: None,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/imageResource", get(resources::image_resource))
        .route("/uploadVideo", post(upload::upload_video))
        .route("/getResult", get(compare::get_result))
        .route("/videoResource/:date/:folder", get(resources::video_playlist))
        .route(
            "/videoResource/:date/:folder/:file",
            get(resources::video_segment),
        )
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success("20250101/abc.mp4")).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"], "20250101/abc.mp4");
    }

    #[test]
    fn test_error_envelope_has_no_data() {
        let body =
            serde_json::to_value(ApiResponse::<()>::error(600, String::from("bad path"))).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 600);
        assert_eq!(body["info"], "bad path");
        assert!(body["data"].is_null());
    }
}
