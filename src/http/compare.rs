//! Trigger for the compare-and-package flow.
//!
//! The request blocks until the comparison script and every ffmpeg step
//! behind it finish; there is no background job or progress reporting.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ApiResponse, AppState};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    #[serde(rename = "sourceName1")]
    pub source_name1: String,
    #[serde(rename = "sourceName2")]
    pub source_name2: String,
}

/// Compare two uploaded videos and package the merged result as HLS.
/// Responds with the relative output folder path.
pub async fn get_result(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let folder = state
        .pipeline
        .compare_and_package(&query.source_name1, &query.source_name2)
        .await?;
    Ok(Json(ApiResponse::success(folder)))
}
