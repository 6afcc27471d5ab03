//! Object store read endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::{ApiResponse, ErrorResponse};
use crate::AppState;

/// List all buckets visible to the configured credentials.
pub async fn list_buckets_handler(State(state): State<AppState>) -> Response {
    match state.storage.list_buckets().await {
        Ok(buckets) => ApiResponse::success(json!({ "buckets": buckets })).into_response(),
        Err(e) => {
            tracing::error!("Failed to list buckets: {:?}", e);
            let error = ErrorResponse::new("STORAGE_ERROR", "Failed to list buckets");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        },
    }
}

/// Read one object back as UTF-8 text.
pub async fn read_object_handler(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    match state.storage.download(&bucket, &key).await {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => ApiResponse::success(json!({ "data": text })).into_response(),
            Err(_) => {
                let error = ErrorResponse::new("STORAGE_ERROR", "Object is not valid UTF-8");
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
            },
        },
        Err(e) => {
            tracing::error!(bucket = %bucket, key = %key, "Failed to read object: {:?}", e);
            let error = ErrorResponse::new("STORAGE_ERROR", "Failed to read object");
            (StatusCode::NOT_FOUND, Json(error)).into_response()
        },
    }
}
