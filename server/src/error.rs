use axum::{http::StatusCode, response::IntoResponse, Json};
use preload_filter::FilterError;
use preload_storage_common::StorageError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage failure")]
    Storage(#[from] StorageError),
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self { ApiError::BadRequest(err.to_string()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(err) => {
                error!("storage failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
