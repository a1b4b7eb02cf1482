//! Unified API error type and conversions.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::error;

use crate::storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Carries the server-side detail; the response body is a fixed string
    /// so OS error text and on-disk paths never reach the client.
    Internal(String),
    /// A guarded route was hit without a live session; the answer is a
    /// redirect to the login page, not an error page.
    LoginRequired,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Internal(detail) => {
                error!(detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").into_response()
            }
            ApiError::LoginRequired => Redirect::to("/login").into_response(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::InvalidName => ApiError::BadRequest("invalid file name".into()),
            StorageError::NotFound => ApiError::NotFound("file not found".into()),
            StorageError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}
