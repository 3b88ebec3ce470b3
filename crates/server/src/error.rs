//! Error types for the certificate API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFile,

    #[error("The input is not a PNG, JPEG, or PDF file!")]
    UnsupportedMediaType,

    #[error("Not found")]
    NotFound,

    #[error("File too large")]
    PayloadTooLarge,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<certificate::CertificateError> for ApiError {
    fn from(err: certificate::CertificateError) -> Self {
        match err {
            certificate::CertificateError::UnsupportedMediaType(_) => ApiError::UnsupportedMediaType,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NoFile | ApiError::UnsupportedMediaType => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
