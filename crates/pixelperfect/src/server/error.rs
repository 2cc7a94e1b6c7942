//! Mapping of pipeline and form errors onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pixelperfect_core::TransformError;
use serde_json::json;
use thiserror::Error;

/// Everything a request can fail with.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A pipeline step failed
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The multipart body could not be read
    #[error("Malformed upload: {message}")]
    Multipart { status: StatusCode, message: String },

    /// A form field is missing or unparseable
    #[error("Invalid form field: {0}")]
    InvalidField(String),

    /// The transform exceeded the configured time budget
    #[error("Transform timed out after {0}ms")]
    Timeout(u64),

    /// The blocking worker died
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Transform(err) => match err {
                TransformError::Decode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                TransformError::InvalidCrop { .. }
                | TransformError::InvalidDimensions { .. }
                | TransformError::InvalidQuality { .. } => StatusCode::BAD_REQUEST,
                TransformError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                TransformError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                TransformError::Encode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Multipart { status, .. } => *status,
            Self::InvalidField(_) => StatusCode::BAD_REQUEST,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Category name reported in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transform(err) => err.kind(),
            Self::Multipart { .. } | Self::InvalidField(_) => "ValidationError",
            Self::Timeout(_) => "TimeoutError",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }
        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
