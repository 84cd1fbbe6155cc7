use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::storage::StoreError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A rejected create request, naming the field and the rule it broke.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("content is required and must be a non-empty string")]
    InvalidContent,
    #[error("ttl_seconds must be an integer >= 1")]
    InvalidTtl,
    #[error("ttl_seconds is too large")]
    TtlTooLarge,
    #[error("max_views must be an integer >= 1")]
    InvalidMaxViews,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// Missing, expired and exhausted pastes all look the same to callers.
    #[error("paste not found")]
    NotFound,
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("invalid JSON body")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },
    #[error("could not allocate a unique paste id")]
    KeyExhausted,
    #[error("failed to render page: {0}")]
    Render(String),
    #[error("storage unavailable")]
    StorageUnavailable {
        #[from]
        source: StoreError,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            ApiError::KeyExhausted => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::StorageUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            match &self {
                ApiError::StorageUnavailable { source } => error!("{self}: {source}"),
                _ => error!("{self}"),
            }
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
