//! Error types for the todo API.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Detail message returned for any lookup of an absent todo.
pub const TODO_NOT_FOUND: &str = "Todo not found";

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Todo store and backend errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Todo {id} not found")]
    NotFound { id: i64 },

    /// The highest stored id leaves no room for another.
    #[error("No todo id left after {max_id}")]
    IdsExhausted { max_id: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// HTTP-facing error. Every variant renders as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request body or path could not be decoded into the expected shape.
    #[error("Unprocessable request: {0}")]
    Validation(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Convenience alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, TODO_NOT_FOUND.to_string())
            }
            ApiError::Store(err) => {
                tracing::error!(error = %err, "Todo store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
