use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use shared::responses::{ApiResponse, ErrorSeverity};
use thiserror::Error;

/// Errors raised by the optimization core.
///
/// Tier failures (infeasible models, abandoned solves, empty extractions) are
/// deliberately NOT here: the engine treats them as a signal to relax to the
/// next tier and never surfaces them to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Optimizer Service Error
#[derive(Debug, Error)]
pub enum OptimizerServiceError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for OptimizerServiceError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message.clone(),
            ),
            Self::Engine(EngineError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, "invalid_input", message.clone())
            }
            Self::Engine(EngineError::Internal(message)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message.clone(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "Server error");
        } else {
            tracing::warn!(error = %self, %status, "Client error");
        }

        let severity = if status.is_server_error() {
            ErrorSeverity::Error
        } else {
            ErrorSeverity::Warning
        };

        let body = ApiResponse::<()>::err(kind, message, severity);
        (status, axum::Json(body)).into_response()
    }
}
