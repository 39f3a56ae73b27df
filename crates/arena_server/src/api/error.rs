//! Mapping of service errors onto HTTP responses.

use crate::GameError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error_message: String,
}

impl GameError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::NotFound { .. } => StatusCode::NOT_FOUND,
            GameError::Forbidden(_) => StatusCode::FORBIDDEN,
            GameError::Conflict(_) => StatusCode::CONFLICT,
            GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::Storage(_) | GameError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            GameError::Storage(_) | GameError::Internal(_) => {
                // Details stay in the log.
                error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error_message })).into_response()
    }
}
