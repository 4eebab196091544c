use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum GatewayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{operation} failed: {source}")]
    Internal {
        operation: &'static str,
        #[source]
        source: SqlxError,
    },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Tag a store result with the operation it belongs to, so a failure maps to
/// `{"error": "<operation> failed"}`.
pub trait OperationExt<T> {
    fn during(self, operation: &'static str) -> Result<T, GatewayError>;
}

impl<T> OperationExt<T> for Result<T, SqlxError> {
    fn during(self, operation: &'static str) -> Result<T, GatewayError> {
        self.map_err(|source| GatewayError::Internal { operation, source })
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            GatewayError::Unauthorized => "Unauthorized".to_string(),
            GatewayError::Forbidden(msg) | GatewayError::NotFound(msg) => msg.to_string(),
            GatewayError::Validation(msg) => msg,
            GatewayError::Internal { operation, source } => {
                error!(operation, error = %source, "store operation failed");
                format!("{operation} failed")
            }
        };
        (status, Json(ApiErrorResponse { error: message })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}
