use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::{DbErr, SqlErr};
use sea_orm::TransactionError;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Standard error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Business-logic error taxonomy.
///
/// `NotFound` covers both truly-absent entities and entities outside the
/// caller's branch/account scope; the two are indistinguishable by design.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("event error: {0}")]
    Event(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Classifies an insert/update failure: unique-key violations become
    /// `Conflict`, everything else stays a store error.
    pub fn on_unique_violation(err: DbErr, conflict_message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(conflict_message.to_string())
            }
            _ => ServiceError::Database(err),
        }
    }

    /// HTTP status for this error. Conflicts and invalid states surface as
    /// 400 with a readable reason; store failures are 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::InvalidState(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Event(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Internal failures are redacted;
    /// the underlying cause is logged server-side instead.
    pub fn response_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Event(_) => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Flattens SeaORM transaction errors back into the service taxonomy so
/// `db.transaction(...)` call sites stay uniform.
impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => ServiceError::Database(db_err),
            TransactionError::Transaction(service_err) => service_err,
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

/// HTTP-layer error type used by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(inner) => inner.status_code(),
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn response_message(&self) -> String {
        match self {
            Self::Service(inner) => inner.response_message(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error serving request: {}", self);
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_and_invalid_states_map_to_bad_request() {
        assert_eq!(
            ServiceError::Conflict("open shift exists".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidState("purchase is cancelled".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::not_found("shift", "abc").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_errors_are_redacted() {
        let err = ServiceError::Database(DbErr::Custom("connection refused to 10.0.0.5".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response_message(), "internal server error");
    }
}
