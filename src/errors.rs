use crate::auth::AuthError;
use crate::db::StoreError;
use crate::validators::ValidationError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;

/// Error returned by request handlers. The detail is logged, the client only sees a
/// fixed message per kind.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("request timed out")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "Invalid input",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound(_) => "Not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::Conflict(_) => "Conflict",
            Self::Timeout => "Request timed out",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::info!(status = status.as_u16(), "{}", self);
        }

        HttpResponse::build(status).json(json!({ "error": self.message() }))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(msg) => Self::InvalidInput(msg),
            StoreError::NotFound(entity) => Self::NotFound(format!("{entity} not found")),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Storage(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.0)
    }
}

impl From<serde_valid::validation::Errors> for ApiError {
    fn from(err: serde_valid::validation::Errors) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSecret | AuthError::MissingClientId | AuthError::KeyFetch(_) => {
                Self::Internal(err.to_string())
            }
            other => Self::Unauthorized(other.to_string()),
        }
    }
}
