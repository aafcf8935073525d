//! Error handling - RFC 7807 problem responses.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use inkpress_core::services::LOAD_ERROR_MESSAGE;
use inkpress_core::{DomainError, StoreError};
use inkpress_shared::ErrorResponse;

/// Route clients are sent to when a session is missing.
pub const LOGIN_ROUTE: &str = "/api/auth/login";

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    Validation(Vec<String>),
    /// The post store could not be reached or failed the call.
    ServiceUnavailable,
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::Validation(errors) => write!(f, "Validation errors: {errors:?}"),
            AppError::ServiceUnavailable => write!(f, "Post store unavailable"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized().with_instance(LOGIN_ROUTE),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::Validation(errors) => ErrorResponse::unprocessable(errors.join(", ")),
            AppError::ServiceUnavailable => ErrorResponse::service_unavailable(LOAD_ERROR_MESSAGE),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{entity_type} with id {id} not found"))
            }
            DomainError::Validation(msg) => AppError::Validation(vec![msg]),
            DomainError::InvalidCursor(msg) => AppError::BadRequest(msg),
            DomainError::Import(msg) => AppError::BadRequest(format!("Import failed: {msg}")),
            DomainError::Store(e) => e.into(),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Post not found".to_string()),
            StoreError::InvalidId(id) => AppError::NotFound(format!("Post with id {id} not found")),
            StoreError::Constraint(msg) => AppError::Conflict(msg),
            StoreError::Connection(msg) => {
                tracing::error!("Post store connection error: {}", msg);
                AppError::ServiceUnavailable
            }
            StoreError::Query(msg) => {
                tracing::error!("Post store query error: {}", msg);
                AppError::ServiceUnavailable
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
