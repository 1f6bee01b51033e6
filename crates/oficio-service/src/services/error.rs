//! Service layer errors
//!
//! One error type for every use case. Domain and application errors pass
//! through untouched; the service only adds the lookup-by-name flavor of
//! not-found and its own validation messages.

use thiserror::Error;

use oficio_common::AppError;
use oficio_core::DomainError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Application error (auth, config, infrastructure)
    #[error(transparent)]
    App(#[from] AppError),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status the API layer maps this error to
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) if e.is_not_found() => 404,
            Self::Domain(e) if e.is_permission() => 403,
            Self::Domain(e) if e.is_validation() => 400,
            Self::Domain(e) if e.is_invalid_state() => 409,
            Self::Domain(e) if e.is_external() => 502,
            Self::Domain(_) => 500,
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Machine-readable code for the error envelope
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oficio_core::Snowflake;

    #[test]
    fn not_found_shape() {
        let err = ServiceError::not_found("Quote", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Quote not found: 123");
    }

    #[test]
    fn domain_errors_pass_through() {
        let err = ServiceError::from(DomainError::ClientOnly);
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "CLIENT_ONLY");

        let err = ServiceError::from(DomainError::ConcurrentUpdate(Snowflake::new(5)));
        assert_eq!(err.status_code(), 409);

        let err = ServiceError::from(DomainError::GatewayError("down".into()));
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = ServiceError::validation("price must be positive");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn converts_to_app_error() {
        let app: AppError = ServiceError::not_found("Conversation", "456").into();
        assert_eq!(app.status_code(), 404);
    }
}
