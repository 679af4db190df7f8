//! Ticketing Error Types
//!
//! Ticketing-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Client mistakes carry full detail;
//! everything else is logged here and reaches the caller as a bare 500.

use crate::domain::repository::AllocationError;
use crate::domain::token::SigningError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::validation::FieldError;
use platform::qr::EncodingError;
use std::time::Duration;
use thiserror::Error;

/// Ticketing-specific result type alias
pub type TicketResult<T> = Result<T, TicketError>;

pub const MALFORMED_INPUT_MESSAGE: &str = "Invalid content, expected valid JSON";
pub const VALIDATION_MESSAGE: &str = "Invalid Request";
pub const GIG_NOT_FOUND_MESSAGE: &str = "Gig not found";

#[derive(Debug, Error)]
pub enum TicketError {
    /// Body is not a JSON object
    #[error("malformed purchase request: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// One or more field rules failed
    #[error("purchase request rejected with {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("gig not found: {0}")]
    GigNotFound(String),

    #[error("token signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("code encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("ticket number allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    #[error("catalog lookup timed out after {0:?}")]
    CatalogTimeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TicketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TicketError::MalformedInput(_) | TicketError::Validation(_) => ErrorKind::BadRequest,
            TicketError::GigNotFound(_) => ErrorKind::NotFound,
            TicketError::Signing(_)
            | TicketError::Encoding(_)
            | TicketError::Allocation(_)
            | TicketError::CatalogTimeout(_)
            | TicketError::Database(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            TicketError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(FieldError::field).collect();
                tracing::info!(?fields, "Rejected invalid purchase request");
            }
            TicketError::CatalogTimeout(timeout) => {
                tracing::error!(?timeout, "Catalog lookup timed out");
            }
            internal if internal.kind() == ErrorKind::InternalServerError => {
                tracing::error!(
                    error = %internal,
                    source = ?std::error::Error::source(internal),
                    "Ticketing internal error"
                );
            }
            rejected => {
                tracing::info!(error = %rejected, "Rejected purchase request");
            }
        }
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::MalformedInput(e) => {
                AppError::bad_request(MALFORMED_INPUT_MESSAGE).with_source(e)
            }
            TicketError::Validation(errors) => {
                AppError::bad_request(VALIDATION_MESSAGE).with_field_errors(errors)
            }
            TicketError::GigNotFound(_) => AppError::not_found(GIG_NOT_FOUND_MESSAGE),
            internal => AppError::internal().with_source(internal),
        }
    }
}

impl IntoResponse for TicketError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let malformed = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        assert_eq!(
            TicketError::MalformedInput(malformed).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(TicketError::Validation(vec![]).kind(), ErrorKind::BadRequest);
        assert_eq!(
            TicketError::GigNotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TicketError::CatalogTimeout(Duration::from_secs(3)).kind(),
            ErrorKind::InternalServerError
        );
        assert_eq!(
            TicketError::Allocation(AllocationError::Exhausted).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let app: AppError = TicketError::Allocation(AllocationError::InvalidValue(-1)).into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.message(), "Internal Server Error");
        assert!(app.field_errors().is_empty());
    }

    #[test]
    fn test_encoding_and_catalog_failures_are_internal() {
        let failures = [
            TicketError::Encoding(EncodingError::PayloadTooLong { len: 2915 }),
            TicketError::Database(sqlx::Error::PoolTimedOut),
        ];
        for err in failures {
            assert_eq!(err.kind(), ErrorKind::InternalServerError);
            let app: AppError = err.into();
            assert_eq!(app.status_code(), 500);
            assert_eq!(app.message(), "Internal Server Error");
        }
    }

    #[test]
    fn test_validation_keeps_field_errors() {
        let app: AppError =
            TicketError::Validation(vec![FieldError::mandatory("buyerName")]).into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.message(), "Invalid Request");
        assert_eq!(app.field_errors().len(), 1);
    }

    #[test]
    fn test_not_found_message() {
        let app: AppError = TicketError::GigNotFound("band9-nowhere".into()).into();
        assert_eq!(app.status_code(), 404);
        assert_eq!(app.message(), "Gig not found");
    }
}
