//! Error conversions
//!
//! Renders [`AppError`] as an HTTP response.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

/// Body shape: `{"error": message}` plus `"errors": [{field, message}]`
/// when field-level validation failed.
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if self.field_errors().is_empty() {
            serde_json::json!({ "error": self.message() })
        } else {
            serde_json::json!({
                "error": self.message(),
                "errors": self.field_errors(),
            })
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use crate::validation::FieldError;
    use axum::response::IntoResponse;

    #[test]
    fn test_internal_response_status() {
        let response = AppError::internal().into_response();
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_validation_response_status() {
        let response = AppError::bad_request("Invalid Request")
            .with_field_errors(vec![FieldError::mandatory("buyerName")])
            .into_response();
        assert_eq!(response.status(), 400);
    }
}
