//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the error every service and handler returns, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (field-level validation messages, ids)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Error with `code` attached to a single input field
    ///
    /// Details carry `{"fields": {field: [msg]}}`, the same shape as
    /// derive-validation failures.
    pub fn field(code: ErrorCode, field: &str, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let mut fields = serde_json::Map::new();
        fields.insert(field.to_string(), Value::Array(vec![Value::from(msg.clone())]));
        Self::with_message(code, format!("{field}: {msg}"))
            .with_detail("fields", Value::Object(fields))
    }

    /// Validation error attached to a single input field
    pub fn invalid_field(field: &str, msg: impl Into<String>) -> Self {
        Self::field(ErrorCode::ValidationFailed, field, msg)
    }

    /// Numeric input outside its accepted range
    pub fn out_of_range(field: &str, msg: impl Into<String>) -> Self {
        Self::field(ErrorCode::ValueOutOfRange, field, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = serde_json::Map::new();
        let mut names: Vec<String> = Vec::new();
        for (field, kind) in errors.errors() {
            let messages: Vec<Value> = match kind {
                validator::ValidationErrorsKind::Field(errs) => errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                            .into()
                    })
                    .collect(),
                // Nested struct / list errors are reported by field name only
                _ => vec![Value::from("invalid")],
            };
            names.push(field.to_string());
            fields.insert(field.to_string(), Value::Array(messages));
        }
        names.sort();
        Self::with_message(
            ErrorCode::ValidationFailed,
            format!("Invalid fields: {}", names.join(", ")),
        )
        .with_detail("fields", Value::Object(fields))
    }
}

/// Error response body
///
/// Successful handlers return their payload as bare JSON; failures render
/// through this envelope.
///
/// - `code`: Error code
/// - `message`: Human-readable message
/// - `details`: Additional error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::error(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::ClientNotFound);
        assert_eq!(err.code, ErrorCode::ClientNotFound);
        assert_eq!(err.message, "Client not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "email")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "email");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_invalid_field() {
        let err = AppError::invalid_field("amount", "must be positive");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["fields"]["amount"][0], "must be positive");
    }

    #[test]
    fn test_out_of_range() {
        let err = AppError::out_of_range("days", "must be between 1 and 3660");
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "days: must be between 1 and 3660");
        let details = err.details.unwrap();
        assert_eq!(details["fields"]["days"][0], "must be between 1 and 3660");

        assert_eq!(AppError::internal("x").code, ErrorCode::InternalError);
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 0.0))]
        price: f64,
    }

    #[test]
    fn test_from_validation_errors() {
        let probe = Probe {
            name: String::new(),
            price: -1.0,
        };
        let err: AppError = probe.validate().unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid fields: name, price");
        let details = err.details.unwrap();
        assert_eq!(details["fields"]["name"][0], "name is required");
        assert_eq!(details["fields"]["price"][0], "range");
    }

    #[test]
    fn test_api_response_error() {
        let err = AppError::with_message(ErrorCode::SaleNotFound, "Sale not found")
            .with_detail("id", 123);
        let response = ApiResponse::error(&err);

        assert_eq!(response.code, 3001);
        assert_eq!(response.message, "Sale not found");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_api_response_serialize() {
        let err = AppError::new(ErrorCode::InsufficientStock);
        let json = serde_json::to_value(ApiResponse::error(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": 3007, "message": "Insufficient stock"})
        );
    }
}
