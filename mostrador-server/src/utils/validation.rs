//! Input validation helpers
//!
//! Payload structs derive `validator::Validate`; these helpers cover the
//! checks the derive cannot express.

use shared::error::ErrorCode;
use shared::models::MAX_PRICE;
use validator::Validate;

use crate::utils::{AppError, AppResult};

/// Entity names: product, category, client
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Run the derived validator and convert failures into a field-level
/// `ValidationFailed` error.
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(AppError::from)
}

/// Validate that a required string is not blank (the derive only checks length).
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_field(field, format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long (max {max_len})"),
        ));
    }
    Ok(())
}

/// Validate that a money amount is a finite number.
pub fn require_finite(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must be a finite number"),
        ));
    }
    Ok(())
}

/// Catalog prices: finite and within `0..=MAX_PRICE`
pub fn require_price(value: f64, field: &str) -> AppResult<()> {
    require_finite(value, field)?;
    if !(0.0..=MAX_PRICE).contains(&value) {
        return Err(AppError::field(
            ErrorCode::ProductInvalidPrice,
            field,
            format!("{field} must be between 0 and {MAX_PRICE}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_rejected() {
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.details.unwrap()["fields"].get("name").is_some());
    }

    #[test]
    fn test_long_text_rejected() {
        let long = "a".repeat(MAX_NOTE_LEN + 1);
        assert!(validate_required_text(&long, "notes", MAX_NOTE_LEN).is_err());
        assert!(validate_required_text("ok", "notes", MAX_NOTE_LEN).is_ok());
    }

    #[test]
    fn test_require_finite() {
        assert!(require_finite(1.5, "amount").is_ok());
        assert!(require_finite(f64::NAN, "amount").is_err());
        assert!(require_finite(f64::INFINITY, "amount").is_err());
    }

    #[test]
    fn test_require_price() {
        assert!(require_price(0.0, "sale_price").is_ok());
        assert!(require_price(MAX_PRICE, "sale_price").is_ok());
        let err = require_price(5e28, "sale_price").unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
        assert!(err.details.unwrap()["fields"].get("sale_price").is_some());
        assert_eq!(
            require_price(f64::NAN, "cost_price").unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
