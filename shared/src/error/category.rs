//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0xxx: General errors
/// - 1xxx: Product / category errors
/// - 2xxx: Client errors
/// - 3xxx: Sale / cart errors
/// - 4xxx: Expense errors
/// - 5xxx: Report errors
/// - 9xxx: System errors
///
/// 6xxx-8xxx are unassigned and classify as general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Product,
    Client,
    Sale,
    Expense,
    Report,
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            1000..2000 => Self::Product,
            2000..3000 => Self::Client,
            3000..4000 => Self::Sale,
            4000..5000 => Self::Expense,
            5000..6000 => Self::Report,
            9000.. => Self::System,
            _ => Self::General,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Product => "product",
            Self::Client => "client",
            Self::Sale => "sale",
            Self::Expense => "expense",
            Self::Report => "report",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Product);
        assert_eq!(ErrorCategory::from_code(1103), ErrorCategory::Product);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Client);
        assert_eq!(ErrorCategory::from_code(3005), ErrorCategory::Sale);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Expense);
        assert_eq!(ErrorCategory::from_code(5003), ErrorCategory::Report);
        assert_eq!(ErrorCategory::from_code(7000), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::General);
        assert_eq!(
            ErrorCode::CategoryNameExists.category(),
            ErrorCategory::Product
        );
        assert_eq!(ErrorCode::InsufficientStock.category(), ErrorCategory::Sale);
        assert_eq!(
            ErrorCode::StorageCorrupted.category(),
            ErrorCategory::System
        );
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Expense).unwrap();
        assert_eq!(json, "\"expense\"");
        let category: ErrorCategory = serde_json::from_str("\"report\"").unwrap();
        assert_eq!(category, ErrorCategory::Report);
        assert_eq!(ErrorCategory::Client.name(), "client");
    }
}
