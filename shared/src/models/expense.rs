//! Expense Model

use super::payment::PaymentMethod;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fixed buckets used by the financial balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseBucket {
    Operational,
    Administrative,
    Marketing,
    Other,
}

impl ExpenseBucket {
    /// Map a free-text expense category onto a bucket.
    ///
    /// Accepts English and Spanish spellings; anything else is `Other`.
    pub fn from_category(category: &str) -> Self {
        match category.trim().to_lowercase().as_str() {
            "operational" | "operativo" | "operativos" | "operacional" => Self::Operational,
            "administrative" | "administrativo" | "administrativos" => Self::Administrative,
            "marketing" | "publicidad" => Self::Marketing,
            _ => Self::Other,
        }
    }
}

/// Expense entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    /// Free text; see [`ExpenseBucket::from_category`]
    pub category: String,
    pub amount: f64,
    /// Provider / payee
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub spent_at: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Expense {
    pub fn bucket(&self) -> ExpenseBucket {
        ExpenseBucket::from_category(&self.category)
    }
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExpenseCreate {
    #[validate(length(min = 1, max = 200, message = "description must be 1-200 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "category is required"))]
    pub category: String,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: f64,
    #[validate(length(max = 200))]
    pub payee: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub spent_at: i64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Update expense payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExpenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "description must be 1-200 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "category is required"))]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub payee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}
