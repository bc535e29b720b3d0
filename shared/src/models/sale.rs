//! Sale Model

use super::payment::PaymentMethod;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Highest quantity a single sale line may ask for
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Sale lifecycle status
///
/// ```text
/// pending ──► processing ──► completed ──► refunded
///    │            │
///    └────────────┴──► cancelled
/// ```
/// `pending` may also go straight to `completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "procesando")]
    Processing,
    #[default]
    #[serde(alias = "completada")]
    Completed,
    #[serde(alias = "cancelada")]
    Cancelled,
    #[serde(alias = "reembolsada")]
    Refunded,
}

impl SaleStatus {
    pub fn can_transition_to(self, next: SaleStatus) -> bool {
        use SaleStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Cancelled)
                | (Completed, Refunded)
        )
    }

    /// Cancelled and refunded sales never count toward revenue
    pub fn counts_as_revenue(self) -> bool {
        !matches!(self, SaleStatus::Cancelled | SaleStatus::Refunded)
    }

    /// Entering this status gives the sold units back to stock
    pub fn restores_stock(self) -> bool {
        matches!(self, SaleStatus::Cancelled | SaleStatus::Refunded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Processing => "processing",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }
}

/// Line item of a persisted sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    /// None for lines imported without a catalog reference
    #[serde(default)]
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// quantity × unit_price
    pub subtotal: f64,
}

/// Sale entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    /// None for casual sales
    #[serde(default)]
    pub client_id: Option<i64>,
    /// Free-text name used by casual sales
    #[serde(default)]
    pub customer_name: Option<String>,
    pub lines: Vec<SaleLine>,
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    /// max(0, subtotal - discount)
    pub total: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: SaleStatus,
    pub sold_at: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Sale {
    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Line of a sale creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleLineInput {
    pub product_id: i64,
    #[validate(range(min = 1, max = 1_000_000, message = "quantity must be between 1 and 1000000"))]
    pub quantity: i64,
}

/// Create sale payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleCreate {
    pub client_id: Option<i64>,
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
    #[validate(length(min = 1, message = "a sale needs at least one item"), nested)]
    pub lines: Vec<SaleLineInput>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "discount must not be negative"))]
    pub discount: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub status: Option<SaleStatus>,
    /// Defaults to the time of submission
    pub sold_at: Option<i64>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Update sale payload (line items are immutable once submitted)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SaleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SaleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Status change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleStatusChange {
    pub status: SaleStatus,
}
