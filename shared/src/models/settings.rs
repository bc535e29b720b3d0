//! Business profile (singleton settings record)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Id of the single business profile record
pub const BUSINESS_PROFILE_ID: i64 = 1;

/// Business profile
///
/// Pass-through configuration edited from the settings screen. Only
/// `low_stock_threshold` feeds the metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Percentage, e.g. 21 = 21%
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    /// Stored and returned, not enforced on sales
    #[serde(default)]
    pub max_discount: f64,
    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,
    #[serde(default = "default_true")]
    pub notify_low_stock: bool,
    #[serde(default)]
    pub notify_daily_summary: bool,
    #[serde(default)]
    pub notify_new_sale: bool,
}

fn default_currency() -> String {
    "ARS".to_string()
}

fn default_tax_rate() -> f64 {
    21.0
}

fn default_low_stock() -> i64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            id: BUSINESS_PROFILE_ID,
            name: String::new(),
            address: String::new(),
            currency: default_currency(),
            tax_rate: default_tax_rate(),
            max_discount: 0.0,
            low_stock_threshold: default_low_stock(),
            notify_low_stock: true,
            notify_daily_summary: false,
            notify_new_sale: false,
        }
    }
}

/// Update business profile payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BusinessProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub max_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub low_stock_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_low_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_daily_summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_new_sale: Option<bool>,
}
