//! Margin / profitability analysis
//!
//! Tier thresholds are inclusive on the lower bound:
//!
//! ```text
//!   margin_pct < 15        critical
//!   15 <= margin_pct < 25  low
//!   25 <= margin_pct < 35  warning
//!   35 <= margin_pct       normal
//! ```
//!
//! The tier is decided on the exact ratio; only the reported percentage is
//! rounded to cents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::Product;

use crate::utils::money;

pub const LOW_MARGIN_FROM: i64 = 15;
pub const WARNING_MARGIN_FROM: i64 = 25;
pub const NORMAL_MARGIN_FROM: i64 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginTier {
    Critical,
    Low,
    Warning,
    Normal,
}

impl MarginTier {
    pub fn for_pct(margin_pct: Decimal) -> Self {
        if margin_pct >= Decimal::from(NORMAL_MARGIN_FROM) {
            MarginTier::Normal
        } else if margin_pct >= Decimal::from(WARNING_MARGIN_FROM) {
            MarginTier::Warning
        } else if margin_pct >= Decimal::from(LOW_MARGIN_FROM) {
            MarginTier::Low
        } else {
            MarginTier::Critical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginAnalysis {
    /// sale_price - cost_price
    pub margin: f64,
    /// margin / sale_price * 100, 0 when the sale price is 0
    pub margin_pct: f64,
    pub tier: MarginTier,
}

pub fn classify_margin(sale_price: f64, cost_price: f64) -> MarginAnalysis {
    let price = money::to_decimal(sale_price);
    let margin = price.saturating_sub(money::to_decimal(cost_price));
    let margin_pct = money::ratio_pct(margin, price);
    MarginAnalysis {
        margin: money::to_f64(margin),
        margin_pct: money::to_f64(margin_pct),
        tier: MarginTier::for_pct(margin_pct),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMargin {
    pub product_id: i64,
    pub name: String,
    pub sale_price: f64,
    pub cost_price: f64,
    #[serde(flatten)]
    pub analysis: MarginAnalysis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub critical: u64,
    pub low: u64,
    pub warning: u64,
    pub normal: u64,
}

impl TierCounts {
    fn record(&mut self, tier: MarginTier) {
        match tier {
            MarginTier::Critical => self.critical += 1,
            MarginTier::Low => self.low += 1,
            MarginTier::Warning => self.warning += 1,
            MarginTier::Normal => self.normal += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginReport {
    /// Worst margin first
    pub products: Vec<ProductMargin>,
    pub counts: TierCounts,
    /// Unweighted mean of the product margin percentages
    pub average_margin_pct: f64,
}

pub fn analyze_margins(products: &[Product]) -> MarginReport {
    let mut counts = TierCounts::default();
    let mut rows: Vec<ProductMargin> = products
        .iter()
        .map(|p| {
            let analysis = classify_margin(p.sale_price, p.cost_price);
            counts.record(analysis.tier);
            ProductMargin {
                product_id: p.id,
                name: p.name.clone(),
                sale_price: p.sale_price,
                cost_price: p.cost_price,
                analysis,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.analysis
            .margin_pct
            .total_cmp(&b.analysis.margin_pct)
            .then_with(|| a.name.cmp(&b.name))
    });

    let average_margin_pct = if rows.is_empty() {
        0.0
    } else {
        let total =
            money::sum_decimal(rows.iter().map(|r| money::to_decimal(r.analysis.margin_pct)));
        money::to_f64(total / Decimal::from(rows.len()))
    };

    MarginReport {
        products: rows,
        counts,
        average_margin_pct,
    }
}
