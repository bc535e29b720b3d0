//! Metrics Aggregator
//!
//! Pure functions from entity collections to dashboard / report figures.
//! Nothing here touches the store or the clock: callers pass the records
//! and `now` explicitly, so the same input always gives the same output.
//!
//! Every percentage or average with an empty denominator is 0.

pub mod balance;
pub mod dashboard;
pub mod margins;
pub mod periods;
pub mod products;


pub use balance::{
    ExpenseBreakdown, FinancialBalance, ProductFinancials, compute_balance, product_financials,
};
pub use dashboard::{DashboardMetrics, DashboardOptions, compute_dashboard};
pub use margins::{
    MarginAnalysis, MarginReport, MarginTier, ProductMargin, TierCounts, analyze_margins,
    classify_margin,
};
pub use periods::{DateRange, LabelLocale, Period, SalesBucket, bucket_sales};
pub use products::{
    CATEGORY_COLORS, CategoryShare, TopProduct, UNCATEGORIZED, category_distribution,
    resolve_category, top_products,
};

pub use crate::utils::money::{percent_change, percentage};

use crate::utils::time::TimeWindow;
use shared::models::Sale;

/// Sales inside `window` that count toward revenue
pub(crate) fn revenue_sales(sales: &[Sale], window: TimeWindow) -> impl Iterator<Item = &Sale> {
    sales
        .iter()
        .filter(move |s| s.status.counts_as_revenue() && window.contains(s.sold_at))
}
