//! Financial balance

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Expense, ExpenseBucket, Product, Sale};

use super::revenue_sales;
use crate::utils::money;
use crate::utils::time::TimeWindow;

/// Units, revenue and cost of one product over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFinancials {
    pub product_id: i64,
    pub name: String,
    pub units_sold: i64,
    pub revenue: f64,
    /// units_sold × current cost price
    pub cost: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub operational: f64,
    pub administrative: f64,
    pub marketing: f64,
    pub other: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialBalance {
    pub total_revenue: f64,
    pub product_cost: f64,
    pub total_expenses: f64,
    pub expenses: ExpenseBreakdown,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub gross_margin_pct: f64,
    pub net_margin_pct: f64,
    /// Change against the previous period, in percent
    pub revenue_trend: f64,
    pub expense_trend: f64,
    pub profit_trend: f64,
}

impl FinancialBalance {
    /// Fill the trend fields by comparing against `previous`
    pub fn with_trends(mut self, previous: &FinancialBalance) -> Self {
        self.revenue_trend = money::percent_change(self.total_revenue, previous.total_revenue);
        self.expense_trend = money::percent_change(self.total_expenses, previous.total_expenses);
        self.profit_trend = money::percent_change(self.net_profit, previous.net_profit);
        self
    }
}

/// Per-product financials for every catalog product sold in `window`.
///
/// Lines whose product no longer exists in the catalog are skipped.
pub fn product_financials(
    sales: &[Sale],
    products: &[Product],
    window: TimeWindow,
) -> Vec<ProductFinancials> {
    let mut sold: HashMap<i64, (i64, Decimal)> = HashMap::new();
    for line in revenue_sales(sales, window).flat_map(|s| s.lines.iter()) {
        let Some(id) = line.product_id else { continue };
        let entry = sold.entry(id).or_default();
        entry.0 = entry.0.saturating_add(line.quantity);
        entry.1 = entry
            .1
            .saturating_add(money::to_decimal(money::line_total(line.quantity, line.unit_price)));
    }

    let mut rows: Vec<ProductFinancials> = products
        .iter()
        .filter_map(|p| {
            let (units, revenue) = sold.get(&p.id).copied()?;
            let cost = money::to_decimal(money::line_total(units, p.cost_price));
            Some(ProductFinancials {
                product_id: p.id,
                name: p.name.clone(),
                units_sold: units,
                revenue: money::to_f64(revenue),
                cost: money::to_f64(cost),
                profit: money::to_f64(revenue.saturating_sub(cost)),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    rows
}

pub fn compute_balance(financials: &[ProductFinancials], expenses: &[Expense]) -> FinancialBalance {
    let revenue = money::sum_decimal(financials.iter().map(|f| money::to_decimal(f.revenue)));
    let cost = money::sum_decimal(financials.iter().map(|f| money::to_decimal(f.cost)));

    let mut buckets = [Decimal::ZERO; 4];
    for expense in expenses {
        let slot = match expense.bucket() {
            ExpenseBucket::Operational => 0,
            ExpenseBucket::Administrative => 1,
            ExpenseBucket::Marketing => 2,
            ExpenseBucket::Other => 3,
        };
        buckets[slot] = buckets[slot].saturating_add(money::to_decimal(expense.amount));
    }
    let total_expenses = money::sum_decimal(buckets);

    let gross = revenue.saturating_sub(cost);
    let net = gross.saturating_sub(total_expenses);

    let total_revenue = money::to_f64(revenue);
    let gross_profit = money::to_f64(gross);
    let net_profit = money::to_f64(net);

    FinancialBalance {
        total_revenue,
        product_cost: money::to_f64(cost),
        total_expenses: money::to_f64(total_expenses),
        expenses: ExpenseBreakdown {
            operational: money::to_f64(buckets[0]),
            administrative: money::to_f64(buckets[1]),
            marketing: money::to_f64(buckets[2]),
            other: money::to_f64(buckets[3]),
        },
        gross_profit,
        net_profit,
        gross_margin_pct: money::percentage(gross_profit, total_revenue),
        net_margin_pct: money::percentage(net_profit, total_revenue),
        ..Default::default()
    }
}
