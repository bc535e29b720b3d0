//! Dashboard summary cards

use std::collections::HashSet;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::models::{Product, Sale};

use super::revenue_sales;
use crate::utils::money;
use crate::utils::time::TimeWindow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub sales_today: f64,
    pub sales_yesterday: f64,
    /// Day-over-day change in percent (0 when yesterday had no sales)
    pub sales_today_change: f64,
    pub orders_today: u64,
    /// Distinct registered clients with a purchase in the trailing window
    pub active_clients: u64,
    /// Units in stock across active products
    pub total_stock: i64,
    pub low_stock_products: u64,
    pub out_of_stock_products: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub tz: Tz,
    pub active_client_window_days: u32,
    /// Minimum stock for products whose own `min_stock` is 0
    pub default_min_stock: i64,
}

pub fn compute_dashboard(
    sales: &[Sale],
    products: &[Product],
    now: i64,
    opts: &DashboardOptions,
) -> DashboardMetrics {
    let today = TimeWindow::day_of(now, opts.tz);
    let yesterday = today.previous();

    let today_totals: Vec<f64> = revenue_sales(sales, today).map(|s| s.total).collect();
    let orders_today = today_totals.len() as u64;
    let sales_today = money::sum(today_totals);
    let sales_yesterday = money::sum(revenue_sales(sales, yesterday).map(|s| s.total));

    let client_window = TimeWindow::trailing_days(now, opts.active_client_window_days, opts.tz);
    let active_clients = revenue_sales(sales, client_window)
        .filter_map(|s| s.client_id)
        .collect::<HashSet<_>>()
        .len() as u64;

    let active_products = products.iter().filter(|p| p.is_active);
    let mut total_stock = 0i64;
    let mut low_stock_products = 0u64;
    let mut out_of_stock_products = 0u64;
    for p in active_products {
        total_stock = total_stock.saturating_add(p.stock.max(0));
        if p.is_out_of_stock() {
            out_of_stock_products += 1;
        } else if p.is_low_stock(opts.default_min_stock) {
            low_stock_products += 1;
        }
    }

    DashboardMetrics {
        sales_today,
        sales_yesterday,
        sales_today_change: money::percent_change(sales_today, sales_yesterday),
        orders_today,
        active_clients,
        total_stock,
        low_stock_products,
        out_of_stock_products,
    }
}
