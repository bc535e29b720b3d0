//! Report service
//!
//! Loads entity collections and feeds them to the metrics functions.
//! A failed or cancelled load degrades the result instead of failing the
//! request: the dashboard comes back zeroed and lists come back empty, with
//! the cause logged. Invalid input (e.g. a reversed date range) is still an
//! error.

use std::future::Future;

use chrono_tz::Tz;
use shared::models::{Category, Expense, Product, Sale};
use tokio_util::sync::CancellationToken;

use super::SettingsService;
use crate::metrics::{
    self, CategoryShare, DashboardMetrics, DashboardOptions, DateRange, FinancialBalance,
    LabelLocale, MarginReport, Period, SalesBucket, TopProduct,
};
use crate::report::SalesReport;
use crate::store::{Entity, EntityStore, RepoError, RepoResult, cancellable};
use crate::utils::time::TimeWindow;
use crate::utils::{AppError, AppResult, money};

/// Longest trailing window a report may ask for (about ten years)
pub const MAX_REPORT_DAYS: u32 = 3660;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub tz: Tz,
    pub locale: LabelLocale,
    pub active_client_window_days: u32,
    pub top_products_window_days: u32,
}

#[derive(Clone)]
pub struct ReportService {
    store: EntityStore,
    shutdown: CancellationToken,
    options: ReportOptions,
}

impl ReportService {
    pub fn new(store: EntityStore, shutdown: CancellationToken, options: ReportOptions) -> Self {
        Self {
            store,
            shutdown,
            options,
        }
    }

    /// Run a store read; `None` when it failed or was cancelled
    async fn load<T, F>(&self, fut: F) -> Option<Vec<T>>
    where
        T: Entity,
        F: Future<Output = RepoResult<Vec<T>>>,
    {
        match cancellable(&self.shutdown, fut).await {
            Ok(records) => Some(records),
            Err(RepoError::Cancelled) => {
                tracing::info!(collection = T::COLLECTION, "Report load cancelled");
                None
            }
            Err(e) => {
                tracing::error!(
                    collection = T::COLLECTION,
                    error = %e,
                    "Report load failed, returning empty result"
                );
                None
            }
        }
    }

    async fn sales_in(&self, window: TimeWindow) -> Option<Vec<Sale>> {
        self.load(self.store.sales.list_between(window.start_ms, window.end_ms))
            .await
    }

    async fn products(&self) -> Option<Vec<Product>> {
        self.load(self.store.products.list()).await
    }

    async fn categories(&self) -> Option<Vec<Category>> {
        self.load(self.store.categories.list()).await
    }

    async fn expenses_in(&self, window: TimeWindow) -> Option<Vec<Expense>> {
        self.load(self.store.expenses.list_between(window.start_ms, window.end_ms))
            .await
    }

    /// Window for a period, or for an explicit range when one is given
    pub fn window_for(
        &self,
        period: Period,
        range: Option<DateRange>,
        now: i64,
    ) -> AppResult<TimeWindow> {
        match range {
            Some(r) => r.window(self.options.tz),
            None => Ok(period.window(now, self.options.tz)),
        }
    }

    /// Trailing `days` window, or an explicit range
    ///
    /// `days` must lie in `1..=MAX_REPORT_DAYS`.
    pub fn trailing_window(
        &self,
        days: Option<u32>,
        range: Option<DateRange>,
        now: i64,
    ) -> AppResult<TimeWindow> {
        if days.is_some_and(|d| !(1..=MAX_REPORT_DAYS).contains(&d)) {
            return Err(AppError::out_of_range(
                "days",
                format!("must be between 1 and {MAX_REPORT_DAYS}"),
            ));
        }
        match range {
            Some(r) => r.window(self.options.tz),
            None => Ok(TimeWindow::trailing_days(
                now,
                days.unwrap_or(self.options.top_products_window_days),
                self.options.tz,
            )),
        }
    }

    pub async fn dashboard(&self, now: i64) -> DashboardMetrics {
        let opts = DashboardOptions {
            tz: self.options.tz,
            active_client_window_days: self.options.active_client_window_days,
            default_min_stock: SettingsService::new(self.store.clone())
                .low_stock_threshold()
                .await,
        };

        // yesterday through today, widened to the active-client window
        let today = TimeWindow::day_of(now, opts.tz);
        let clients = TimeWindow::trailing_days(now, opts.active_client_window_days, opts.tz);
        let window = TimeWindow::new(
            today.previous().start_ms.min(clients.start_ms),
            today.end_ms,
        );

        let (sales, products) = futures::join!(self.sales_in(window), self.products());
        let (Some(sales), Some(products)) = (sales, products) else {
            return DashboardMetrics::default();
        };
        metrics::compute_dashboard(&sales, &products, now, &opts)
    }

    pub async fn sales_buckets(
        &self,
        period: Period,
        range: Option<DateRange>,
        now: i64,
    ) -> AppResult<Vec<SalesBucket>> {
        let window = self.window_for(period, range, now)?;
        let Some(sales) = self.sales_in(window).await else {
            return Ok(Vec::new());
        };
        metrics::bucket_sales(&sales, period, range, now, self.options.tz, self.options.locale)
    }

    pub async fn top_products(&self, window: TimeWindow) -> Vec<TopProduct> {
        match self.sales_in(window).await {
            Some(sales) => metrics::top_products(&sales, window),
            None => Vec::new(),
        }
    }

    pub async fn category_distribution(&self, window: TimeWindow) -> Vec<CategoryShare> {
        let loaded = futures::join!(self.sales_in(window), self.products(), self.categories());
        let (Some(sales), Some(products), Some(categories)) = loaded else {
            return Vec::new();
        };
        metrics::category_distribution(&sales, &products, &categories, window)
    }

    /// Margins of the active catalog
    pub async fn margins(&self) -> MarginReport {
        match self.products().await {
            Some(products) => {
                let active: Vec<Product> = products.into_iter().filter(|p| p.is_active).collect();
                metrics::analyze_margins(&active)
            }
            None => MarginReport::default(),
        }
    }

    /// Balance of `window` with trends against the window of equal length
    /// right before it
    pub async fn balance(&self, window: TimeWindow) -> FinancialBalance {
        let previous = window.previous();
        let span = TimeWindow::new(previous.start_ms, window.end_ms);

        let loaded = futures::join!(self.sales_in(span), self.products(), self.expenses_in(span));
        let (Some(sales), Some(products), Some(expenses)) = loaded else {
            return FinancialBalance::default();
        };

        let balance_of = |w: TimeWindow| {
            let financials = metrics::product_financials(&sales, &products, w);
            let spent: Vec<Expense> = expenses
                .iter()
                .filter(|e| w.contains(e.spent_at))
                .cloned()
                .collect();
            metrics::compute_balance(&financials, &spent)
        };

        balance_of(window).with_trends(&balance_of(previous))
    }

    pub async fn sales_report(
        &self,
        period: Period,
        range: Option<DateRange>,
        now: i64,
    ) -> AppResult<SalesReport> {
        let window = self.window_for(period, range, now)?;
        let mut report = SalesReport {
            period,
            range,
            window,
            generated_at: now,
            buckets: Vec::new(),
            total_sales: 0.0,
            total_orders: 0,
            average_ticket: 0.0,
            top_products: Vec::new(),
            categories: Vec::new(),
        };

        let Some(sales) = self.sales_in(window).await else {
            return Ok(report);
        };
        report.buckets =
            metrics::bucket_sales(&sales, period, range, now, self.options.tz, self.options.locale)?;

        let totals: Vec<f64> = sales
            .iter()
            .filter(|s| s.status.counts_as_revenue() && window.contains(s.sold_at))
            .map(|s| s.total)
            .collect();
        report.total_orders = totals.len() as u64;
        report.total_sales = money::sum(totals);
        if report.total_orders > 0 {
            report.average_ticket = money::round_money(report.total_sales / report.total_orders as f64);
        }
        report.top_products = metrics::top_products(&sales, window);

        if let (Some(products), Some(categories)) =
            futures::join!(self.products(), self.categories())
        {
            report.categories = metrics::category_distribution(&sales, &products, &categories, window);
        }
        Ok(report)
    }
}
