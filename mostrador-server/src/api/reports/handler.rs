//! Reports API Handlers

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use http::{HeaderValue, header};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::util::now_millis;

use crate::api::query::RangeQuery;
use crate::core::ServerState;
use crate::metrics::{
    CategoryShare, DateRange, FinancialBalance, MarginReport, Period, SalesBucket, TopProduct,
};
use crate::report::{self, ExportFormat};
use crate::utils::{AppError, AppResult};
use crate::utils::time::local_date;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// `day|week|month|year` or the Spanish names
    pub period: Option<String>,
    pub days: Option<u32>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub format: Option<ExportFormat>,
}

impl ReportQuery {
    fn period_or(&self, default: Period) -> AppResult<Period> {
        let Some(raw) = self.period.as_deref().filter(|p| !p.trim().is_empty()) else {
            return Ok(default);
        };
        Period::parse(raw).ok_or_else(|| {
            AppError::field(
                ErrorCode::ReportInvalidPeriod,
                "period",
                format!("unknown period '{raw}', expected day, week, month or year"),
            )
        })
    }

    fn range(&self) -> AppResult<Option<DateRange>> {
        RangeQuery {
            start: self.start.clone(),
            end: self.end.clone(),
        }
        .range()
    }
}

/// GET /api/reports/sales?period=&start=&end=
pub async fn sales(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<SalesBucket>>> {
    let range = query.range()?;
    let buckets = state
        .reports()
        .sales_buckets(query.period_or(Period::Day)?, range, now_millis())
        .await?;
    Ok(Json(buckets))
}

/// GET /api/reports/top-products?days=&start=&end=
pub async fn top_products(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<TopProduct>>> {
    let reports = state.reports();
    let window = reports.trailing_window(query.days, query.range()?, now_millis())?;
    Ok(Json(reports.top_products(window).await))
}

/// GET /api/reports/categories?days=&start=&end=
pub async fn categories(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<CategoryShare>>> {
    let reports = state.reports();
    let window = reports.trailing_window(query.days, query.range()?, now_millis())?;
    Ok(Json(reports.category_distribution(window).await))
}

/// GET /api/reports/margins
pub async fn margins(State(state): State<ServerState>) -> Json<MarginReport> {
    Json(state.reports().margins().await)
}

/// GET /api/reports/balance?period=&start=&end= - current month by default
pub async fn balance(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<FinancialBalance>> {
    let reports = state.reports();
    let window = reports.window_for(
        query.period_or(Period::Month)?,
        query.range()?,
        now_millis(),
    )?;
    Ok(Json(reports.balance(window).await))
}

/// GET /api/reports/export?period=&start=&end=&format=json|csv|txt
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let now = now_millis();
    let format = query.format.unwrap_or_default();
    let report = state
        .reports()
        .sales_report(query.period_or(Period::Day)?, query.range()?, now)
        .await?;
    let body = report::export(&report, format)?;

    let filename = format!(
        "reporte-ventas-{}.{}",
        local_date(now, state.config.timezone).format("%Y-%m-%d"),
        format.extension()
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    tracing::info!(
        format = format.extension(),
        bytes = body.len(),
        orders = report.total_orders,
        "Sales report exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
