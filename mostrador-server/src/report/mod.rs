//! Sales report and export formats
//!
//! A [`SalesReport`] bundles the bucketed sales of a period with its totals,
//! top products and category distribution. It exports as:
//!
//! - `json`: pretty-printed, parses back into an equal report
//! - `csv`: one `periodo,ventas,pedidos` row per bucket
//! - `text`: human-readable summary

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::metrics::{CategoryShare, DateRange, Period, SalesBucket, TopProduct};
use crate::utils::AppResult;
use crate::utils::time::TimeWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    pub window: TimeWindow,
    pub generated_at: i64,
    pub buckets: Vec<SalesBucket>,
    pub total_sales: f64,
    pub total_orders: u64,
    /// total_sales / total_orders, 0 without orders
    pub average_ticket: f64,
    pub top_products: Vec<TopProduct>,
    pub categories: Vec<CategoryShare>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    #[serde(alias = "txt")]
    Text,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }
}

fn export_failed(format: ExportFormat, err: impl std::fmt::Display) -> AppError {
    tracing::error!(format = format.extension(), error = %err, "Report export failed");
    AppError::with_message(
        ErrorCode::ReportExportFailed,
        format!("Failed to export report as {}: {}", format.extension(), err),
    )
}

pub fn export(report: &SalesReport, format: ExportFormat) -> AppResult<Vec<u8>> {
    match format {
        ExportFormat::Json => {
            serde_json::to_vec_pretty(report).map_err(|e| export_failed(format, e))
        }
        ExportFormat::Csv => export_csv(&report.buckets).map_err(|e| export_failed(format, e)),
        ExportFormat::Text => Ok(export_text(report).into_bytes()),
    }
}

fn export_csv(buckets: &[SalesBucket]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if buckets.is_empty() {
        writer.write_record(["periodo", "ventas", "pedidos"])?;
    }
    for bucket in buckets {
        writer.serialize(bucket)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn export_text(report: &SalesReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Reporte de ventas");
    match report.range {
        Some(range) => {
            let _ = writeln!(
                out,
                "Rango: {} a {}",
                range.start.format("%d/%m/%Y"),
                range.end.format("%d/%m/%Y")
            );
        }
        None => {
            let _ = writeln!(out, "Período: {}", period_name(report.period));
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Ventas totales: {:.2}", report.total_sales);
    let _ = writeln!(out, "Pedidos: {}", report.total_orders);
    let _ = writeln!(out, "Ticket promedio: {:.2}", report.average_ticket);

    if !report.buckets.is_empty() {
        let _ = writeln!(out);
        for bucket in &report.buckets {
            let _ = writeln!(
                out,
                "  {:<8} {:>12.2} {:>6}",
                bucket.label, bucket.sales, bucket.orders
            );
        }
    }

    if !report.top_products.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Productos más vendidos:");
        for (rank, p) in report.top_products.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({} u., {:.2})",
                rank + 1,
                p.name,
                p.quantity,
                p.revenue
            );
        }
    }

    if !report.categories.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Ventas por categoría:");
        for c in &report.categories {
            let _ = writeln!(out, "  {}: {}%", c.name, c.percentage);
        }
    }
    out
}

fn period_name(period: Period) -> &'static str {
    match period {
        Period::Day => "hoy",
        Period::Week => "últimos 7 días",
        Period::Month => "mes actual",
        Period::Year => "año actual",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> SalesReport {
        SalesReport {
            period: Period::Week,
            range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            }),
            window: TimeWindow::new(1_740_798_000_000, 1_741_402_800_000),
            generated_at: 1_741_400_000_000,
            buckets: vec![
                SalesBucket {
                    label: "01/03".into(),
                    sales: 1500.5,
                    orders: 3,
                },
                SalesBucket {
                    label: "02/03".into(),
                    sales: 99.99,
                    orders: 1,
                },
            ],
            total_sales: 1600.49,
            total_orders: 4,
            average_ticket: 400.12,
            top_products: vec![TopProduct {
                product_id: Some(1),
                name: "Yerba, 1kg".into(),
                quantity: 12,
                revenue: 1200.0,
                color: "#3B82F6".into(),
            }],
            categories: vec![CategoryShare {
                category_id: None,
                name: "Sin categoría".into(),
                revenue: 1600.49,
                percentage: 100,
                color: "#3B82F6".into(),
            }],
        }
    }

    #[test]
    fn test_json_export_parses_back_equal() {
        let report = sample();
        let bytes = export(&report, ExportFormat::Json).unwrap();
        let parsed: SalesReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_csv_export_rows() {
        let bytes = export(&sample(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "periodo,ventas,pedidos\n01/03,1500.5,3\n02/03,99.99,1\n");
    }

    #[test]
    fn test_csv_export_empty_has_header() {
        let mut report = sample();
        report.buckets.clear();
        let bytes = export(&report, ExportFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "periodo,ventas,pedidos\n");
    }

    #[test]
    fn test_text_export_summary() {
        let bytes = export(&sample(), ExportFormat::Text).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Rango: 01/03/2025 a 07/03/2025"));
        assert!(text.contains("Ventas totales: 1600.49"));
        assert!(text.contains("Pedidos: 4"));
        assert!(text.contains("1. Yerba, 1kg (12 u., 1200.00)"));
        assert!(text.contains("Sin categoría: 100%"));
    }

    #[test]
    fn test_format_parsing_and_headers() {
        let f: ExportFormat = serde_json::from_str("\"txt\"").unwrap();
        assert_eq!(f, ExportFormat::Text);
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv; charset=utf-8");
        assert_eq!(ExportFormat::default().extension(), "json");
    }
}
