//! Period-bucketed sales
//!
//! | Period | Window | Bucket | Label (es) |
//! |--------|--------|--------|------------|
//! | `day` | today | hour of day | `14:00` |
//! | `week` | last 7 days incl. today | day | `lun` |
//! | `month` | current month | day of month | `9` |
//! | `year` | current year | month | `ene` |
//! | explicit range | `[start, end]` | day | `09/03` |
//!
//! Buckets are returned in chronological order.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::Sale;

use super::revenue_sales;
use crate::utils::money;
use crate::utils::time::{self, TimeWindow};
use crate::utils::AppResult;

const WEEK_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    #[serde(alias = "dia")]
    Day,
    #[serde(alias = "semana")]
    Week,
    #[serde(alias = "mes")]
    Month,
    #[serde(alias = "año", alias = "anio")]
    Year,
}

impl Period {
    /// Query-string form: English or Spanish name, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "day" | "dia" | "día" => Some(Self::Day),
            "week" | "semana" => Some(Self::Week),
            "month" | "mes" => Some(Self::Month),
            "year" | "año" | "anio" => Some(Self::Year),
            _ => None,
        }
    }

    /// Window implied by the period, relative to `now`
    pub fn window(self, now: i64, tz: Tz) -> TimeWindow {
        match self {
            Period::Day => TimeWindow::day_of(now, tz),
            Period::Week => TimeWindow::trailing_days(now, WEEK_DAYS, tz),
            Period::Month => TimeWindow::month_of(now, tz),
            Period::Year => TimeWindow::year_of(now, tz),
        }
    }
}

/// Inclusive calendar-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn window(&self, tz: Tz) -> AppResult<TimeWindow> {
        TimeWindow::from_dates(self.start, self.end, tz)
    }
}

/// Language of weekday / month labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLocale {
    #[default]
    Es,
    En,
}

impl LabelLocale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "es" | "es-ar" | "es_ar" => Some(Self::Es),
            "en" | "en-us" | "en_us" => Some(Self::En),
            _ => None,
        }
    }

    fn weekday(self, day: Weekday) -> &'static str {
        const ES: [&str; 7] = ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"];
        const EN: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        let idx = day.num_days_from_monday() as usize;
        match self {
            Self::Es => ES[idx],
            Self::En => EN[idx],
        }
    }

    fn month(self, month: u32) -> &'static str {
        const ES: [&str; 12] = [
            "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
        ];
        const EN: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Self::Es => ES[idx],
            Self::En => EN[idx],
        }
    }
}

/// One chart bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesBucket {
    #[serde(rename = "periodo")]
    pub label: String,
    #[serde(rename = "ventas")]
    pub sales: f64,
    #[serde(rename = "pedidos")]
    pub orders: u64,
}

/// Bucket revenue-counting sales of the period (or of `range`, when given).
///
/// Only buckets with at least one sale are emitted.
pub fn bucket_sales(
    sales: &[Sale],
    period: Period,
    range: Option<DateRange>,
    now: i64,
    tz: Tz,
    locale: LabelLocale,
) -> AppResult<Vec<SalesBucket>> {
    let window = match range {
        Some(r) => r.window(tz)?,
        None => period.window(now, tz),
    };

    // sort key -> (label, amount, orders)
    let mut buckets: BTreeMap<i64, (String, Decimal, u64)> = BTreeMap::new();
    for sale in revenue_sales(sales, window) {
        let local = time::to_local(sale.sold_at, tz);
        let date = local.date_naive();
        let (key, label) = match (range, period) {
            (Some(_), _) => (
                i64::from(date.num_days_from_ce()),
                date.format("%d/%m").to_string(),
            ),
            (None, Period::Day) => {
                let hour = local.hour();
                (i64::from(hour), format!("{hour:02}:00"))
            }
            (None, Period::Week) => (
                i64::from(date.num_days_from_ce()),
                locale.weekday(date.weekday()).to_string(),
            ),
            (None, Period::Month) => (i64::from(date.day()), date.day().to_string()),
            (None, Period::Year) => (
                i64::from(date.month()),
                locale.month(date.month()).to_string(),
            ),
        };

        let entry = buckets
            .entry(key)
            .or_insert_with(|| (label, Decimal::ZERO, 0));
        entry.1 = entry.1.saturating_add(money::to_decimal(sale.total));
        entry.2 += 1;
    }

    Ok(buckets
        .into_values()
        .map(|(label, amount, orders)| SalesBucket {
            label,
            sales: money::to_f64(amount),
            orders,
        })
        .collect())
}
