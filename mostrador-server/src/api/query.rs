//! Shared query-string extractors

use serde::Deserialize;

use crate::metrics::DateRange;
use crate::utils::time::{TimeWindow, parse_date};
use crate::utils::{AppError, AppResult};

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`
///
/// Both bounds or neither; a lone bound is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    pub fn range(&self) -> AppResult<Option<DateRange>> {
        match (blank_to_none(&self.start), blank_to_none(&self.end)) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => Ok(Some(DateRange {
                start: parse_date(start)?,
                end: parse_date(end)?,
            })),
            (Some(_), None) => Err(AppError::invalid_field("end", "end date is required with start")),
            (None, Some(_)) => Err(AppError::invalid_field("start", "start date is required with end")),
        }
    }

    /// Window of the range in the business timezone, if one was given
    pub fn window(&self, tz: chrono_tz::Tz) -> AppResult<Option<TimeWindow>> {
        self.range()?.map(|r| r.window(tz)).transpose()
    }
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
