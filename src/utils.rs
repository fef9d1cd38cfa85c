use crate::error::{CashFlowError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Display format used across the UI layer: `day/month/4-digit-year`.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap()
}

pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap()
}

/// End of the calendar month that starts at `month_start` (inclusive).
pub fn month_span_end(month_start: NaiveDate) -> NaiveDate {
    add_months(month_start, 1).pred_opt().unwrap()
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn parse_display_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DISPLAY_DATE_FORMAT)
        .map_err(|_| CashFlowError::InvalidDate(text.to_string()))
}

/// Parses an API date (`yyyy-MM-dd`). Empty or unparsable input maps to
/// `None`: records with no usable date are excluded from aggregation rather
/// than rejected.
pub fn parse_api_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Parses a demo-file date (`d-M-yyyy`, as in the bundled CSV exports).
pub fn parse_demo_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d-%m-%Y").ok()
}
