//! Date filters feeding the report and export collaborators.
//!
//! Rows whose date field does not parse are excluded, never an error.

use super::dates::parse_date;
use chrono::{Datelike, NaiveDate};

/// Rows whose date lies in `start..=end`
pub fn filter_by_date_range<T, F>(rows: &[T], date_of: F, start: NaiveDate, end: NaiveDate) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    rows.iter()
        .filter(|row| {
            parse_date(date_of(row)).is_some_and(|date| date >= start && date <= end)
        })
        .cloned()
        .collect()
}

/// Rows whose date falls in the given calendar month (1-12) of `year`
pub fn filter_by_month_year<T, F>(rows: &[T], date_of: F, month: u32, year: i32) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    rows.iter()
        .filter(|row| {
            parse_date(date_of(row)).is_some_and(|date| date.month() == month && date.year() == year)
        })
        .cloned()
        .collect()
}

/// Optional filters as they arrive from a collaborator; unset parts match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub month_year: Option<(u32, i32)>,
}

impl DateFilter {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.month_year.is_none()
    }

    pub fn apply<T, F>(&self, rows: Vec<T>, date_of: F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T) -> &str + Copy,
    {
        if self.is_empty() {
            return rows;
        }
        let mut filtered = rows;
        if self.start.is_some() || self.end.is_some() {
            let start = self.start.unwrap_or(NaiveDate::MIN);
            let end = self.end.unwrap_or(NaiveDate::MAX);
            filtered = filter_by_date_range(&filtered, date_of, start, end);
        }
        if let Some((month, year)) = self.month_year {
            filtered = filter_by_month_year(&filtered, date_of, month, year);
        }
        filtered
    }
}
