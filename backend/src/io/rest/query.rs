//! Query-string filters shared by list and export endpoints.

use super::error::ApiError;
use crate::domain::dates::parse_date;
use crate::domain::DateFilter;
use chrono::NaiveDate;
use serde::Deserialize;

/// `?start_date=&end_date=` and/or `?month=&year=`
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DateQuery {
    pub fn to_filter(&self) -> Result<DateFilter, ApiError> {
        let month_year = match (self.month, self.year) {
            (None, None) => None,
            (Some(month), Some(year)) if (1..=12).contains(&month) => Some((month, year)),
            (Some(month), Some(_)) => {
                return Err(ApiError::BadRequest(format!("month {month} is out of range")))
            }
            _ => {
                return Err(ApiError::BadRequest(
                    "month and year must be given together".to_string(),
                ))
            }
        };
        Ok(DateFilter {
            start: parse_bound("start_date", self.start_date.as_deref())?,
            end: parse_bound("end_date", self.end_date.as_deref())?,
            month_year,
        })
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("{name} '{raw}' is not a date"))),
    }
}

/// `?period=` substring filter for arrears
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}
