//! Input checks for values arriving from collaborators.
//!
//! Stored data is coerced, never rejected; new input is validated here.

use super::dates::{format_date, parse_date, today};
use crate::errors::{DomainError, DomainResult};

pub fn require_amount(field: &str, amount: f64) -> DomainResult<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(DomainError::Validation(format!(
            "{field} must be a non-negative number"
        )))
    }
}

/// Trimmed, non-empty text
pub fn require_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Normalize a date to `YYYY-MM-DD`; absent means today
pub fn normalize_date(field: &str, value: Option<&str>) -> DomainResult<String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(format_date(today())),
        Some(raw) => parse_date(raw).map(format_date).ok_or_else(|| {
            DomainError::Validation(format!("{field} '{raw}' is not a recognized date"))
        }),
    }
}
