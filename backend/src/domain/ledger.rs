//! Ledger aggregation over the cash transaction table.
//!
//! Everything here is a pure function over typed [`Transaction`]s. Amounts
//! were already coerced at the row boundary, so sums never fail.

use super::dates::parse_date;
use shared::{Granularity, LedgerTotals, PeriodTotals, Transaction, TransactionType};
use std::collections::BTreeMap;

/// Group key for transactions whose date cannot be parsed
pub const UNDATED_PERIOD: &str = "undated";

pub fn totals(transactions: &[Transaction]) -> LedgerTotals {
    transactions
        .iter()
        .fold(LedgerTotals::default(), |mut acc, tx| {
            match tx.transaction_type {
                TransactionType::Income => acc.income += tx.amount,
                TransactionType::Expense => acc.expense += tx.amount,
            }
            acc
        })
}

/// Income minus expense
pub fn balance(transactions: &[Transaction]) -> f64 {
    let totals = totals(transactions);
    totals.income - totals.expense
}

/// Period key of a date string: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`
pub fn period_key(date: &str, granularity: Granularity) -> String {
    let Some(date) = parse_date(date) else {
        return UNDATED_PERIOD.to_string();
    };
    let pattern = match granularity {
        Granularity::Day => "%Y-%m-%d",
        Granularity::Month => "%Y-%m",
        Granularity::Year => "%Y",
    };
    date.format(pattern).to_string()
}

/// Income and expense sums per period, sorted by key. Every group carries
/// both sums, zero when the period has no entries of that type.
pub fn group_by_period(
    transactions: &[Transaction],
    granularity: Granularity,
) -> BTreeMap<String, PeriodTotals> {
    let mut groups: BTreeMap<String, PeriodTotals> = BTreeMap::new();
    for tx in transactions {
        let entry = groups
            .entry(period_key(&tx.date, granularity))
            .or_default();
        match tx.transaction_type {
            TransactionType::Income => entry.income += tx.amount,
            TransactionType::Expense => entry.expense += tx.amount,
        }
    }
    groups
}
