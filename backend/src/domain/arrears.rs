//! Dues arrears tracking.

use super::ids::unique_short_id;
use crate::errors::{DomainError, DomainResult};
use shared::{ArrearsRecord, ArrearsStatus};
use std::collections::HashSet;

/// Sum of amounts still owed
pub fn outstanding_total(records: &[ArrearsRecord]) -> f64 {
    records
        .iter()
        .filter(|record| record.status == ArrearsStatus::Unpaid)
        .map(|record| record.amount)
        .sum()
}

/// Case-insensitive match on the period label; blank text keeps everything
pub fn filter_by_period_substring(records: &[ArrearsRecord], text: &str) -> Vec<ArrearsRecord> {
    let needle = text.trim().to_lowercase();
    records
        .iter()
        .filter(|record| period_matches(record, &needle))
        .cloned()
        .collect()
}

fn period_matches(record: &ArrearsRecord, needle: &str) -> bool {
    needle.is_empty() || record.period.to_lowercase().contains(needle)
}

/// Build the new table from a reviewer's edited copy of a listing.
///
/// `period` is the filter the listing was made with. The edited set
/// replaces exactly the rows that filter matches, in order, at the position
/// of the first of them; rows outside the filter stay where they are. A
/// blank filter makes the edited set the whole table. Rows added during
/// review get fresh ids that collide with nothing already in use. An id
/// that appears twice in the result is rejected.
pub fn apply_bulk_edit(
    current: &[ArrearsRecord],
    edited: Vec<ArrearsRecord>,
    period: &str,
) -> DomainResult<Vec<ArrearsRecord>> {
    let needle = period.trim().to_lowercase();
    let kept: Vec<&ArrearsRecord> = current
        .iter()
        .filter(|record| !period_matches(record, &needle))
        .collect();

    let mut seen: HashSet<String> = kept.iter().map(|r| r.id.clone()).collect();
    for record in edited.iter().filter(|r| !r.id.trim().is_empty()) {
        if !seen.insert(record.id.trim().to_string()) {
            return Err(DomainError::Validation(format!(
                "arrears id '{}' appears more than once",
                record.id
            )));
        }
    }

    let mut taken: HashSet<String> = current.iter().map(|r| r.id.clone()).chain(seen).collect();
    let mut replacement: Vec<ArrearsRecord> = edited
        .into_iter()
        .map(|mut record| {
            record.id = record.id.trim().to_string();
            if record.id.is_empty() {
                record.id = unique_short_id(taken.iter().map(String::as_str));
                taken.insert(record.id.clone());
            }
            record
        })
        .collect();

    let mut records = Vec::with_capacity(kept.len() + replacement.len());
    for record in current {
        if !period_matches(record, &needle) {
            records.push(record.clone());
        } else if !replacement.is_empty() {
            records.append(&mut replacement);
        }
    }
    records.append(&mut replacement);
    Ok(records)
}


#[cfg(test)]
mod tests {
    use super::test_records::arrears;
    use super::*;
    use ArrearsStatus::{Paid, Unpaid};

    #[test]
    fn test_outstanding_total_scenario() {
        let records = vec![
            arrears("a", "January 2026", 50000.0, Unpaid),
            arrears("b", "January 2026", 30000.0, Paid),
            arrears("c", "February 2026", 20000.0, Unpaid),
        ];
        assert_eq!(outstanding_total(&records), 70000.0);
        assert_eq!(outstanding_total(&[]), 0.0);
    }

    #[test]
    fn test_period_filter_is_case_insensitive() {
        let records = vec![
            arrears("a", "January 2026", 1.0, Unpaid),
            arrears("b", "Februari 2026", 1.0, Unpaid),
            arrears("c", "january 2025", 1.0, Paid),
        ];
        let ids: Vec<String> = filter_by_period_substring(&records, "JANUARY")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(filter_by_period_substring(&records, "  ").len(), 3);
        assert!(filter_by_period_substring(&records, "maret").is_empty());
    }

    #[test]
    fn test_bulk_edit_replaces_as_given_and_assigns_ids() {
        let current = vec![arrears("a", "Jan", 10.0, Unpaid), arrears("b", "Jan", 20.0, Unpaid)];
        let mut paid = arrears("b", "Jan", 20.0, Paid);
        paid.resident_name = "Bu Rina".to_string();
        let added = arrears("", "Feb", 5.0, Unpaid);

        let records = apply_bulk_edit(&current, vec![paid.clone(), added], "").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], paid);
        assert_eq!(records[1].id.len(), 8);
        assert_ne!(records[1].id, "a");
        assert_eq!(outstanding_total(&records), 5.0);
    }

    #[test]
    fn test_bulk_edit_of_filtered_listing_keeps_hidden_rows() {
        let current = vec![
            arrears("a", "January 2026", 50000.0, Unpaid),
            arrears("c", "February 2026", 20000.0, Unpaid),
            arrears("b", "January 2026", 30000.0, Paid),
        ];
        let mut january = filter_by_period_substring(&current, "january");
        january[0].status = Paid;

        let records = apply_bulk_edit(&current, january, "January").unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(outstanding_total(&records), 20000.0);

        // Emptying the filtered view only clears what it showed
        let records = apply_bulk_edit(&current, Vec::new(), "january").unwrap();
        assert_eq!(records, vec![arrears("c", "February 2026", 20000.0, Unpaid)]);
    }

    #[test]
    fn test_bulk_edit_rejects_duplicate_ids() {
        let edited = vec![arrears("x", "Jan", 1.0, Paid), arrears("x", "Feb", 1.0, Paid)];
        assert!(matches!(
            apply_bulk_edit(&[], edited, ""),
            Err(DomainError::Validation(_))
        ));

        // An id outside the filter cannot be claimed by the edited set
        let current = vec![arrears("h", "March", 1.0, Unpaid)];
        assert!(matches!(
            apply_bulk_edit(&current, vec![arrears("h", "Jan", 1.0, Paid)], "jan"),
            Err(DomainError::Validation(_))
        ));
    }
}
