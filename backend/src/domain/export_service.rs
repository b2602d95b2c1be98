//! CSV rendering for report and export collaborators.
//!
//! Rows are written in the table's wire column order so an export can be
//! loaded back as a table file. The ledger export appends the totals of the
//! report snapshot it was built from.

use super::ledger_service::LedgerReport;
use crate::errors::{DomainError, DomainResult};
use crate::storage::records::format_amount;
use crate::storage::TableRecord;
use chrono::{DateTime, Utc};
use shared::Transaction;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Any typed table as CSV, header first
    pub fn records_csv<R: TableRecord>(&self, records: &[R]) -> DomainResult<String> {
        let columns = R::TABLE.columns();
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(columns).map_err(export_error)?;
        for record in records {
            let row = record.to_row();
            writer
                .write_record(columns.iter().map(|column| row.text(column)))
                .map_err(export_error)?;
        }
        let csv = finish(writer)?;
        info!(table = %R::TABLE, rows = records.len(), "exported CSV");
        Ok(csv)
    }

    /// Ledger report as CSV followed by summary lines for income, expense
    /// and balance
    pub fn ledger_csv(&self, report: &LedgerReport) -> DomainResult<String> {
        let columns = <Transaction as TableRecord>::TABLE.columns();
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(columns).map_err(export_error)?;
        for tx in &report.transactions {
            let row = tx.to_row();
            writer
                .write_record(columns.iter().map(|column| row.text(column)))
                .map_err(export_error)?;
        }

        let padding = columns.len().saturating_sub(2);
        let summary = [
            ("Total Income", report.totals.income),
            ("Total Expense", report.totals.expense),
            ("Balance", report.balance),
        ];
        for (label, value) in summary {
            let mut line = vec![label.to_string(), format_amount(value)];
            line.extend(std::iter::repeat(String::new()).take(padding));
            writer.write_record(&line).map_err(export_error)?;
        }

        let csv = finish(writer)?;
        info!(
            rows = report.transactions.len(),
            generated_at = %report.generated_at,
            "exported ledger report"
        );
        Ok(csv)
    }

    /// `kas-rt_<name>_<YYYYMMDD-HHMMSS>.csv`
    pub fn filename(&self, name: &str, generated_at: DateTime<Utc>) -> String {
        format!("kas-rt_{}_{}.csv", name, generated_at.format("%Y%m%d-%H%M%S"))
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> DomainResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Export(e.to_string()))
}

fn export_error(e: csv::Error) -> DomainError {
    DomainError::Export(e.to_string())
}
