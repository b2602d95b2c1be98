//! Cash ledger service.
//!
//! Recording is a pure append. Edits and deletes are read-modify-write
//! cycles that pass the version they read back to the store, so a concurrent
//! writer turns into a `Conflict` instead of a lost update.

use super::ids::unique_short_id;
use super::ledger::{balance, group_by_period, totals};
use super::report_filter::DateFilter;
use super::session::SessionContext;
use super::validation::{normalize_date, require_amount, require_text};
use crate::errors::{DomainError, DomainResult};
use crate::storage::records::NO_ATTACHMENT;
use crate::storage::{RecordStore, TableRepository};
use chrono::{DateTime, Utc};
use shared::{
    CreateTransactionRequest, Granularity, LedgerSummaryResponse, LedgerTotals, Transaction,
    UpdateTransactionRequest,
};
use std::sync::Arc;
use tracing::info;

/// Point-in-time copy of the ledger handed to report collaborators.
/// Later edits to the table do not change a report once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReport {
    pub transactions: Vec<Transaction>,
    pub totals: LedgerTotals,
    pub balance: f64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct LedgerService {
    transactions: TableRepository<Transaction>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            transactions: TableRepository::new(store),
        }
    }

    /// Transactions in table order, narrowed by the date filter
    pub async fn list(&self, filter: &DateFilter) -> DomainResult<Vec<Transaction>> {
        let transactions = self.transactions.list().await?;
        Ok(filter.apply(transactions, |tx: &Transaction| tx.date.as_str()))
    }

    pub async fn record(
        &self,
        ctx: &SessionContext,
        request: CreateTransactionRequest,
    ) -> DomainResult<Transaction> {
        ctx.require_admin("record transactions")?;
        let amount = require_amount("amount", request.amount)?;
        let category = require_text("category", &request.category)?;
        let date = normalize_date("date", request.date.as_deref())?;

        let existing = self.transactions.list().await?;
        let transaction = Transaction {
            id: unique_short_id(existing.iter().map(|tx| tx.id.as_str())),
            date,
            transaction_type: request.transaction_type,
            category,
            amount,
            note: request.note.trim().to_string(),
            entered_by: ctx.username.clone(),
            attachment_ref: attachment_or_placeholder(request.attachment_ref.as_deref()),
        };

        self.transactions.append(&transaction).await?;
        info!(
            id = %transaction.id,
            kind = %transaction.transaction_type,
            amount = transaction.amount,
            by = %ctx.username,
            "recorded transaction"
        );
        Ok(transaction)
    }

    /// Edit one transaction in place; absent fields keep their value
    pub async fn edit(
        &self,
        ctx: &SessionContext,
        id: &str,
        update: UpdateTransactionRequest,
    ) -> DomainResult<Transaction> {
        ctx.require_admin("edit transactions")?;
        let base = self.transactions.edit_snapshot().await?;
        let mut records = base.records.clone();
        let target = records
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "transaction",
                id: id.to_string(),
            })?;

        if let Some(date) = update.date.as_deref() {
            target.date = normalize_date("date", Some(date))?;
        }
        if let Some(kind) = update.transaction_type {
            target.transaction_type = kind;
        }
        if let Some(category) = update.category.as_deref() {
            target.category = require_text("category", category)?;
        }
        if let Some(amount) = update.amount {
            target.amount = require_amount("amount", amount)?;
        }
        if let Some(note) = update.note {
            target.note = note.trim().to_string();
        }
        if let Some(attachment) = update.attachment_ref.as_deref() {
            target.attachment_ref = attachment_or_placeholder(Some(attachment));
        }
        let edited = target.clone();

        self.transactions.save_edits(&base, &records).await?;
        info!(id, by = %ctx.username, "edited transaction");
        Ok(edited)
    }

    pub async fn delete(&self, ctx: &SessionContext, id: &str) -> DomainResult<usize> {
        ctx.require_admin("delete transactions")?;
        let removed = self.transactions.delete_by_key(id).await?;
        if removed == 0 {
            return Err(DomainError::NotFound {
                entity: "transaction",
                id: id.to_string(),
            });
        }
        info!(id, by = %ctx.username, "deleted transaction");
        Ok(removed)
    }

    /// Dashboard figures. An unreachable backend reads as an empty ledger.
    pub async fn summary(&self, granularity: Granularity) -> DomainResult<LedgerSummaryResponse> {
        let transactions = self.transactions.list_or_empty().await?;
        let totals = totals(&transactions);
        Ok(LedgerSummaryResponse {
            balance: totals.income - totals.expense,
            totals,
            granularity,
            periods: group_by_period(&transactions, granularity),
        })
    }

    pub async fn report(&self, filter: &DateFilter) -> DomainResult<LedgerReport> {
        let transactions = self.list(filter).await?;
        Ok(LedgerReport {
            totals: totals(&transactions),
            balance: balance(&transactions),
            transactions,
            generated_at: Utc::now(),
        })
    }
}

fn attachment_or_placeholder(attachment: Option<&str>) -> String {
    match attachment.map(str::trim).filter(|a| !a.is_empty()) {
        Some(reference) => reference.to_string(),
        None => NO_ATTACHMENT.to_string(),
    }
}
