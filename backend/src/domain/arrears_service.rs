//! Dues arrears service: list, add, bulk edit and delete.

use super::arrears::{apply_bulk_edit, filter_by_period_substring, outstanding_total};
use super::ids::unique_short_id;
use super::session::SessionContext;
use super::validation::{require_amount, require_text};
use crate::errors::{DomainError, DomainResult};
use crate::storage::{RecordStore, Snapshot, TableRepository, Version};
use shared::{ArrearsRecord, ArrearsStatus, CreateArrearsRequest};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ArrearsService {
    arrears: TableRepository<ArrearsRecord>,
}

impl ArrearsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            arrears: TableRepository::new(store),
        }
    }

    /// Records matching the period text, with the version of the table they
    /// were read from. Hand both the version and the period text back to
    /// [`bulk_edit`](Self::bulk_edit).
    pub async fn list(&self, period: Option<&str>) -> DomainResult<Snapshot<ArrearsRecord>> {
        let snapshot = self.arrears.snapshot().await?;
        Ok(Snapshot {
            records: filter_by_period_substring(&snapshot.records, period.unwrap_or_default()),
            version: snapshot.version,
        })
    }

    pub async fn outstanding(&self) -> DomainResult<f64> {
        Ok(outstanding_total(&self.arrears.list().await?))
    }

    pub async fn add(
        &self,
        ctx: &SessionContext,
        request: CreateArrearsRequest,
    ) -> DomainResult<ArrearsRecord> {
        ctx.require_admin("add arrears records")?;
        let resident_name = require_text("resident_name", &request.resident_name)?;
        let period = require_text("period", &request.period)?;
        let amount = require_amount("amount", request.amount)?;

        let existing = self.arrears.list().await?;
        let record = ArrearsRecord {
            id: unique_short_id(existing.iter().map(|r| r.id.as_str())),
            resident_name,
            period,
            amount,
            status: request.status.unwrap_or(ArrearsStatus::Unpaid),
        };
        self.arrears.append(&record).await?;
        info!(id = %record.id, resident = %record.resident_name, "added arrears record");
        Ok(record)
    }

    /// Save a reviewed copy of a listing.
    ///
    /// `period` is the filter the listing was made with; only the rows it
    /// matches are replaced and every other row is written back as stored.
    /// `based_on` is the version the listing was read at. When it is given
    /// and the table moved on since, the edit fails with `Conflict`. Without
    /// it the edit is checked against the version read here, which only
    /// guards the window between this read and the write.
    pub async fn bulk_edit(
        &self,
        ctx: &SessionContext,
        edited: Vec<ArrearsRecord>,
        based_on: Option<Version>,
        period: Option<&str>,
    ) -> DomainResult<(Version, f64)> {
        ctx.require_admin("edit arrears")?;
        for record in &edited {
            require_amount("amount", record.amount)?;
        }

        let base = self.arrears.edit_snapshot().await?;
        base.check_base(based_on)?;
        if based_on.is_none() {
            warn!(version = %base.version, "bulk edit without a base version");
        }

        let records = apply_bulk_edit(&base.records, edited, period.unwrap_or_default())?;
        let version = self.arrears.save_edits(&base, &records).await?;
        info!(
            rows = records.len(),
            version = %version,
            by = %ctx.username,
            "arrears table replaced"
        );
        Ok((version, outstanding_total(&records)))
    }

    pub async fn delete(&self, ctx: &SessionContext, id: &str) -> DomainResult<usize> {
        ctx.require_admin("delete arrears records")?;
        let removed = self.arrears.delete_by_key(id).await?;
        if removed == 0 {
            return Err(DomainError::NotFound {
                entity: "arrears record",
                id: id.to_string(),
            });
        }
        info!(id, by = %ctx.username, "deleted arrears record");
        Ok(removed)
    }
}
