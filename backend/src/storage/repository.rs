//! Typed repository over a [`RecordStore`] table.

use super::records::TableRecord;
use super::traits::{RecordStore, Row, Version};
use crate::errors::{StoreError, StoreResult};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed rows of a table together with the version they were read at
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<R> {
    pub records: Vec<R>,
    pub version: Version,
}

/// Typed rows plus the raw rows they were decoded from, for
/// read-modify-write cycles that must not disturb untouched rows
#[derive(Debug, Clone)]
pub struct EditSnapshot<R> {
    pub records: Vec<R>,
    pub version: Version,
    rows: Vec<Row>,
}

impl<R: TableRecord> EditSnapshot<R> {
    /// Fail with `Conflict` when the caller worked from another version
    pub fn check_base(&self, based_on: Option<Version>) -> StoreResult<()> {
        match based_on {
            Some(expected) if expected != self.version => {
                warn!(table = %R::TABLE, expected = %expected, found = %self.version, "stale base version");
                Err(StoreError::Conflict {
                    table: R::TABLE.to_string(),
                    expected,
                    found: self.version,
                })
            }
            _ => Ok(()),
        }
    }

    /// Rows to write for `updated`, matched to the stored rows by key.
    ///
    /// A matched row keeps every stored field except those whose encoded
    /// value actually changed, so coerced values and unknown columns are
    /// written back as they were read. Unmatched records are encoded fresh;
    /// stored rows with no counterpart in `updated` are dropped.
    fn merged_rows(&self, updated: &[R]) -> Vec<Row> {
        let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, record) in self.records.iter().enumerate().rev() {
            by_key.entry(record.key()).or_default().push(index);
        }

        updated
            .iter()
            .map(|record| {
                let stored = by_key
                    .get_mut(record.key())
                    .and_then(|indices| indices.pop());
                match stored {
                    Some(index) => {
                        let before = self.records[index].to_row();
                        let mut row = self.rows[index].clone();
                        for (field, value) in record.to_row().fields() {
                            if before.get(field) != Some(value) {
                                row.set(field, value);
                            }
                        }
                        row
                    }
                    None => record.to_row(),
                }
            })
            .collect()
    }
}

/// Repository for one entity type, backed by any [`RecordStore`]
pub struct TableRepository<R: TableRecord> {
    store: Arc<dyn RecordStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R: TableRecord> Clone for TableRepository<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<R: TableRecord> TableRepository<R> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn snapshot(&self) -> StoreResult<Snapshot<R>> {
        let snapshot = self.store.read_all(R::TABLE).await?;
        debug!(
            table = %R::TABLE,
            rows = snapshot.rows.len(),
            version = %snapshot.version,
            "read table"
        );
        Ok(Snapshot {
            records: snapshot.rows.iter().map(R::from_row).collect(),
            version: snapshot.version,
        })
    }

    pub async fn edit_snapshot(&self) -> StoreResult<EditSnapshot<R>> {
        let snapshot = self.store.read_all(R::TABLE).await?;
        Ok(EditSnapshot {
            records: snapshot.rows.iter().map(R::from_row).collect(),
            version: snapshot.version,
            rows: snapshot.rows,
        })
    }

    /// Write `updated` as the new table contents, conditioned on the version
    /// `base` was read at. Only fields that changed are re-encoded.
    pub async fn save_edits(&self, base: &EditSnapshot<R>, updated: &[R]) -> StoreResult<Version> {
        let rows = base.merged_rows(updated);
        self.store.replace_all(R::TABLE, rows, Some(base.version)).await
    }

    pub async fn list(&self) -> StoreResult<Vec<R>> {
        Ok(self.snapshot().await?.records)
    }

    /// Like [`list`](Self::list), but a backend that cannot be reached reads
    /// as an empty table. For read-only collaborators that tolerate absence.
    /// Corrupt data is still reported.
    pub async fn list_or_empty(&self) -> StoreResult<Vec<R>> {
        match self.list().await {
            Ok(records) => Ok(records),
            Err(e) if e.is_degradable() => {
                warn!(table = %R::TABLE, error = %e, "read degraded to empty result");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn find(&self, key: &str) -> StoreResult<Option<R>> {
        Ok(self.list().await?.into_iter().find(|record| record.key() == key))
    }

    pub async fn append(&self, record: &R) -> StoreResult<Version> {
        self.store.append_one(R::TABLE, record.to_row()).await
    }

    pub async fn replace_all(&self, records: &[R], expected: Option<Version>) -> StoreResult<Version> {
        let rows = records.iter().map(TableRecord::to_row).collect();
        self.store.replace_all(R::TABLE, rows, expected).await
    }

    /// Delete by the record's key field; returns the number of rows removed
    pub async fn delete_by_key(&self, key: &str) -> StoreResult<usize> {
        self.store.delete_by_key(R::TABLE, R::KEY_FIELD, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryRecordStore, Table};
    use shared::Transaction;

    fn raw(id: &str, kind: &str, amount: &str) -> Row {
        Row::new()
            .with("id", id)
            .with("date", "2026-01-05")
            .with("type", kind)
            .with("category", "Iuran")
            .with("amount", amount)
            .with("note", "")
    }

    async fn setup_test(rows: Vec<Row>) -> (Arc<MemoryRecordStore>, TableRepository<Transaction>) {
        let store = Arc::new(MemoryRecordStore::new());
        for row in rows {
            store.append_one(Table::Transactions, row).await.unwrap();
        }
        let repository = TableRepository::new(store.clone() as Arc<dyn RecordStore>);
        (store, repository)
    }

    #[tokio::test]
    async fn test_save_edits_only_touches_changed_fields() {
        let messy = raw("t1", "Pemasukan", "1.500.000").with("receiptNo", "R-77");
        let (store, repository) = setup_test(vec![messy.clone(), raw("t2", "Income", "5000")]).await;

        let base = repository.edit_snapshot().await.unwrap();
        let mut updated = base.records.clone();
        updated[0].note = "checked".to_string();
        updated[1].note = "checked".to_string();
        repository.save_edits(&base, &updated).await.unwrap();

        let rows = store.read_all(Table::Transactions).await.unwrap().rows;
        assert_eq!(rows[0], messy.clone().with("note", "checked"));
        assert_eq!(rows[0].text("amount"), "1.500.000");
        assert_eq!(rows[0].text("receiptNo"), "R-77");
        assert_eq!(rows[1].text("note"), "checked");
    }

    #[tokio::test]
    async fn test_save_edits_passes_unchanged_rows_through() {
        let messy = raw("t2", "Pemasukan", "1.500.000").with("receiptNo", "R-77");
        let (store, repository) = setup_test(vec![raw("t1", "Income", "5000"), messy.clone()]).await;

        let base = repository.edit_snapshot().await.unwrap();
        let updated = base.records.clone();
        let version = repository.save_edits(&base, &updated).await.unwrap();

        let after = store.read_all(Table::Transactions).await.unwrap();
        assert_eq!(after.version, version);
        assert_eq!(after.rows[1], messy);
    }

    #[tokio::test]
    async fn test_save_edits_drops_and_appends_by_key() {
        let (store, repository) =
            setup_test(vec![raw("t1", "Income", "5000"), raw("t2", "Expense", "700")]).await;

        let base = repository.edit_snapshot().await.unwrap();
        let mut fresh = base.records[0].clone();
        fresh.id = "t3".to_string();
        let updated = vec![base.records[1].clone(), fresh];
        repository.save_edits(&base, &updated).await.unwrap();

        let rows = store.read_all(Table::Transactions).await.unwrap().rows;
        let ids: Vec<&str> = rows.iter().map(|row| row.text("id")).collect();
        assert_eq!(ids, vec!["t2", "t3"]);
        assert_eq!(rows[0], raw("t2", "Expense", "700"));
    }

    #[tokio::test]
    async fn test_save_edits_rejects_stale_base() {
        let (store, repository) = setup_test(vec![raw("t1", "Income", "5000")]).await;

        let base = repository.edit_snapshot().await.unwrap();
        store
            .append_one(Table::Transactions, raw("t2", "Income", "100"))
            .await
            .unwrap();

        let result = repository.save_edits(&base, &base.records).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
        assert!(base.check_base(Some(Version(0))).is_err());
        assert!(base.check_base(Some(base.version)).is_ok());
        assert!(base.check_base(None).is_ok());
    }
}
