//! In-memory [`RecordStore`] used by domain tests and ephemeral setups.
//!
//! Follows the same version rules as the CSV backend and can be switched into
//! a failing mode to exercise the `BackendUnavailable` paths.

use super::traits::{RecordStore, Row, Table, TableSnapshot, Version};
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryTable {
    rows: Vec<Row>,
    version: Version,
}

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: Mutex<HashMap<Table, MemoryTable>>,
    reads_unavailable: AtomicBool,
    writes_unavailable: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a lost connection for reads
    pub fn set_reads_unavailable(&self, unavailable: bool) {
        self.reads_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Simulate a lost connection for appends and replaces
    pub fn set_writes_unavailable(&self, unavailable: bool) {
        self.writes_unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, HashMap<Table, MemoryTable>>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.writes_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn read_all(&self, table: Table) -> StoreResult<TableSnapshot> {
        if self.reads_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store is offline"));
        }
        let tables = self.tables()?;
        Ok(match tables.get(&table) {
            Some(stored) => TableSnapshot {
                table,
                rows: stored.rows.clone(),
                version: stored.version,
            },
            None => TableSnapshot::empty(table),
        })
    }

    async fn append_one(&self, table: Table, row: Row) -> StoreResult<Version> {
        self.check_writable()?;
        let mut tables = self.tables()?;
        let stored = tables.entry(table).or_default();
        stored.rows.push(row);
        stored.version = stored.version.next();
        Ok(stored.version)
    }

    async fn replace_all(
        &self,
        table: Table,
        rows: Vec<Row>,
        expected: Option<Version>,
    ) -> StoreResult<Version> {
        self.check_writable()?;
        let mut tables = self.tables()?;
        let stored = tables.entry(table).or_default();
        if let Some(expected) = expected {
            if stored.version != expected {
                return Err(StoreError::Conflict {
                    table: table.to_string(),
                    expected,
                    found: stored.version,
                });
            }
        }
        stored.rows = rows;
        stored.version = stored.version.next();
        Ok(stored.version)
    }
}
