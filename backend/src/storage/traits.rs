//! # Storage Traits
//!
//! This module defines the record-store abstraction the domain layer is
//! written against. A backend only has to offer four primitives over named
//! tables of string rows: read everything, append one row, replace everything
//! and (derived from the first and third) delete by key.
//!
//! ## Consistency
//!
//! Backends are not expected to lock rows. Every mutation other than an append
//! is a read-whole-table, modify-in-memory, write-whole-table cycle. Each table
//! carries a monotonic [`Version`]; passing the version observed at read time to
//! [`RecordStore::replace_all`] turns a silent lost update into
//! [`StoreError::Conflict`](crate::errors::StoreError::Conflict).

use crate::errors::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The tables of the association workbook, with their wire names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Users,
    Categories,
    Transactions,
    Arrears,
    LotteryParticipants,
    LotteryPayments,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Users,
        Table::Categories,
        Table::Transactions,
        Table::Arrears,
        Table::LotteryParticipants,
        Table::LotteryPayments,
    ];

    /// Name of the table in the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Categories => "kategori",
            Table::Transactions => "transaksi",
            Table::Arrears => "tunggakan",
            Table::LotteryParticipants => "arisan_peserta",
            Table::LotteryPayments => "arisan_bayar",
        }
    }

    /// Column order of the table. This order is the wire contract with the
    /// report and export collaborators.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => &["username", "passwordHash", "role", "displayName"],
            Table::Categories => &["id", "name", "type"],
            Table::Transactions => &[
                "id",
                "date",
                "type",
                "category",
                "amount",
                "note",
                "enteredBy",
                "attachmentRef",
            ],
            Table::Arrears => &["id", "residentName", "period", "amount", "status"],
            Table::LotteryParticipants => &["id", "residentName", "hasWon"],
            Table::LotteryPayments => &[
                "id",
                "residentName",
                "period",
                "amount",
                "status",
                "paidDate",
            ],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic per-table write counter. A table that was never written is at version 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Version(pub u64);

impl Version {
    pub fn next(self) -> Version {
        Version(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One untyped row: an ordered mapping of field name to string value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used when encoding records
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field, keeping its position if it already exists
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Field value, or the empty string when the field is absent
    pub fn text(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (field, value) in iter {
            row.set(&field.into(), value);
        }
        row
    }
}

/// Full contents of a table together with the version they were read at
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub table: Table,
    pub rows: Vec<Row>,
    pub version: Version,
}

impl TableSnapshot {
    pub fn empty(table: Table) -> Self {
        Self {
            table,
            rows: Vec::new(),
            version: Version::default(),
        }
    }
}

/// Interface over an external, weakly-typed tabular backend
///
/// Implementations must be safe to share between request handlers. Within a
/// single caller, a completed write is visible to that caller's next read.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend label for logs
    fn backend_name(&self) -> &'static str;

    /// Read every row of `table`. A table that does not exist reads as empty.
    async fn read_all(&self, table: Table) -> StoreResult<TableSnapshot>;

    /// Append exactly one row at the end of `table`, creating it if needed
    async fn append_one(&self, table: Table, row: Row) -> StoreResult<Version>;

    /// Overwrite the whole table (header + rows) with `rows`, in order
    ///
    /// With `expected = Some(v)` the write fails with `Conflict` unless the
    /// table is still at version `v`. With `None` the last writer wins.
    async fn replace_all(
        &self,
        table: Table,
        rows: Vec<Row>,
        expected: Option<Version>,
    ) -> StoreResult<Version>;

    /// Remove every row whose `key_field` equals `key_value`
    ///
    /// Built on `read_all` + `replace_all`; the replace is conditioned on the
    /// version that was read. Returns the number of rows removed.
    async fn delete_by_key(
        &self,
        table: Table,
        key_field: &str,
        key_value: &str,
    ) -> StoreResult<usize> {
        let snapshot = self.read_all(table).await?;
        let before = snapshot.rows.len();
        let kept: Vec<Row> = snapshot
            .rows
            .into_iter()
            .filter(|row| row.get(key_field) != Some(key_value))
            .collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }
        self.replace_all(table, kept, Some(snapshot.version)).await?;
        Ok(removed)
    }
}
