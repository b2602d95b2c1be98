//! # Storage Module
//!
//! Handles all data persistence for the bookkeeping core.
//!
//! The domain layer talks to a [`RecordStore`]: a deliberately small interface
//! over an external tabular backend (spreadsheet, CSV folder, ...) that offers
//! whole-table reads, single-row appends and whole-table replaces. Rows are
//! untyped string maps; [`TableRepository`] converts them to and from the
//! entity types of the `shared` crate, coercing malformed values on the way in.
//!
//! ## Implementations
//!
//! - **CSV** ([`csv::CsvRecordStore`]): one file per table in a data directory,
//!   atomic replace via temp file + rename, per-table version sidecar files.
//! - **Memory** ([`memory::MemoryRecordStore`]): for tests and throwaway setups,
//!   with switches to simulate an unreachable backend.
//!
//! ## Consistency
//!
//! Non-append mutations are read-modify-write cycles over the whole table.
//! Services pass the version they read back into `replace_all`, so a
//! concurrent writer surfaces as `StoreError::Conflict` instead of a lost
//! update. The cycle runs over an [`EditSnapshot`], which keeps the raw rows:
//! only fields that were actually changed are re-encoded, and every other
//! row goes back exactly as it was read.

pub mod csv;
pub mod memory;
pub mod records;
pub mod repository;
pub mod traits;

pub use self::csv::{CsvConnection, CsvRecordStore};
pub use memory::MemoryRecordStore;
pub use records::TableRecord;
pub use repository::{EditSnapshot, Snapshot, TableRepository};
pub use traits::{RecordStore, Row, Table, TableSnapshot, Version};
