//! CSV-file backend: one `<table>.csv` per table inside a data directory.
//!
//! Replaces are written to a scratch file and renamed over the live file, so a
//! failed write leaves the last good contents in place.

pub mod connection;
pub mod record_store;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use record_store::CsvRecordStore;
