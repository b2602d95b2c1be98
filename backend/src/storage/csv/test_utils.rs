/// Test utilities for the CSV backend
///
/// Provides an RAII environment whose temporary data directory is removed even
/// if the test panics.
use super::connection::CsvConnection;
use super::record_store::CsvRecordStore;
use crate::errors::StoreResult;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub store: Arc<CsvRecordStore>,
}

impl TestEnvironment {
    pub fn new() -> StoreResult<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path().join("kas-rt"))?;
        let store = Arc::new(CsvRecordStore::new(connection.clone()));

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            store,
        })
    }

    pub fn base_directory(&self) -> &Path {
        self.connection.base_directory()
    }
}
