use crate::errors::{StoreError, StoreResult};
use crate::storage::traits::Table;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// CsvConnection owns the data directory and knows where each table lives
///
/// Layout:
/// ```text
/// <data_dir>/transaksi.csv        table contents, header first
/// <data_dir>/.transaksi.version   decimal write counter
/// ```
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> StoreResult<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            info!("Creating data directory: {}", base_path.display());
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Fails with `BackendUnavailable` when the data directory has gone away
    /// (unmounted share, deleted folder) since the connection was opened.
    pub fn ensure_available(&self) -> StoreResult<()> {
        if self.base_directory.is_dir() {
            Ok(())
        } else {
            Err(StoreError::unavailable(format!(
                "data directory {} is not reachable",
                self.base_directory.display()
            )))
        }
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.base_directory.join(format!("{}.csv", table.as_str()))
    }

    /// Scratch file for atomic replace: written fully, then renamed over the table
    pub fn temp_path(&self, table: Table) -> PathBuf {
        self.base_directory.join(format!("{}.csv.tmp", table.as_str()))
    }

    pub fn version_path(&self, table: Table) -> PathBuf {
        self.base_directory
            .join(format!(".{}.version", table.as_str()))
    }
}
