use super::connection::CsvConnection;
use crate::errors::{StoreError, StoreResult};
use crate::storage::traits::{RecordStore, Row, Table, TableSnapshot, Version};
use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// RecordStore backed by one CSV file per table
///
/// Every operation on a table holds that table's lock, so within this process
/// the version check of a conditional replace and the write itself cannot
/// interleave with another writer.
#[derive(Clone)]
pub struct CsvRecordStore {
    connection: CsvConnection,
    locks: Arc<HashMap<Table, Mutex<()>>>,
}

impl CsvRecordStore {
    pub fn new(connection: CsvConnection) -> Self {
        let locks = Table::ALL
            .iter()
            .map(|table| (*table, Mutex::new(())))
            .collect();
        Self {
            connection,
            locks: Arc::new(locks),
        }
    }

    pub fn connection(&self) -> &CsvConnection {
        &self.connection
    }

    fn lock(&self, table: Table) -> &Mutex<()> {
        // Built from Table::ALL, so every table has an entry
        &self.locks[&table]
    }

    fn read_version(&self, table: Table) -> StoreResult<Version> {
        match fs::read_to_string(self.connection.version_path(table)) {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(value) => Ok(Version(value)),
                Err(_) => {
                    warn!(table = %table, "unreadable version file, assuming version 0");
                    Ok(Version::default())
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Version::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_version(&self, table: Table, version: Version) -> StoreResult<()> {
        fs::write(self.connection.version_path(table), version.to_string())?;
        Ok(())
    }

    /// Header of an existing table file, `None` when the file is absent or empty
    fn read_header(&self, table: Table) -> StoreResult<Option<StringRecord>> {
        let path = self.connection.table_path(table);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));
        let header = reader.headers()?.clone();
        Ok(if header.is_empty() { None } else { Some(header) })
    }

    fn read_rows(&self, table: Table) -> StoreResult<Vec<Row>> {
        let path = self.connection.table_path(table);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::TableMissing {
                    table: table.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));
        let header = reader.headers()?.clone();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            // Short rows are padded with empty fields
            let row: Row = header
                .iter()
                .enumerate()
                .map(|(index, name)| (name, record.get(index).unwrap_or("")))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }

    /// Canonical columns first, then any extra columns found in the rows
    fn header_for(table: Table, rows: &[Row]) -> Vec<String> {
        let mut header: Vec<String> = table.columns().iter().map(|c| c.to_string()).collect();
        for row in rows {
            for (name, _) in row.fields() {
                if !header.iter().any(|existing| existing == name) {
                    header.push(name.to_string());
                }
            }
        }
        header
    }

    fn write_temp(&self, table: Table, rows: &[Row]) -> StoreResult<()> {
        let temp_path = self.connection.temp_path(table);
        let header = Self::header_for(table, rows);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut csv_writer = WriterBuilder::new().from_writer(BufWriter::new(file));
        csv_writer.write_record(&header)?;
        for row in rows {
            csv_writer.write_record(header.iter().map(|column| row.text(column)))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the rows to the temp file, bump the version sidecar, then move
    /// the temp file over the table. The sidecar is never behind the data:
    /// if the move fails the previous version is put back.
    fn write_table(&self, table: Table, rows: &[Row], current: Version) -> StoreResult<Version> {
        let temp_path = self.connection.temp_path(table);
        let version = current.next();

        if let Err(e) = self
            .write_temp(table, rows)
            .and_then(|()| self.write_version(table, version))
        {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        // Atomic move from temp to final file
        if let Err(e) = fs::rename(&temp_path, self.connection.table_path(table)) {
            let _ = fs::remove_file(&temp_path);
            if let Err(restore) = self.write_version(table, current) {
                error!(table = %table, error = %restore, "could not restore version after failed replace");
            }
            return Err(e.into());
        }
        Ok(version)
    }

    fn append_row(&self, table: Table, row: &Row) -> StoreResult<()> {
        let existing_header = self.read_header(table)?;
        let (header, write_header): (Vec<String>, bool) = match existing_header {
            Some(header) => (header.iter().map(str::to_string).collect(), false),
            None => (Self::header_for(table, std::slice::from_ref(row)), true),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.connection.table_path(table))?;
        if write_header {
            // A zero-length file may exist; start it over with a header
            file.set_len(0)?;
        }
        let mut csv_writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        if write_header {
            csv_writer.write_record(&header)?;
        }
        csv_writer.write_record(header.iter().map(|column| row.text(column)))?;
        csv_writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    fn backend_name(&self) -> &'static str {
        "csv"
    }

    #[instrument(skip(self))]
    async fn read_all(&self, table: Table) -> StoreResult<TableSnapshot> {
        let _guard = self.lock(table).lock().await;
        self.connection.ensure_available()?;

        let version = self.read_version(table)?;
        match self.read_rows(table) {
            Ok(rows) => Ok(TableSnapshot {
                table,
                rows,
                version,
            }),
            Err(StoreError::TableMissing { .. }) => {
                debug!("table file missing, reading as empty");
                Ok(TableSnapshot {
                    table,
                    rows: Vec::new(),
                    version,
                })
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, row))]
    async fn append_one(&self, table: Table, row: Row) -> StoreResult<Version> {
        let _guard = self.lock(table).lock().await;
        self.connection.ensure_available()?;

        let current = self.read_version(table)?;
        let version = current.next();
        // Version first: a failed sidecar write leaves the table untouched
        self.write_version(table, version)?;
        if let Err(e) = self.append_row(table, &row) {
            if let Err(restore) = self.write_version(table, current) {
                error!(table = %table, error = %restore, "could not restore version after failed append");
            }
            return Err(e);
        }
        info!(version = %version, "appended row");
        Ok(version)
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn replace_all(
        &self,
        table: Table,
        rows: Vec<Row>,
        expected: Option<Version>,
    ) -> StoreResult<Version> {
        let _guard = self.lock(table).lock().await;
        self.connection.ensure_available()?;

        let current = self.read_version(table)?;
        if let Some(expected) = expected {
            if expected != current {
                warn!(expected = %expected, found = %current, "rejecting stale replace");
                return Err(StoreError::Conflict {
                    table: table.to_string(),
                    expected,
                    found: current,
                });
            }
        }

        let version = self.write_table(table, &rows, current)?;
        info!(version = %version, "replaced table");
        Ok(version)
    }
}
