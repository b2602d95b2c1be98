//! Error types shared by the storage and domain layers.

use crate::storage::Version;
use thiserror::Error;

/// Failures of a [`RecordStore`](crate::storage::RecordStore) backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached (connection, auth or missing data root).
    /// Reads degrade to empty results, writes must be reported as failed.
    #[error("backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// The table does not exist yet. Callers see this as an empty read.
    #[error("table '{table}' does not exist")]
    TableMissing { table: String },

    /// Another writer changed the table between our read and our write
    #[error("concurrent write on table '{table}': read at version {expected}, found {found}")]
    Conflict {
        table: String,
        expected: Version,
        found: Version,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::BackendUnavailable {
            reason: reason.into(),
        }
    }

    /// True for errors a read-only caller may swallow as "no data"
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            StoreError::BackendUnavailable { .. } | StoreError::TableMissing { .. }
        )
    }
}

/// Errors returned by domain services
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("lottery draw attempted with no participants")]
    NoParticipants,

    #[error("only admins may {action}")]
    Forbidden { action: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("username '{username}' is already registered")]
    UsernameTaken { username: String },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn forbidden(action: impl Into<String>) -> Self {
        DomainError::Forbidden {
            action: action.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type DomainResult<T> = std::result::Result<T, DomainError>;
