//! # Citas - appointment records manager
//!
//! Keeps appointment records (client, service, date, time, status) in a
//! local SQLite file.
//!
//! Citas provides:
//! - A Record Store owning the single database connection
//! - Raw parameterized `execute` plus typed CRUD and substring search
//! - A named-field appointment model shared with the CLI shell

pub mod appointment;
pub mod config;
pub mod output;
pub mod storage;
pub mod ui;

use std::path::PathBuf;

// Re-exports for convenient access
pub use appointment::{Appointment, AppointmentFields, FieldChanges, Service, Status};
pub use storage::{RecordStore, Row, StoreState, Value};

/// Result type alias for Citas operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Citas operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Record store is not initialized")]
    NotInitialized,

    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}
