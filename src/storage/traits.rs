//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and
//! associated error types.

use crate::storage::{ActionIndex, ActionRecord};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Every storage error is fatal for a run: without a working sink there is
/// nothing useful left to do.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot prepare output directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record sink implementations
pub trait RecordStore {
    /// Creates the output location if needed
    ///
    /// Called once before any listing page is fetched so an unwritable sink
    /// fails the run early.
    fn prepare(&self) -> StorageResult<()>;

    /// Writes one record, replacing any previous file with the same identifier
    ///
    /// # Returns
    ///
    /// The path of the written file
    fn write_record(&self, record: &ActionRecord) -> StorageResult<PathBuf>;

    /// Writes the run index
    fn write_index(&self, index: &ActionIndex) -> StorageResult<PathBuf>;
}
