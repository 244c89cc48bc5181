//! Flat-file JSON storage implementation

use crate::storage::{ActionIndex, ActionRecord, RecordStore, StorageError, StorageResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the run index inside the output directory
///
/// Identifiers never contain `_`, so the index cannot collide with a record.
pub const INDEX_FILE_NAME: &str = "_index.json";

/// Writes each record to `<directory>/<identifier>.json`
#[derive(Debug, Clone)]
pub struct JsonStore {
    directory: PathBuf,
    pretty: bool,
}

impl JsonStore {
    /// Creates a store rooted at the given directory
    ///
    /// The directory is created by [`RecordStore::prepare`], not here.
    pub fn new(directory: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            directory: directory.into(),
            pretty,
        }
    }

    /// Path of the file holding the record with the given identifier
    pub fn record_path(&self, identifier: &str) -> StorageResult<PathBuf> {
        validate_identifier(identifier)?;
        Ok(self.directory.join(format!("{}.json", identifier)))
    }

    fn serialize<T: Serialize>(&self, value: &T) -> StorageResult<Vec<u8>> {
        let mut bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Writes bytes atomically (write to temp, then rename)
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self.directory.join(format!(".{}.tmp", file_name));

        std::fs::write(&tmp, bytes).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;

        std::fs::rename(&tmp, path).map_err(|source| {
            let _ = std::fs::remove_file(&tmp);
            StorageError::Write {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

impl RecordStore for JsonStore {
    fn prepare(&self) -> StorageResult<()> {
        std::fs::create_dir_all(&self.directory).map_err(|source| StorageError::Prepare {
            path: self.directory.clone(),
            source,
        })?;

        if !self.directory.is_dir() {
            return Err(StorageError::Prepare {
                path: self.directory.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "output path exists and is not a directory",
                ),
            });
        }

        Ok(())
    }

    fn write_record(&self, record: &ActionRecord) -> StorageResult<PathBuf> {
        let path = self.record_path(&record.identifier)?;
        let bytes = self.serialize(record)?;
        self.write_atomic(&path, &bytes)?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn write_index(&self, index: &ActionIndex) -> StorageResult<PathBuf> {
        let path = self.directory.join(INDEX_FILE_NAME);
        let bytes = self.serialize(index)?;
        self.write_atomic(&path, &bytes)?;
        Ok(path)
    }
}

/// Rejects identifiers that would escape the output directory or clash with the index
fn validate_identifier(identifier: &str) -> StorageResult<()> {
    let valid = !identifier.is_empty()
        && !identifier.starts_with('.')
        && !identifier.starts_with('_')
        && !identifier.contains(['/', '\\'])
        && !identifier.contains("..");

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidIdentifier(identifier.to_string()))
    }
}
