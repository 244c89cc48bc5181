//! Storage module for persisting scraped actions
//!
//! Records are written as flat JSON files, one per action:
//!
//! ```text
//! presidential_actions/
//! ├── _index.json                  # Run index (optional)
//! ├── some-executive-order.json
//! └── another-proclamation.json
//! ```

mod json;
mod traits;

pub use json::{JsonStore, INDEX_FILE_NAME};
pub use traits::{RecordStore, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scraped presidential action
///
/// A record exists only once its detail page parsed successfully, so it is
/// always complete when it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Stable identifier, also the file stem
    pub identifier: String,

    /// Primary heading of the detail page
    pub title: String,

    /// Publication date as printed on the page (empty if absent)
    pub date: String,

    /// Category/type label (empty if absent)
    pub category: String,

    /// Plain-text body, paragraphs separated by a blank line
    pub body: String,

    /// URL the record was scraped from
    pub source_url: String,
}

/// Summary line for one record in the run index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub identifier: String,
    pub title: String,
    pub date: String,
    pub source_url: String,
}

impl From<&ActionRecord> for IndexEntry {
    fn from(record: &ActionRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            title: record.title.clone(),
            date: record.date.clone(),
            source_url: record.source_url.clone(),
        }
    }
}

/// Index of every record written during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionIndex {
    /// Number of records written
    pub total_actions: usize,

    /// When the run finished collecting
    pub collected_at: DateTime<Utc>,

    /// One entry per written record, in write order
    pub actions: Vec<IndexEntry>,
}

impl ActionIndex {
    pub fn new(actions: Vec<IndexEntry>) -> Self {
        Self {
            total_actions: actions.len(),
            collected_at: Utc::now(),
            actions,
        }
    }
}
