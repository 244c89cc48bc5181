//! Output module for run reporting
//!
//! Record files themselves are written by [`crate::storage`]; this module only
//! reports on a run once it finishes.

mod stats;

pub use stats::{print_statistics, FailureKind, RunStats, SkippedPage};
