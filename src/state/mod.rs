//! State module for tracking scrape progress
//!
//! # Components
//!
//! - `RunPhase`: the coordinator's current phase (listing, fetching, parsing, writing, done)

mod run_phase;

pub use run_phase::RunPhase;
