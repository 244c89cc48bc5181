//! Run statistics
//!
//! Counters collected by the coordinator during one run and the end-of-run
//! report printed by the CLI.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Why a detail page was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Fetch,
    Parse,
}

/// A detail page that produced no record
#[derive(Debug, Clone)]
pub struct SkippedPage {
    /// The URL that failed
    pub url: String,

    /// Which stage failed
    pub kind: FailureKind,

    /// Error message
    pub message: String,
}

/// Statistics for one scrape run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration, set when the run finishes
    pub elapsed: Option<Duration>,

    /// Listing pages fetched and parsed successfully
    pub listing_pages: u32,

    /// Detail links found across all listing pages, before de-duplication
    pub links_found: usize,

    /// Links dropped because their URL was already queued
    pub duplicates: usize,

    /// Identifiers that collided and were made unique
    pub renamed: usize,

    /// Unique detail pages queued for fetching
    pub detail_targets: usize,

    /// Records written to storage
    pub written: usize,

    /// Detail pages skipped, with the reason
    pub skipped: Vec<SkippedPage>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            elapsed: None,
            listing_pages: 0,
            links_found: 0,
            duplicates: 0,
            renamed: 0,
            detail_targets: 0,
            written: 0,
            skipped: Vec::new(),
        }
    }
}

impl RunStats {
    /// Records a skipped detail page
    pub fn record_skip(&mut self, url: &str, kind: FailureKind, message: impl Into<String>) {
        self.skipped.push(SkippedPage {
            url: url.to_string(),
            kind,
            message: message.into(),
        });
    }

    /// Number of detail pages that failed to fetch
    pub fn fetch_failures(&self) -> usize {
        self.count(FailureKind::Fetch)
    }

    /// Number of detail pages that failed to parse
    pub fn parse_failures(&self) -> usize {
        self.count(FailureKind::Parse)
    }

    fn count(&self, kind: FailureKind) -> usize {
        self.skipped.iter().filter(|s| s.kind == kind).count()
    }

    /// Share of detail targets that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        if self.detail_targets == 0 {
            0.0
        } else {
            (self.written as f64 / self.detail_targets as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStats) {
    println!("=== Scrape Statistics ===\n");

    println!("Overview:");
    println!("  Started at: {}", stats.started_at.to_rfc3339());
    if let Some(elapsed) = stats.elapsed {
        println!("  Duration: {:.1}s", elapsed.as_secs_f64());
    }
    println!("  Listing pages: {}", stats.listing_pages);
    println!("  Links found: {}", stats.links_found);
    println!("  Duplicate links: {}", stats.duplicates);
    println!("  Renamed identifiers: {}", stats.renamed);
    println!("  Detail pages: {}", stats.detail_targets);
    println!();

    println!("Results:");
    println!("  Written: {}", stats.written);
    println!("  Fetch failures: {}", stats.fetch_failures());
    println!("  Parse failures: {}", stats.parse_failures());
    println!();

    if !stats.skipped.is_empty() {
        println!("Skipped Pages ({}):", stats.skipped.len());
        for skipped in &stats.skipped {
            println!("  - [{:?}] {}: {}", skipped.kind, skipped.url, skipped.message);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} detail pages written)",
        stats.success_rate(),
        stats.written,
        stats.detail_targets
    );
}
