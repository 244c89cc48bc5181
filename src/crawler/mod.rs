//! Crawler module for listing traversal and detail scraping
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching and error classification
//! - Retry decisions for transient failures
//! - Request pacing
//! - Listing and detail page parsing
//! - Overall run coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod pacer;
mod retry;

pub use coordinator::{run_scrape, Coordinator, DetailTarget};
pub use detail::DetailParser;
pub use fetcher::{build_http_client, PageFetcher, ACCEPT_HTML};
pub use listing::{ListingPage, ListingParser};
pub use pacer::Pacer;
pub use retry::{RetryDecision, RetryPolicy, MAX_BACKOFF};
