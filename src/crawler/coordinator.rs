//! Scrape coordinator - main scrape orchestration logic
//!
//! This module contains the run loop that ties the other crawler components
//! together:
//! - Paginating the listing and collecting de-duplicated detail targets
//! - Fetching each detail page through the pacer and retry policy
//! - Parsing pages into records and handing them to the record store
//! - Tracking the run phase and the run statistics

use crate::config::Config;
use crate::crawler::{
    DetailParser, ListingPage, ListingParser, Pacer, PageFetcher, RetryDecision, RetryPolicy,
};
use crate::output::{FailureKind, RunStats};
use crate::state::RunPhase;
use crate::storage::{ActionIndex, ActionRecord, IndexEntry, JsonStore, RecordStore};
use crate::url::{derive_identifier, disambiguate, normalize_url};
use crate::{FetchError, ScraperError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// A detail page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTarget {
    /// Normalized detail-page URL
    pub url: String,

    /// Identifier the record will be stored under, unique within the run
    pub identifier: String,
}

/// Outcome of offering a discovered link to the target queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Offer {
    Added,
    Renamed,
    Duplicate,
    Invalid,
}

/// Ordered, de-duplicated list of detail targets
#[derive(Debug, Default)]
struct TargetQueue {
    urls: HashSet<String>,
    identifiers: HashSet<String>,
    targets: Vec<DetailTarget>,
}

impl TargetQueue {
    /// Queues `link` unless its normalized URL is already queued
    ///
    /// A derived identifier that is already taken gets a URL digest suffix.
    fn offer(&mut self, link: &str) -> Offer {
        let url = match normalize_url(link) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Ignoring detail link {}: {}", link, e);
                return Offer::Invalid;
            }
        };

        if !self.urls.insert(url.clone()) {
            return Offer::Duplicate;
        }

        let mut identifier = derive_identifier(&url);
        let mut outcome = Offer::Added;
        while self.identifiers.contains(&identifier) {
            identifier = disambiguate(&identifier, &url);
            outcome = Offer::Renamed;
        }
        if outcome == Offer::Renamed {
            tracing::debug!("Identifier collision for {}, using '{}'", url, identifier);
        }

        self.identifiers.insert(identifier.clone());
        self.targets.push(DetailTarget { url, identifier });
        outcome
    }

    fn into_targets(self) -> Vec<DetailTarget> {
        self.targets
    }
}

/// Main scrape coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: PageFetcher,
    pacer: Pacer,
    retry: RetryPolicy,
    listing: ListingParser,
    detail: DetailParser,
    store: Box<dyn RecordStore + Send>,
    phase: RunPhase,
    stats: RunStats,
}

impl Coordinator {
    /// Creates a coordinator writing to the configured output directory
    ///
    /// # Arguments
    ///
    /// * `config` - A validated scraper configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScraperError)` - The HTTP client could not be built or a selector is invalid
    pub fn new(config: Config) -> Result<Self, ScraperError> {
        let store = JsonStore::new(config.output.directory.clone(), config.output.pretty);
        Self::with_store(config, Box::new(store))
    }

    /// Creates a coordinator with a custom record store
    pub fn with_store(
        config: Config,
        store: Box<dyn RecordStore + Send>,
    ) -> Result<Self, ScraperError> {
        let fetcher = PageFetcher::new(&config)?;
        let listing = ListingParser::from_config(&config.selectors)?;
        let detail = DetailParser::from_config(&config.selectors)?;
        let pacer = Pacer::new(Duration::from_millis(config.scraper.min_request_interval));
        let retry = RetryPolicy::from_config(&config.scraper);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            pacer,
            retry,
            listing,
            detail,
            store,
            phase: RunPhase::Idle,
            stats: RunStats::default(),
        })
    }

    /// Replaces the pacer built from the configuration
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Replaces the retry policy built from the configuration
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Current run phase
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Statistics collected so far
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Runs the listing phase only
    ///
    /// Walks the listing pages starting at the configured base URL until no
    /// next page is found, the next page was already visited, a later page
    /// fails, or `max-pages` is reached.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<DetailTarget>)` - De-duplicated targets in listing order
    /// * `Err(ScraperError)` - The first listing page could not be fetched or parsed
    pub async fn discover(&mut self) -> Result<Vec<DetailTarget>, ScraperError> {
        self.reset();
        self.collect_targets().await
    }

    /// Starts a fresh run: back to `Idle` with empty statistics
    fn reset(&mut self) {
        self.phase = RunPhase::Idle;
        self.stats = RunStats::default();
    }

    /// Paginates the listing from `Idle` to `CollectingDetails`
    async fn collect_targets(&mut self) -> Result<Vec<DetailTarget>, ScraperError> {
        let mut page_url = Url::parse(&self.config.scraper.base_url)?;
        let mut page = 1u32;
        let mut visited = HashSet::new();
        let mut queue = TargetQueue::default();

        self.transition(RunPhase::Listing { page })?;

        loop {
            visited.insert(page_url.to_string());
            tracing::info!("Fetching listing page {}: {}", page, page_url);

            let listing = match self.fetch_listing(&page_url).await {
                Ok(listing) => listing,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    tracing::warn!("Stopping pagination at page {}: {}", page, e);
                    break;
                }
            };

            self.stats.listing_pages += 1;
            self.stats.links_found += listing.detail_urls.len();
            let mut added = 0;
            for link in &listing.detail_urls {
                match queue.offer(link) {
                    Offer::Added => added += 1,
                    Offer::Renamed => {
                        added += 1;
                        self.stats.renamed += 1;
                    }
                    Offer::Duplicate => self.stats.duplicates += 1,
                    Offer::Invalid => {}
                }
            }
            tracing::debug!(
                "Listing page {} yielded {} links, {} new",
                page,
                listing.detail_urls.len(),
                added
            );

            let Some(next) = listing.next_page else {
                tracing::debug!("No next page after page {}", page);
                break;
            };
            if matches!(self.config.scraper.max_pages, Some(max) if page >= max) {
                tracing::info!("Reached max-pages limit ({})", page);
                break;
            }
            if visited.contains(&next) {
                tracing::debug!("Next page {} already visited", next);
                break;
            }

            page_url = Url::parse(&next)?;
            page += 1;
            self.transition(RunPhase::Listing { page })?;
        }

        self.transition(RunPhase::CollectingDetails)?;

        let targets = queue.into_targets();
        self.stats.detail_targets = targets.len();
        tracing::info!(
            "Discovered {} detail pages across {} listing pages",
            targets.len(),
            self.stats.listing_pages
        );
        Ok(targets)
    }

    /// Runs a complete scrape
    ///
    /// 1. Prepare the record store
    /// 2. Discover detail targets
    /// 3. Fetch, parse and write each target once
    /// 4. Write the run index if enabled
    ///
    /// Detail pages that fail to fetch or parse are skipped and counted; any
    /// storage error aborts the run.
    pub async fn run(&mut self) -> Result<RunStats, ScraperError> {
        let start_time = Instant::now();
        self.reset();

        self.store.prepare()?;
        tracing::debug!(
            "Pacing requests {:?} apart, up to {} attempts each",
            self.pacer.min_interval(),
            self.retry.max_attempts
        );

        let targets = self.collect_targets().await?;
        let total = targets.len();
        let mut index = Vec::with_capacity(total);

        for (position, target) in targets.iter().enumerate() {
            tracing::debug!("Detail page {}/{}: {}", position + 1, total, target.url);
            if let Some(record) = self.scrape_target(target).await? {
                index.push(IndexEntry::from(&record));
            }
        }

        self.transition(RunPhase::Done)?;

        if self.config.output.write_index {
            let path = self.store.write_index(&ActionIndex::new(index))?;
            tracing::info!("Wrote index to {}", path.display());
        }

        self.stats.elapsed = Some(start_time.elapsed());
        tracing::info!(
            "Scrape completed: {} of {} records written in {:?}",
            self.stats.written,
            total,
            start_time.elapsed()
        );

        Ok(self.stats.clone())
    }

    /// Fetches, parses and writes one detail page
    ///
    /// Returns `Ok(None)` when the page was skipped.
    async fn scrape_target(
        &mut self,
        target: &DetailTarget,
    ) -> Result<Option<ActionRecord>, ScraperError> {
        self.transition(RunPhase::Fetching)?;
        let html = match self.fetch_with_retry(&target.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", target.url, e);
                self.stats
                    .record_skip(&target.url, FailureKind::Fetch, e.to_string());
                return Ok(None);
            }
        };

        self.transition(RunPhase::Parsing)?;
        let mut record = match self.detail.parse(&html, &target.url) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", target.url, e);
                self.stats
                    .record_skip(&target.url, FailureKind::Parse, e.to_string());
                return Ok(None);
            }
        };
        record.identifier = target.identifier.clone();

        self.transition(RunPhase::Writing)?;
        let path = self.store.write_record(&record)?;
        self.stats.written += 1;
        tracing::info!("Collected '{}' -> {}", record.title, path.display());

        Ok(Some(record))
    }

    /// Fetches and parses one listing page
    async fn fetch_listing(&mut self, page_url: &Url) -> Result<ListingPage, ScraperError> {
        let html = self.fetch_with_retry(page_url.as_str()).await?;
        Ok(self.listing.parse(&html, page_url)?)
    }

    /// Fetches a URL, pacing every attempt and retrying transient failures
    async fn fetch_with_retry(&mut self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            self.pacer.wait().await;

            let error = match self.fetcher.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            match self.retry.decide(&error, attempt) {
                RetryDecision::Retry { delay } => {
                    tracing::warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt,
                        self.retry.max_attempts,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp => return Err(error),
            }
        }
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    fn transition(&mut self, next: RunPhase) -> Result<(), ScraperError> {
        if !self.phase.can_transition_to(next) {
            return Err(ScraperError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Runs a complete scrape with the default JSON store
///
/// # Example
///
/// ```no_run
/// use action_scraper::config::load_config;
/// use action_scraper::crawler::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = run_scrape(config).await?;
/// println!("{} records written", stats.written);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config) -> Result<RunStats, ScraperError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
