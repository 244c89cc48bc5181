//! Listing page parser
//!
//! Extracts the detail-page links of one page of the paginated index and the
//! URL of the following page, if any. All structural assumptions about the
//! listing layout come from [`SelectorConfig`].

use crate::config::{compile_selector, SelectorConfig};
use crate::url::{page_number, resolve_link};
use crate::{ConfigError, ParseError};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Links found on one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Absolute detail-page URLs, in document order, without duplicates
    pub detail_urls: Vec<String>,

    /// Absolute URL of the next listing page
    pub next_page: Option<String>,
}

/// Parses listing pages with a fixed set of compiled selectors
#[derive(Debug, Clone)]
pub struct ListingParser {
    containers: Vec<Selector>,
    link: Selector,
    next: Vec<Selector>,
    any_link: Selector,
}

impl ListingParser {
    /// Compiles the listing selectors from the configuration
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            containers: compile_all(&config.listing_container)?,
            link: compile_selector(&config.listing_link)?,
            next: compile_all(&config.next_page)?,
            any_link: compile_selector("a[href]")?,
        })
    }

    /// Parses one listing page
    ///
    /// # Arguments
    ///
    /// * `html` - The listing page HTML
    /// * `page_url` - URL the page was fetched from, used to resolve relative links
    ///
    /// # Returns
    ///
    /// * `Ok(ListingPage)` - Detail links and the optional next page
    /// * `Err(ParseError)` - No listing container matched
    pub fn parse(&self, html: &str, page_url: &Url) -> Result<ListingPage, ParseError> {
        let document = Html::parse_document(html);

        let container = self
            .containers
            .iter()
            .find_map(|selector| document.select(selector).next())
            .ok_or_else(|| ParseError::MissingElement {
                url: page_url.to_string(),
                element: "listing container",
            })?;

        let mut seen = HashSet::new();
        let detail_urls: Vec<String> = container
            .select(&self.link)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(|href| resolve_link(href, page_url))
            .filter(|url| seen.insert(url.clone()))
            .collect();

        let next_page = self
            .explicit_next_page(&document, page_url)
            .or_else(|| self.numbered_next_page(&document, page_url))
            .filter(|next| next != page_url.as_str());

        Ok(ListingPage {
            detail_urls,
            next_page,
        })
    }

    /// First link matched by the configured next-page selectors
    fn explicit_next_page(&self, document: &Html, page_url: &Url) -> Option<String> {
        self.next.iter().find_map(|selector| {
            document
                .select(selector)
                .filter_map(|element| element.value().attr("href"))
                .find_map(|href| resolve_link(href, page_url))
        })
    }

    /// Smallest numbered `/page/<n>/` link beyond the current page
    fn numbered_next_page(&self, document: &Html, page_url: &Url) -> Option<String> {
        let current = page_number(page_url.as_str());

        document
            .select(&self.any_link)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(|href| resolve_link(href, page_url))
            .map(|url| (page_number(&url), url))
            .filter(|(number, _)| *number > current)
            .min_by_key(|(number, _)| *number)
            .map(|(_, url)| url)
    }
}

fn compile_all(selectors: &[String]) -> Result<Vec<Selector>, ConfigError> {
    selectors.iter().map(|s| compile_selector(s)).collect()
}
