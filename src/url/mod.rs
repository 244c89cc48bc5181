//! URL handling module for Action Scraper
//!
//! This module provides link resolution, URL normalization and the derivation
//! of stable record identifiers from detail-page URLs.

mod identifier;
mod normalize;

use url::Url;

// Re-export main functions
pub use identifier::{derive_identifier, disambiguate, slugify};
pub use normalize::normalize_url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links (same page anchors)
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Extracts the listing page number from a `/page/<n>/` path segment
///
/// Pages without such a segment are page 1.
pub fn page_number(url: &str) -> u32 {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            let segments: Vec<String> = parsed
                .path_segments()?
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect();
            segments
                .windows(2)
                .rev()
                .find(|pair| pair[0] == "page")
                .and_then(|pair| pair[1].parse().ok())
        })
        .unwrap_or(1)
}
