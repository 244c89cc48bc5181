//! Detail page parser
//!
//! Turns one detail page into an [`ActionRecord`]:
//!
//! | Field | Source | When missing |
//! |-------|--------|--------------|
//! | title | primary heading | `ParseError` |
//! | date | labeled date element, text verbatim (else `datetime` attribute) | `""` |
//! | category | tag/breadcrumb label | `""` |
//! | body | main content container, block elements as paragraphs | `ParseError` |

use crate::config::{compile_selector, SelectorConfig};
use crate::storage::ActionRecord;
use crate::url::derive_identifier;
use crate::{ConfigError, ParseError};
use scraper::{ElementRef, Html, Selector};

/// Elements whose text becomes one body paragraph
const BLOCK_TAGS: &[&str] = &[
    "p",
    "li",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
];

/// Parses detail pages with a fixed set of compiled selectors
#[derive(Debug, Clone)]
pub struct DetailParser {
    title: Vec<Selector>,
    date: Vec<Selector>,
    category: Vec<Selector>,
    body: Vec<Selector>,
}

impl DetailParser {
    /// Compiles the detail selectors from the configuration
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile_all(&config.title)?,
            date: compile_all(&config.date)?,
            category: compile_all(&config.category)?,
            body: compile_all(&config.body)?,
        })
    }

    /// Parses one detail page into a record
    ///
    /// The record identifier is derived from `source_url`.
    ///
    /// # Returns
    ///
    /// * `Ok(ActionRecord)` - Title and body were found; date and category may be empty
    /// * `Err(ParseError)` - The title or the body is missing or empty
    pub fn parse(&self, html: &str, source_url: &str) -> Result<ActionRecord, ParseError> {
        let document = Html::parse_document(html);
        let missing = |element: &'static str| ParseError::MissingElement {
            url: source_url.to_string(),
            element,
        };

        let title = first_text(&document, &self.title).ok_or_else(|| missing("title"))?;
        let date = first_date(&document, &self.date).unwrap_or_default();
        let category = first_text(&document, &self.category).unwrap_or_default();

        let body = self
            .body
            .iter()
            .find_map(|selector| {
                document
                    .select(selector)
                    .map(extract_body_text)
                    .find(|text| !text.is_empty())
            })
            .ok_or_else(|| missing("body"))?;

        Ok(ActionRecord {
            identifier: derive_identifier(source_url),
            title,
            date,
            category,
            body,
            source_url: source_url.to_string(),
        })
    }
}

fn compile_all(selectors: &[String]) -> Result<Vec<Selector>, ConfigError> {
    selectors.iter().map(|s| compile_selector(s)).collect()
}

/// Collapses every whitespace run to a single space and trims the ends
fn collapse_whitespace<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first non-empty element matched by any selector, tried in order
fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .map(|element| collapse_whitespace(element.text()))
            .find(|text| !text.is_empty())
    })
}

/// Like [`first_text`], falling back to a `datetime` attribute for empty elements
fn first_date(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document.select(selector).find_map(|element| {
            let text = collapse_whitespace(element.text());
            if !text.is_empty() {
                return Some(text);
            }
            element
                .value()
                .attr("datetime")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    })
}

/// Plain text of a content container, one paragraph per outermost block element
///
/// Paragraphs are separated by a blank line. A container without block
/// elements yields its whole text as a single paragraph.
fn extract_body_text(container: ElementRef) -> String {
    let mut paragraphs = Vec::new();

    for node in container.descendants() {
        if node.id() == container.id() {
            continue;
        }
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if !BLOCK_TAGS.contains(&element.value().name()) || has_block_ancestor(element, container)
        {
            continue;
        }

        let text = collapse_whitespace(element.text());
        if !text.is_empty() {
            paragraphs.push(text);
        }
    }

    if paragraphs.is_empty() {
        collapse_whitespace(container.text())
    } else {
        paragraphs.join("\n\n")
    }
}

/// Returns true if a block element sits between `element` and `container`
fn has_block_ancestor(element: ElementRef, container: ElementRef) -> bool {
    for ancestor in element.ancestors() {
        if ancestor.id() == container.id() {
            return false;
        }
        if let Some(parent) = ancestor.value().as_element() {
            if BLOCK_TAGS.contains(&parent.name()) {
                return true;
            }
        }
    }
    false
}
