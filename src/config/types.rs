use serde::Deserialize;

/// Default first listing page
pub const DEFAULT_BASE_URL: &str = "https://www.whitehouse.gov/presidential-actions/";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "presidential_actions";

/// Main configuration structure for Action Scraper
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Scraping behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// URL of the first listing page
    pub base_url: String,

    /// Minimum time between consecutive requests (milliseconds)
    pub min_request_interval: u64,

    /// Total attempts per URL, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds), doubled for each further retry
    pub retry_delay: u64,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Stop paginating after this many listing pages
    pub max_pages: Option<u32>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_request_interval: 1000,
            max_attempts: 3,
            retry_delay: 2000,
            timeout_secs: 30,
            max_pages: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the scraper
    pub crawler_name: String,

    /// Version of the scraper
    pub crawler_version: String,

    /// URL with information about the scraper
    pub contact_url: Option<String>,

    /// Email address for scraper-related contact
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ActionScraper".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header value
    ///
    /// Format: `Name/Version`, followed by ` (+ContactURL; ContactEmail)` when
    /// contact details are configured.
    pub fn user_agent(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        let contact: Vec<String> = [
            self.contact_url.as_ref().map(|u| format!("+{}", u)),
            self.contact_email.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if contact.is_empty() {
            base
        } else {
            format!("{} ({})", base, contact.join("; "))
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving one JSON file per action
    pub directory: String,

    /// Pretty-print record files
    pub pretty: bool,

    /// Write `_index.json` at the end of the run
    pub write_index: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_string(),
            pretty: true,
            write_index: true,
        }
    }
}

/// CSS selectors describing the listing and detail page layout
///
/// List-valued entries are candidates tried in order; the first one that
/// matches wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Element wrapping the listing entries
    pub listing_container: Vec<String>,

    /// Detail links inside the listing container
    pub listing_link: String,

    /// Link to the next listing page
    pub next_page: Vec<String>,

    /// Primary heading of a detail page
    pub title: Vec<String>,

    /// Publication date of a detail page
    pub date: Vec<String>,

    /// Category/type label of a detail page
    pub category: Vec<String>,

    /// Main content container of a detail page
    pub body: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_container: strings(&["ul.wp-block-post-template", ".wp-block-post-template"]),
            listing_link: ".wp-block-post-title a[href], h2 a[href]".to_string(),
            next_page: strings(&[
                "a.wp-block-query-pagination-next[href]",
                "a.next[href]",
                "a[rel='next'][href]",
                "link[rel='next'][href]",
            ]),
            title: strings(&["h1"]),
            date: strings(&[".wp-block-post-date time", "time", ".date"]),
            category: strings(&[
                ".wp-block-whitehouse-topper__meta--byline",
                ".breadcrumb",
                "[rel='tag']",
                ".category",
            ]),
            body: strings(&[".entry-content", ".wp-block-post-content", "article", "main"]),
        }
    }
}
