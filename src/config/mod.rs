//! Configuration module for Action Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional: every section has defaults that target the
//! public presidential-actions listing.
//!
//! # Example
//!
//! ```no_run
//! use action_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Writing records to: {}", config.output.directory);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, ScraperConfig, SelectorConfig, UserAgentConfig, DEFAULT_BASE_URL,
    DEFAULT_OUTPUT_DIR,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

pub(crate) use validation::compile_selector;
