//! Configuration module for Listing-Harvester
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every setting has a built-in default, so running
//! without a file is the common case.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Known extensions: {:?}", config.media.extensions);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, MediaConfig, PolitenessEntry, ResolverConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
