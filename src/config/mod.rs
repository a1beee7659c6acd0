//! Configuration module for Spoder
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The binary reads the file first, applies its command-line flags on top and
//! validates the merged result.
//!
//! # Example
//!
//! ```no_run
//! use spoder::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spoder.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.threads);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_threads, Config, CrawlerConfig, OutputConfig, PatternConfig, ShutdownConfig,
    TransportConfig,
};

// Re-export parser functions
pub use parser::{load_config, read_config};
