//! Spoder: a recursive link, email and phone number crawler
//!
//! Starting from a seed URL, this crate fetches pages over HTTP/HTTPS, scans the
//! raw markup for outbound links, email addresses and telephone numbers, and
//! follows newly discovered links up to a configurable depth. Everything found
//! is deduplicated across all concurrently running fetches.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod link;
pub mod output;

use thiserror::Error;

/// Main error type for Spoder operations
#[derive(Debug, Error)]
pub enum SpoderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors
///
/// Every variant is an operator mistake and is reported before any crawling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid {name} pattern: {source}")]
    InvalidPattern {
        name: &'static str,
        source: regex::Error,
    },
}

/// Errors raised while fetching a single page
///
/// These never travel past the crawl task that hit them.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for Spoder operations
pub type Result<T> = std::result::Result<T, SpoderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlTask, FrontierScheduler};
pub use extract::{ArtifactStore, ExtractionEngine};
pub use link::{resolve, AbsoluteLink, Depth};
