use crate::crawler::DEFAULT_USER_AGENT;
use crate::link::Depth;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Spoder
///
/// Every section is optional in the TOML file; command-line flags are
/// applied on top before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub transport: TransportConfig,
    pub patterns: PatternConfig,
    pub output: OutputConfig,
    pub shutdown: ShutdownConfig,
}

impl Config {
    /// The depth handed to the seed task
    ///
    /// Without recursion only the seed page is crawled.
    pub fn depth(&self) -> Depth {
        match (self.crawler.recursive, self.crawler.depth) {
            (false, _) => Depth::Limited(1),
            (true, Some(depth)) => Depth::Limited(depth),
            (true, None) => Depth::Unlimited,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    pub seed: Option<String>,

    /// Number of worker tasks
    pub threads: usize,

    /// Follow discovered links
    pub recursive: bool,

    /// Maximum recursion depth, unlimited when absent
    pub depth: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            threads: default_threads(),
            recursive: false,
            depth: None,
        }
    }
}

/// Twice the available parallelism
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(2)
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransportConfig {
    pub user_agent: String,

    /// Semicolon-separated `name=value` pairs sent as the Cookie header
    pub cookies: Option<String>,

    pub connect_timeout_ms: u64,
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookies: None,
            connect_timeout_ms: 500,
        }
    }
}

/// Regex overrides; an absent entry selects the built-in pattern
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub link: Option<String>,
    pub href: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File the report is appended to; stdout when absent
    pub path: Option<PathBuf>,
}

/// Shutdown timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ShutdownConfig {
    /// Length of each of the two grace windows
    pub grace_period_ms: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 600,
        }
    }
}
