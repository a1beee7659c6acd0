//! Crawler module for page fetching and frontier management
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Transport` trait
//! - The per-link crawl task
//! - Frontier accounting and the worker pool
//! - Overall crawl coordination

mod fetcher;
mod frontier;
#[cfg(test)]
mod mock;
mod scheduler;
mod task;

pub use fetcher::{
    build_http_client, cookie_header, BodyStream, HttpTransport, Transport, DEFAULT_USER_AGENT,
    MAX_REDIRECTS,
};
pub use frontier::FrontierCounter;
pub use scheduler::{FrontierScheduler, ShutdownOutcome, ShutdownReason};
pub use task::{CrawlContext, CrawlTask};

use crate::config::Config;
use crate::extract::{ArtifactStore, ExtractionEngine, Patterns};
use crate::link::AbsoluteLink;
use crate::{ConfigError, SpoderError};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What the scheduler reported when a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub reason: ShutdownReason,
    pub outcome: ShutdownOutcome,
    pub registered_tasks: usize,
    pub duration: Duration,
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Compile the extraction patterns
/// 2. Start the worker pool
/// 3. Submit the seed task
/// 4. Wait until the frontier is exhausted or `cancel` resolves
/// 5. Shut the worker pool down
///
/// Everything found ends up in `store`.
///
/// # Arguments
///
/// * `config` - A validated crawler configuration
/// * `transport` - Where pages are fetched from
/// * `store` - The sets discovered artifacts are collected into
/// * `cancel` - Resolves when the operator asks the crawl to stop
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished or was cancelled
/// * `Err(SpoderError)` - The configuration is unusable
pub async fn crawl<F>(
    config: &Config,
    transport: Arc<dyn Transport>,
    store: Arc<ArtifactStore>,
    cancel: F,
) -> Result<CrawlSummary, SpoderError>
where
    F: Future<Output = ()>,
{
    let patterns = Patterns::new(&config.patterns)?;
    let seed = config
        .crawler
        .seed
        .as_deref()
        .ok_or_else(|| ConfigError::Validation("a seed URL is required".to_string()))?;

    let started = Instant::now();
    let scheduler =
        FrontierScheduler::start(config.crawler.threads, config.shutdown.grace_period());
    let context = Arc::new(CrawlContext::new(
        ExtractionEngine::new(patterns, store),
        transport,
        scheduler.clone(),
    ));

    tracing::info!(
        "Crawling {} with {} workers, depth {}",
        seed,
        config.crawler.threads,
        config.depth()
    );
    scheduler.submit(CrawlTask::new(
        context,
        AbsoluteLink::absolute(seed),
        config.depth(),
    ));

    let reason = tokio::select! {
        reason = scheduler.wait() => reason,
        _ = cancel => {
            scheduler.request_cancellation();
            scheduler.wait().await
        }
    };

    let outcome = scheduler.shutdown().await;
    let summary = CrawlSummary {
        reason,
        outcome,
        registered_tasks: scheduler.registered_tasks(),
        duration: started.elapsed(),
    };

    tracing::info!(
        "Crawl {} after {:?} ({} tasks registered)",
        summary.reason,
        summary.duration,
        summary.registered_tasks
    );

    Ok(summary)
}
