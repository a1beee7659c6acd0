//! One fetch-and-extract cycle
//!
//! A [`CrawlTask`] fetches its link, streams the body through the extraction
//! engine and submits one child task per newly discovered link. Whatever
//! happens, including an abort from the scheduler, it reports its completion
//! exactly once.

use crate::crawler::fetcher::Transport;
use crate::crawler::scheduler::FrontierScheduler;
use crate::extract::{href_value, is_base_tag, ExtractionEngine, MarkupTokenizer, Segment};
use crate::link::{resolve, AbsoluteLink, Depth};
use crate::{TransportError, TransportResult};
use futures::StreamExt;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Collaborators shared by every task of a crawl
pub struct CrawlContext {
    engine: ExtractionEngine,
    transport: Arc<dyn Transport>,
    scheduler: FrontierScheduler,
}

impl CrawlContext {
    pub fn new(
        engine: ExtractionEngine,
        transport: Arc<dyn Transport>,
        scheduler: FrontierScheduler,
    ) -> Self {
        Self {
            engine,
            transport,
            scheduler,
        }
    }

    pub fn engine(&self) -> &ExtractionEngine {
        &self.engine
    }

    pub fn scheduler(&self) -> &FrontierScheduler {
        &self.scheduler
    }
}

impl fmt::Debug for CrawlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlContext")
            .field("engine", &self.engine)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

/// A scheduled unit of work: one link and its remaining depth
#[derive(Debug)]
pub struct CrawlTask {
    context: Arc<CrawlContext>,
    link: AbsoluteLink,
    depth: Depth,
}

impl CrawlTask {
    pub fn new(context: Arc<CrawlContext>, link: AbsoluteLink, depth: Depth) -> Self {
        Self {
            context,
            link,
            depth,
        }
    }

    pub fn link(&self) -> &AbsoluteLink {
        &self.link
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Runs the task to completion
    ///
    /// # Behavior
    ///
    /// 1. An exhausted depth ends the task without fetching
    /// 2. Transport failures are logged and end the task; nothing is retried
    /// 3. Every new link found on the page becomes a child task one level deeper
    ///
    /// The scheduler is notified when this future finishes or is dropped.
    pub async fn run(self) {
        let _guard = CompletionGuard {
            scheduler: self.context.scheduler.clone(),
        };

        if self.depth.is_exhausted() {
            tracing::trace!("Depth exhausted at {}", self.link);
            return;
        }

        let links = match self.crawl().await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Failed to crawl {}: {}", self.link, e);
                return;
            }
        };

        tracing::debug!(
            "Crawled {} (depth {}), {} new links",
            self.link,
            self.depth,
            links.len()
        );

        let depth = self.depth.child();
        for link in links {
            let child = CrawlTask::new(Arc::clone(&self.context), link, depth);
            self.context.scheduler.submit(child);
        }
    }

    async fn crawl(&self) -> TransportResult<HashSet<AbsoluteLink>> {
        let url = self.link.to_string();
        let scheme = self
            .link
            .scheme()
            .ok_or_else(|| TransportError::MalformedUrl(url.clone()))?;
        tracing::trace!("Fetching {} over {}", url, scheme);

        let mut body = self.context.transport.fetch(&url).await?;
        let mut scan = PageScan::new(&self.context.engine, self.link.clone());

        while let Some(chunk) = body.next().await {
            scan.feed(&chunk?);
        }

        Ok(scan.finish())
    }
}

struct CompletionGuard {
    scheduler: FrontierScheduler,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.scheduler.on_task_complete();
    }
}

/// Extraction state for one page
///
/// `parent` starts as the fetched link and is replaced by a `<base>` href for
/// the rest of the page.
struct PageScan<'a> {
    engine: &'a ExtractionEngine,
    tokenizer: MarkupTokenizer,
    parent: AbsoluteLink,
    found: HashSet<AbsoluteLink>,
}

impl<'a> PageScan<'a> {
    fn new(engine: &'a ExtractionEngine, parent: AbsoluteLink) -> Self {
        Self {
            engine,
            tokenizer: MarkupTokenizer::new(),
            parent,
            found: HashSet::new(),
        }
    }

    fn feed(&mut self, chunk: &[u8]) {
        for segment in self.tokenizer.feed(chunk) {
            self.handle(segment);
        }
    }

    fn finish(mut self) -> HashSet<AbsoluteLink> {
        for segment in self.tokenizer.finish() {
            self.handle(segment);
        }
        self.found
    }

    fn handle(&mut self, segment: Segment) {
        match segment {
            Segment::Text(text) => {
                let links = self.engine.parse_text(&text, &self.parent);
                self.found.extend(links);
            }
            Segment::Tag(tag) if is_base_tag(&tag) => {
                if let Some(href) = href_value(&tag) {
                    let base = resolve(Some(&self.parent), href);
                    tracing::debug!("Base of {} is now {}", self.parent, base);
                    self.parent = base;
                }
            }
            Segment::Tag(tag) => {
                let links = self.engine.parse_attributes(&tag, &self.parent);
                self.found.extend(links);
            }
        }
    }
}
