//! Frontier scheduler
//!
//! This module handles:
//! - A fixed pool of worker tasks pulling crawl tasks from an unbounded queue
//! - Frontier accounting, so the crawl ends when the last task finishes
//! - Cancellation requested from outside (operator interrupt)
//! - Two-stage shutdown: a grace window, then forced abort with a second window

use crate::crawler::frontier::FrontierCounter;
use crate::crawler::task::CrawlTask;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Why the crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The last in-flight task finished without spawning children
    FrontierExhausted,
    /// Stopped on request before the frontier emptied
    Cancelled,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontierExhausted => write!(f, "frontier exhausted"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// How the worker pool went down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every worker finished within the first grace window
    Graceful,
    /// Workers had to be aborted but stopped within the second window
    Forced,
    /// Workers did not stop even after being aborted
    TimedOut,
}

type TaskQueue = Arc<Mutex<mpsc::UnboundedReceiver<CrawlTask>>>;

struct Inner {
    counter: FrontierCounter,
    accepting: AtomicBool,
    queue: mpsc::UnboundedSender<CrawlTask>,
    stop: CancellationToken,
    reason: OnceLock<ShutdownReason>,
    workers: Mutex<JoinSet<()>>,
    grace_period: Duration,
}

/// Runs crawl tasks on a bounded worker pool while the frontier grows
///
/// Cloning is cheap; every clone drives the same pool. Tasks hold a clone so
/// they can submit their children.
#[derive(Clone)]
pub struct FrontierScheduler {
    inner: Arc<Inner>,
}

impl FrontierScheduler {
    /// Spawns the worker pool
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `threads` - Number of workers, at least one is started
    /// * `grace_period` - Length of each shutdown grace window
    pub fn start(threads: usize, grace_period: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue: TaskQueue = Arc::new(Mutex::new(receiver));
        let stop = CancellationToken::new();

        let threads = threads.max(1);
        let mut workers = JoinSet::new();
        for id in 0..threads {
            workers.spawn(worker(id, Arc::clone(&queue), stop.clone()));
        }
        tracing::debug!("Started {} workers", threads);

        Self {
            inner: Arc::new(Inner {
                counter: FrontierCounter::new(),
                accepting: AtomicBool::new(true),
                queue: sender,
                stop,
                reason: OnceLock::new(),
                workers: Mutex::new(workers),
                grace_period,
            }),
        }
    }

    /// Hands a task to the worker pool
    ///
    /// Safe to call concurrently from running tasks.
    ///
    /// # Returns
    ///
    /// `false` if the scheduler is shutting down and the task was dropped
    pub fn submit(&self, task: CrawlTask) -> bool {
        if !self.is_accepting() {
            tracing::trace!("Not accepting {}, shutting down", task.link());
            return false;
        }

        self.inner.counter.register();
        if let Err(rejected) = self.inner.queue.send(task) {
            tracing::debug!("Worker queue closed, dropping {}", rejected.0.link());
            self.on_task_complete();
            return false;
        }

        true
    }

    /// Marks one task as finished
    ///
    /// The call that empties the frontier starts the shutdown.
    pub fn on_task_complete(&self) {
        if self.inner.counter.complete() {
            tracing::info!(
                "Frontier exhausted, total tasks registered: {}",
                self.registered_tasks()
            );
            self.begin_shutdown(ShutdownReason::FrontierExhausted);
        }
    }

    /// Stops accepting work and releases idle workers
    ///
    /// Tasks already running keep going until [`shutdown`](Self::shutdown)
    /// runs out of patience.
    pub fn request_cancellation(&self) {
        if self.begin_shutdown(ShutdownReason::Cancelled) {
            tracing::info!(
                "Cancellation requested with {} tasks in flight",
                self.active_tasks()
            );
        }
    }

    /// Resolves once the crawl has stopped for any reason
    pub async fn wait(&self) -> ShutdownReason {
        self.inner.stop.cancelled().await;
        self.reason().unwrap_or(ShutdownReason::Cancelled)
    }

    /// Stops the worker pool
    ///
    /// Workers get one grace window to finish their current task. Any still
    /// running are then aborted and given a second window. If that also
    /// passes the caller gets [`ShutdownOutcome::TimedOut`] and should not
    /// wait any further.
    pub async fn shutdown(&self) -> ShutdownOutcome {
        self.begin_shutdown(ShutdownReason::Cancelled);

        let grace_period = self.inner.grace_period;
        let mut workers = self.inner.workers.lock().await;

        if timeout(grace_period, drain(&mut workers)).await.is_ok() {
            tracing::debug!("All workers stopped");
            return ShutdownOutcome::Graceful;
        }

        tracing::warn!(
            "{} workers still busy after {:?}, aborting",
            workers.len(),
            grace_period
        );
        workers.abort_all();

        if timeout(grace_period, drain(&mut workers)).await.is_ok() {
            ShutdownOutcome::Forced
        } else {
            tracing::error!("Workers did not stop after abort");
            ShutdownOutcome::TimedOut
        }
    }

    /// The reason recorded by the first shutdown trigger, if any
    pub fn reason(&self) -> Option<ShutdownReason> {
        self.inner.reason.get().copied()
    }

    /// Returns false once any shutdown trigger has fired
    pub fn is_accepting(&self) -> bool {
        self.inner.accepting.load(Ordering::Acquire)
    }

    pub fn active_tasks(&self) -> usize {
        self.inner.counter.active()
    }

    pub fn registered_tasks(&self) -> usize {
        self.inner.counter.registered()
    }

    /// Records the reason and fires the stop signal
    ///
    /// Returns `true` only for the first trigger.
    fn begin_shutdown(&self, reason: ShutdownReason) -> bool {
        self.inner.accepting.store(false, Ordering::Release);
        let first = self.inner.reason.set(reason).is_ok();
        self.inner.stop.cancel();
        first
    }
}

impl fmt::Debug for FrontierScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontierScheduler")
            .field("active", &self.active_tasks())
            .field("registered", &self.registered_tasks())
            .field("reason", &self.reason())
            .finish()
    }
}

async fn worker(id: usize, queue: TaskQueue, stop: CancellationToken) {
    loop {
        let task = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            task = async { queue.lock().await.recv().await } => match task {
                Some(task) => task,
                None => break,
            },
        };

        task.run().await;
    }

    tracing::trace!("Worker {} stopped", id);
}

async fn drain(workers: &mut JoinSet<()>) {
    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            if e.is_panic() {
                tracing::error!("Worker panicked: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::mock::{HangingTransport, MockTransport};
    use crate::crawler::task::CrawlContext;
    use crate::crawler::Transport;
    use crate::extract::ExtractionEngine;
    use crate::link::{AbsoluteLink, Depth};

    const GRACE: Duration = Duration::from_millis(200);

    fn context(
        scheduler: &FrontierScheduler,
        transport: Arc<dyn Transport>,
    ) -> Arc<CrawlContext> {
        Arc::new(CrawlContext::new(
            ExtractionEngine::default(),
            transport,
            scheduler.clone(),
        ))
    }

    fn seed(context: &Arc<CrawlContext>, depth: Depth) -> CrawlTask {
        CrawlTask::new(
            Arc::clone(context),
            AbsoluteLink::absolute("https://site.test/"),
            depth,
        )
    }

    #[tokio::test]
    async fn test_single_task_without_children_exhausts_frontier() {
        let transport =
            Arc::new(MockTransport::new().page("https://site.test/", &["<p>nothing</p>"]));
        let scheduler = FrontierScheduler::start(4, GRACE);
        let context = context(&scheduler, transport.clone());

        assert!(scheduler.submit(seed(&context, Depth::Unlimited)));

        assert_eq!(scheduler.wait().await, ShutdownReason::FrontierExhausted);
        assert_eq!(scheduler.active_tasks(), 0);
        assert_eq!(scheduler.registered_tasks(), 1);
        assert_eq!(transport.fetches(), 1);
        assert_eq!(scheduler.shutdown().await, ShutdownOutcome::Graceful);
    }

    #[tokio::test]
    async fn test_recursive_crawl_visits_each_link_once() {
        let transport = Arc::new(
            MockTransport::new()
                .page("https://site.test/", &[r#"<a href="/b">b</a>"#])
                .page(
                    "https://site.test/b",
                    &[r#"<a href="/c">c</a><a href="/b">self</a>"#],
                )
                .page("https://site.test/c", &[r#"<a href="/b">back</a>"#]),
        );
        let scheduler = FrontierScheduler::start(2, GRACE);
        let context = context(&scheduler, transport.clone());

        scheduler.submit(seed(&context, Depth::Unlimited));

        assert_eq!(scheduler.wait().await, ShutdownReason::FrontierExhausted);
        assert_eq!(transport.fetches(), 3);
        assert_eq!(scheduler.registered_tasks(), 3);
        assert_eq!(context.engine().store().link_count(), 2);
        assert_eq!(scheduler.shutdown().await, ShutdownOutcome::Graceful);
    }

    #[tokio::test]
    async fn test_wide_frontier_terminates_once() {
        let links: String = (0..50)
            .map(|i| format!(r#"<a href="/p{}">p</a>"#, i))
            .collect();
        let mut transport = MockTransport::new().page("https://site.test/", &[links.as_str()]);
        for i in 0..50 {
            transport = transport.page(&format!("https://site.test/p{}", i), &["leaf"]);
        }
        let transport = Arc::new(transport);
        let scheduler = FrontierScheduler::start(8, GRACE);
        let context = context(&scheduler, transport.clone());

        scheduler.submit(seed(&context, Depth::Limited(2)));

        assert_eq!(scheduler.wait().await, ShutdownReason::FrontierExhausted);
        assert_eq!(transport.fetches(), 51);
        assert_eq!(scheduler.registered_tasks(), 51);
        assert_eq!(scheduler.active_tasks(), 0);
        assert_eq!(scheduler.reason(), Some(ShutdownReason::FrontierExhausted));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_stuck_tasks() {
        let scheduler = FrontierScheduler::start(2, GRACE);
        let context = context(&scheduler, Arc::new(HangingTransport));

        scheduler.submit(seed(&context, Depth::Unlimited));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.active_tasks(), 1);

        scheduler.request_cancellation();
        assert_eq!(scheduler.wait().await, ShutdownReason::Cancelled);
        assert_eq!(scheduler.shutdown().await, ShutdownOutcome::Forced);

        // The aborted task still signalled its completion
        assert_eq!(scheduler.active_tasks(), 0);
        assert_eq!(scheduler.reason(), Some(ShutdownReason::Cancelled));
    }

    #[tokio::test]
    async fn test_no_submissions_after_shutdown() {
        let transport = Arc::new(MockTransport::new());
        let scheduler = FrontierScheduler::start(1, GRACE);
        let context = context(&scheduler, transport.clone());

        scheduler.request_cancellation();
        assert!(!scheduler.is_accepting());
        assert!(!scheduler.submit(seed(&context, Depth::Unlimited)));
        assert_eq!(scheduler.registered_tasks(), 0);
        assert_eq!(scheduler.shutdown().await, ShutdownOutcome::Graceful);
        assert_eq!(transport.fetches(), 0);
    }

    #[tokio::test]
    async fn test_first_shutdown_reason_wins() {
        let transport = Arc::new(MockTransport::new().page("https://site.test/", &["done"]));
        let scheduler = FrontierScheduler::start(1, GRACE);
        let context = context(&scheduler, transport);

        scheduler.submit(seed(&context, Depth::Limited(1)));
        assert_eq!(scheduler.wait().await, ShutdownReason::FrontierExhausted);

        scheduler.request_cancellation();
        assert_eq!(scheduler.wait().await, ShutdownReason::FrontierExhausted);
        assert_eq!(scheduler.shutdown().await, ShutdownOutcome::Graceful);
        assert_eq!(scheduler.shutdown().await, ShutdownOutcome::Graceful);
    }
}
