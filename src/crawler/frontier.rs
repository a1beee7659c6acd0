//! Frontier accounting
//!
//! The number of crawl tasks is unknown up front and grows while tasks run, so
//! exhaustion is detected by counting: every submission increments `active`,
//! every completed task decrements it, and the task whose decrement moves the
//! counter from one to zero is the one that observes the empty frontier.

use std::sync::atomic::{AtomicUsize, Ordering};

/// In-flight and lifetime task counters
#[derive(Debug, Default)]
pub struct FrontierCounter {
    active: AtomicUsize,
    registered: AtomicUsize,
}

impl FrontierCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly submitted task
    pub fn register(&self) {
        self.registered.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a finished task
    ///
    /// # Returns
    ///
    /// `true` for exactly one caller: the one whose decrement emptied the
    /// frontier. A decrement that would underflow is refused and logged.
    pub fn complete(&self) -> bool {
        match self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => previous == 1,
            Err(_) => {
                tracing::error!("Task completion without matching registration");
                false
            }
        }
    }

    /// Tasks submitted but not yet completed
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Tasks submitted since start, diagnostic only
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::Relaxed)
    }
}
