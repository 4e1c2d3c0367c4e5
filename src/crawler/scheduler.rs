//! Scheduler for deduplication, bounded concurrency and quiescence
//!
//! This module handles:
//! - The visited set, an atomic test-and-set per canonical URL
//! - Global concurrency limiting via a semaphore
//! - The live-task counter and the wait for it to reach zero
//!
//! The counter is incremented when a URL is admitted, not when its worker
//! starts, and decremented when the worker's [`TaskTicket`] is dropped. A
//! worker enqueues everything it discovers before dropping its ticket, so
//! the counter cannot touch zero while reachable work remains.

use dashmap::DashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{AcquireError, Notify, Semaphore, SemaphorePermit};
use url::Url;

/// Default number of simultaneous fetches
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Scheduler shared by every worker of one run
#[derive(Debug)]
pub struct Scheduler {
    /// Canonical URLs admitted during this run
    visited: DashSet<String>,

    /// Tasks that are enqueued or in flight
    live: AtomicUsize,

    /// Signalled when `live` drops to zero
    idle: Notify,

    /// Global semaphore for limiting concurrent fetches
    pool: Semaphore,

    pool_size: usize,
}

/// Proof that a task was admitted; completes the task when dropped
#[derive(Debug)]
pub struct TaskTicket {
    scheduler: Arc<Scheduler>,
}

impl Scheduler {
    /// Creates a scheduler allowing `pool_size` simultaneous fetches
    pub fn new(pool_size: usize) -> Self {
        let pool_size = pool_size.max(1);
        Self {
            visited: DashSet::new(),
            live: AtomicUsize::new(0),
            idle: Notify::new(),
            pool: Semaphore::new(pool_size),
            pool_size,
        }
    }

    /// Admits a URL for fetching if it has not been seen before
    ///
    /// Test-and-set on the visited set and the live-task increment happen
    /// here, at enqueue time.
    ///
    /// # Returns
    ///
    /// * `Some(TaskTicket)` - First sighting; the caller must run the task
    /// * `None` - Already admitted earlier in this run
    pub fn admit(self: &Arc<Self>, url: &Url) -> Option<TaskTicket> {
        if !self.visited.insert(url.as_str().to_string()) {
            return None;
        }

        self.live.fetch_add(1, Ordering::AcqRel);
        Some(TaskTicket {
            scheduler: Arc::clone(self),
        })
    }

    /// Waits for a free fetch slot
    ///
    /// This is the only backpressure in the engine. The permit returns the
    /// slot when dropped.
    pub async fn acquire_slot(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.pool.acquire().await
    }

    /// Blocks until no task is enqueued or in flight
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.live.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Number of tasks enqueued or in flight
    pub fn live_tasks(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Number of distinct URLs admitted so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns true if the URL has been admitted during this run
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Configured number of simultaneous fetches
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    fn complete(&self) {
        if self.live.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_one();
        }
    }
}

impl Drop for TaskTicket {
    fn drop(&mut self) {
        self.scheduler.complete();
    }
}
