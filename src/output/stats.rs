//! Statistics gathered during a mirror run
//!
//! Workers record into a lock-free [`StatsRecorder`]; at the end of the run
//! it is frozen into a plain [`MirrorStats`] for reporting.

use crate::crawler::ResourceKind;
use crate::state::TaskOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Mirror statistics summary
#[derive(Debug, Clone)]
pub struct MirrorStats {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When quiescence was observed
    pub finished_at: DateTime<Utc>,

    /// Distinct URLs admitted through the visited set
    pub tasks_enqueued: u64,

    /// Resources written to disk
    pub resources_saved: u64,

    /// Tasks that failed in the transport or on a non-2xx status
    pub network_failures: u64,

    /// Tasks that failed while writing output
    pub store_failures: u64,

    /// Saved resources processed as HTML
    pub pages: u64,

    /// Saved resources processed as CSS
    pub stylesheets: u64,

    /// Saved resources stored byte-for-byte
    pub opaque: u64,

    /// Total bytes written
    pub bytes_written: u64,
}

impl MirrorStats {
    /// Total number of failed tasks
    pub fn total_failures(&self) -> u64 {
        self.network_failures + self.store_failures
    }

    /// Tasks that reached a terminal state
    pub fn tasks_completed(&self) -> u64 {
        self.resources_saved + self.total_failures()
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Concurrent counters updated by workers
#[derive(Debug, Default)]
pub struct StatsRecorder {
    enqueued: AtomicU64,
    saved: AtomicU64,
    network_failures: AtomicU64,
    store_failures: AtomicU64,
    pages: AtomicU64,
    stylesheets: AtomicU64,
    opaque: AtomicU64,
    bytes_written: AtomicU64,
}

impl StatsRecorder {
    /// Records a URL admitted through the visited set
    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a resource written to disk
    pub fn record_saved(&self, kind: ResourceKind, bytes: usize) {
        self.saved.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);

        let counter = match kind {
            ResourceKind::Page => &self.pages,
            ResourceKind::Stylesheet => &self.stylesheets,
            ResourceKind::Opaque => &self.opaque,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed task
    pub fn record_failure(&self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::NetworkFailed => {
                self.network_failures.fetch_add(1, Ordering::Relaxed);
            }
            TaskOutcome::StoreFailed => {
                self.store_failures.fetch_add(1, Ordering::Relaxed);
            }
            TaskOutcome::Saved => {}
        }
    }

    /// Freezes the counters into a summary
    pub fn snapshot(&self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> MirrorStats {
        MirrorStats {
            started_at,
            finished_at,
            tasks_enqueued: self.enqueued.load(Ordering::Relaxed),
            resources_saved: self.saved.load(Ordering::Relaxed),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            pages: self.pages.load(Ordering::Relaxed),
            stylesheets: self.stylesheets.load(Ordering::Relaxed),
            opaque: self.opaque.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// Prints statistics to stdout
///
/// # Arguments
///
/// * `stats` - The statistics to print
pub fn print_statistics(stats: &MirrorStats) {
    println!("=== Mirror Statistics ===\n");

    println!("Started:  {}", stats.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Finished: {}", stats.finished_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "Duration: {:.2}s",
        stats.duration().num_milliseconds() as f64 / 1000.0
    );
    println!();

    println!("Tasks enqueued:  {}", stats.tasks_enqueued);
    println!("Resources saved: {}", stats.resources_saved);
    println!("  Pages:       {}", stats.pages);
    println!("  Stylesheets: {}", stats.stylesheets);
    println!("  Other:       {}", stats.opaque);
    println!("Bytes written:   {}", stats.bytes_written);

    if stats.total_failures() > 0 {
        println!("\nFailures: {}", stats.total_failures());
        println!("  Network: {}", stats.network_failures);
        println!("  Storage: {}", stats.store_failures);
    }
}
