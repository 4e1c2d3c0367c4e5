//! Output module for run reports
//!
//! This module handles:
//! - Recording run statistics while workers are active
//! - Assembling the final report returned by a run
//! - Printing a human-readable summary

pub mod stats;

pub use stats::{print_statistics, MirrorStats, StatsRecorder};

use crate::crawler::ResourceKind;
use crate::state::TaskOutcome;

/// A resource that was written to the mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResource {
    /// Canonical URL the resource was fetched from
    pub url: String,

    /// Path relative to the output root
    pub local_path: String,

    /// How the resource was processed
    pub kind: ResourceKind,

    /// Bytes written
    pub bytes: usize,
}

/// A task that ended without writing output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Canonical URL of the task
    pub url: String,

    /// Which stage failed
    pub outcome: TaskOutcome,

    /// Human-readable reason
    pub reason: String,
}

/// Prints every failure with its URL and reason
pub fn print_failures(failures: &[TaskFailure]) {
    if failures.is_empty() {
        return;
    }

    println!("\nFailed resources:");
    for failure in failures {
        println!("  [{}] {}: {}", failure.outcome, failure.url, failure.reason);
    }
}
