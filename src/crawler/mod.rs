//! Crawler module for fetching and mirroring resources
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching with a bounded timeout
//! - Deduplication, bounded concurrency and quiescence detection
//! - Overall run orchestration

mod engine;
mod fetcher;
mod scheduler;

pub use engine::{mirror, Mirror, MirrorReport};
pub use fetcher::{build_http_client, fetch_url, FetchedResource, ResourceKind};
pub use scheduler::{Scheduler, TaskTicket, DEFAULT_POOL_SIZE};
