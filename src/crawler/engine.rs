//! Mirror engine - run orchestration
//!
//! This module ties the other parts of a run together:
//! - Admitting discovered URLs through the scheduler
//! - Spawning one worker per admitted URL
//! - Fetching, rewriting and persisting each resource
//! - Waiting for quiescence and assembling the report
//!
//! There is no central frontier queue. Each worker enqueues what it
//! discovers by spawning new workers, and the run ends when the scheduler's
//! live-task counter reaches zero.

use crate::config::MirrorConfig;
use crate::crawler::fetcher::{build_http_client, fetch_url, ResourceKind};
use crate::crawler::scheduler::{Scheduler, TaskTicket};
use crate::output::{MirrorStats, SavedResource, StatsRecorder, TaskFailure};
use crate::rewrite::{rewrite_css, rewrite_html, ContentHint, LinkSink, Rewriter};
use crate::state::{TaskOutcome, TaskState};
use crate::storage::{open_store, Store, StoreError};
use crate::url::{canonicalize, parse_seed, to_local_path, HostScope};
use crate::{MirrorError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use url::Url;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct MirrorReport {
    /// Counters and timestamps
    pub stats: MirrorStats,

    /// Tasks that ended without output, sorted by URL
    pub failures: Vec<TaskFailure>,

    /// Resources written, sorted by local path
    pub resources: Vec<SavedResource>,
}

impl MirrorReport {
    /// Returns true if every admitted URL was saved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Looks up the saved resource for a local path
    pub fn resource_at(&self, local_path: &str) -> Option<&SavedResource> {
        self.resources.iter().find(|r| r.local_path == local_path)
    }
}

/// A configured mirror run for one seed URL
///
/// # Example
///
/// ```no_run
/// use site_mirror::{Mirror, MirrorConfig};
///
/// # async fn example() -> site_mirror::Result<()> {
/// let mirror = Mirror::new(MirrorConfig::default(), "https://example.com/")?;
/// let report = mirror.run().await?;
/// println!("saved {} resources", report.stats.resources_saved);
/// # Ok(())
/// # }
/// ```
pub struct Mirror {
    run: Arc<MirrorRun>,
}

impl Mirror {
    /// Creates a run writing to the configured output directory
    ///
    /// # Arguments
    ///
    /// * `config` - A validated mirror configuration
    /// * `seed` - The seed URL; `https://` is assumed if no scheme is given
    ///
    /// # Returns
    ///
    /// * `Ok(Mirror)` - Ready to run
    /// * `Err(MirrorError)` - The seed is unusable or the client failed to build
    pub fn new(config: MirrorConfig, seed: &str) -> Result<Self> {
        let store = open_store(Path::new(&config.mirror.output_dir));
        Self::with_store(config, seed, store)
    }

    /// Creates a run writing to a caller-supplied store
    pub fn with_store(config: MirrorConfig, seed: &str, store: Arc<dyn Store>) -> Result<Self> {
        let seed = parse_seed(seed)?;
        let scope = HostScope::from_url(&seed)?;
        let client = build_http_client(&config)?;

        debug!(
            "Mirror of {} limited to {} with {} workers",
            seed,
            scope.authority(),
            config.mirror.concurrency
        );

        Ok(Self {
            run: Arc::new(MirrorRun {
                seed,
                scope,
                client,
                store,
                scheduler: Arc::new(Scheduler::new(config.mirror.concurrency)),
                stats: StatsRecorder::default(),
                failures: Mutex::new(Vec::new()),
                resources: Mutex::new(Vec::new()),
            }),
        })
    }

    /// The canonical seed URL
    pub fn seed(&self) -> &Url {
        &self.run.seed
    }

    /// Runs the mirror to quiescence
    ///
    /// Individual resource failures are recorded in the report and never
    /// abort the run. Only failing to create the output root is fatal.
    pub async fn run(self) -> Result<MirrorReport> {
        let started_at = Utc::now();
        let run = self.run;

        run.store.ensure_dir("")?;
        info!("Mirroring {} into {}", run.seed, run.store.root().display());

        run.schedule(run.seed.clone(), ContentHint::Page);
        run.scheduler.wait_idle().await;

        let finished_at = Utc::now();
        let report = run.report(started_at, finished_at);

        info!(
            "Mirror completed: {} saved, {} failed in {:.2}s",
            report.stats.resources_saved,
            report.stats.total_failures(),
            report.stats.duration().num_milliseconds() as f64 / 1000.0
        );

        Ok(report)
    }
}

/// Mirrors `seed` into `output_dir` with default settings
///
/// # Example
///
/// ```no_run
/// # async fn example() -> site_mirror::Result<()> {
/// let report = site_mirror::mirror("https://example.com/", "./example").await?;
/// assert!(report.stats.resources_saved > 0);
/// # Ok(())
/// # }
/// ```
pub async fn mirror(seed: &str, output_dir: impl AsRef<Path>) -> Result<MirrorReport> {
    let mut config = MirrorConfig::default();
    config.mirror.output_dir = output_dir.as_ref().to_string_lossy().into_owned();
    Mirror::new(config, seed)?.run().await
}

/// State shared by every worker of one run
struct MirrorRun {
    seed: Url,
    scope: HostScope,
    client: Client,
    store: Arc<dyn Store>,
    scheduler: Arc<Scheduler>,
    stats: StatsRecorder,
    failures: Mutex<Vec<TaskFailure>>,
    resources: Mutex<Vec<SavedResource>>,
}

/// Lifecycle tracking for one worker
struct Task {
    url: Url,
    state: TaskState,
}

impl Task {
    fn admitted(url: Url) -> Self {
        Self {
            url,
            state: TaskState::Enqueued,
        }
    }

    fn transition(&mut self, next: TaskState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(MirrorError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
        Ok(())
    }
}

impl LinkSink for Arc<MirrorRun> {
    fn enqueue(&self, url: Url, hint: ContentHint) {
        self.schedule(url, hint);
    }
}

impl MirrorRun {
    /// Admits a URL and spawns its worker
    ///
    /// Off-host URLs and URLs already admitted in this run are dropped here.
    /// Must be called from within the tokio runtime.
    fn schedule(self: &Arc<Self>, url: Url, hint: ContentHint) {
        let url = match canonicalize(url) {
            Ok(url) => url,
            Err(e) => {
                debug!("Not enqueuing: {}", e);
                return;
            }
        };

        if !self.scope.contains(&url) {
            debug!("Not enqueuing off-host URL {}", url);
            return;
        }

        let Some(ticket) = self.scheduler.admit(&url) else {
            return;
        };

        self.stats.record_enqueued();
        debug!("Enqueued {} as {:?}", url, hint);

        tokio::spawn(Arc::clone(self).process(url, hint, ticket));
    }

    /// Worker body for one admitted URL
    ///
    /// The ticket is dropped last, after everything discovered in the body
    /// has been enqueued.
    async fn process(self: Arc<Self>, url: Url, hint: ContentHint, ticket: TaskTicket) {
        let mut task = Task::admitted(url);
        let outcome = self.execute(&mut task, hint).await;

        if let Err(e) = task.transition(TaskState::Completed(outcome)) {
            error!("{}", e);
        }

        drop(ticket);
    }

    async fn execute(self: &Arc<Self>, task: &mut Task, hint: ContentHint) -> TaskOutcome {
        let permit = match self.scheduler.acquire_slot().await {
            Ok(permit) => permit,
            Err(e) => {
                return self.fail(&task.url, TaskOutcome::NetworkFailed, e.to_string());
            }
        };

        if let Err(e) = task.transition(TaskState::InFlight) {
            error!("{}", e);
        }

        let fetched = match fetch_url(&self.client, &task.url).await {
            Ok(fetched) => fetched,
            Err(e) => return self.fail(&task.url, TaskOutcome::NetworkFailed, e.to_string()),
        };

        let kind = ResourceKind::resolve(fetched.declared_kind, hint);
        debug!(
            "Fetched {} ({} bytes, {}, processing as {})",
            task.url,
            fetched.body.len(),
            fetched.content_type.as_deref().unwrap_or("no content type"),
            kind
        );

        let body = self.rewrite_body(&task.url, kind, fetched.body);
        let local_path = to_local_path(&task.url);
        let bytes = body.len();

        match self.persist(local_path.clone(), body).await {
            Ok(()) => {
                drop(permit);
                info!("Saved {} to {}", task.url, local_path);
                self.stats.record_saved(kind, bytes);
                self.resources.lock().unwrap().push(SavedResource {
                    url: task.url.to_string(),
                    local_path,
                    kind,
                    bytes,
                });
                TaskOutcome::Saved
            }
            Err(e) => self.fail(&task.url, TaskOutcome::StoreFailed, e.to_string()),
        }
    }

    /// Runs the rewriter matching `kind`, enqueuing every same-host reference
    ///
    /// Kept synchronous so the parsed document never lives across an await.
    fn rewrite_body(self: &Arc<Self>, url: &Url, kind: ResourceKind, body: Vec<u8>) -> Vec<u8> {
        let rewriter = Rewriter::new(url, &self.scope, self);
        match kind {
            ResourceKind::Page => rewrite_html(&body, &rewriter),
            ResourceKind::Stylesheet => rewrite_css(&body, &rewriter),
            ResourceKind::Opaque => body,
        }
    }

    /// Writes a resource on the blocking pool
    async fn persist(
        &self,
        local_path: String,
        body: Vec<u8>,
    ) -> std::result::Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.write_file(&local_path, &body))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    fn fail(&self, url: &Url, outcome: TaskOutcome, reason: String) -> TaskOutcome {
        warn!("Failed to mirror {}: {}", url, reason);
        self.stats.record_failure(outcome);
        self.failures.lock().unwrap().push(TaskFailure {
            url: url.to_string(),
            outcome,
            reason,
        });
        outcome
    }

    fn report(&self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> MirrorReport {
        let mut failures = std::mem::take(&mut *self.failures.lock().unwrap());
        failures.sort_by(|a, b| a.url.cmp(&b.url));

        let mut resources = std::mem::take(&mut *self.resources.lock().unwrap());
        resources.sort_by(|a, b| a.local_path.cmp(&b.local_path));

        MirrorReport {
            stats: self.stats.snapshot(started_at, finished_at),
            failures,
            resources,
        }
    }
}
