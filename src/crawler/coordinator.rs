//! Crawl coordinator - main orchestration logic
//!
//! This module contains the run loop that glues the frontier, renderer,
//! extractor, downloader, persistence store, and event channel together:
//! - Sequential page visitation (one renderer session, never parallel)
//! - Per-page concurrent download fan-out, bounded by a semaphore
//! - Cooperative pause/stop, polled at page boundaries
//! - Stats aggregation and best-effort persistence

use crate::config::CrawlConfig;
use crate::crawler::control::ControlHandle;
use crate::crawler::downloader::{DownloadOutcome, Downloader};
use crate::crawler::extractor::extract;
use crate::crawler::frontier::{DomainPolicy, Frontier};
use crate::crawler::renderer::PageRenderer;
use crate::events::EventSender;
use crate::storage::{open_store, CrawlCounters, ResourceCategory, Store, TaskStatus};
use crate::url::file_name_for;
use crate::HarvestError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Poll interval while paused
const PAUSE_POLL: Duration = Duration::from_millis(500);

/// One resource scheduled for download
struct DownloadJob {
    url: Url,
    category: ResourceCategory,
    dest: PathBuf,
}

/// Main crawl coordinator
///
/// Owns every piece of per-run state. The page loop is strictly sequential;
/// only the download batch inside one page iteration parallelizes, and it
/// fans back in before stats are updated.
pub struct Coordinator<R: PageRenderer> {
    config: Arc<CrawlConfig>,
    store: Box<dyn Store>,
    frontier: Frontier,
    policy: DomainPolicy,
    renderer: R,
    downloader: Arc<Downloader>,
    download_slots: Arc<Semaphore>,
    events: EventSender,
    control: ControlHandle,
    counters: CrawlCounters,
    task_id: i64,
    start_url: Url,
}

impl<R: PageRenderer> Coordinator<R> {
    /// Creates a new coordinator and its task record
    ///
    /// Validates the configuration, opens the persistence store, and writes
    /// the task row in `running` status. The renderer session itself is not
    /// established until `run`.
    pub fn new(
        config: CrawlConfig,
        renderer: R,
        events: EventSender,
        control: ControlHandle,
    ) -> Result<Self, HarvestError> {
        crate::config::validate(&config)?;

        let start_url = Url::parse(&config.start_url)?;
        let policy = DomainPolicy::new(&start_url, config.domain_limit);

        let mut store = open_store(&config.database_path)?;

        let config_json = serde_json::to_string(&config).unwrap_or_default();
        let task_id = store.create_task(
            &config.start_url,
            &config.save_path.display().to_string(),
            &config_json,
        )?;

        let downloader = Arc::new(Downloader::new()?);
        let download_slots = Arc::new(Semaphore::new(config.max_concurrent_downloads as usize));

        Ok(Self {
            config: Arc::new(config),
            store: Box::new(store),
            frontier: Frontier::new(),
            policy,
            renderer,
            downloader,
            download_slots,
            events,
            control,
            counters: CrawlCounters::default(),
            task_id,
            start_url,
        })
    }

    /// The task ID of this run
    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    /// Runs the crawl to a terminal state
    ///
    /// Establishes the renderer session, seeds the frontier with the start
    /// URL, and drives the page loop until the frontier reports exhaustion
    /// or a stop is observed. The only fatal fault is a renderer session
    /// that cannot be established; every other error is recorded and the
    /// loop continues.
    pub async fn run(&mut self) -> Result<CrawlCounters, HarvestError> {
        self.events
            .log(format!("Starting crawl of {}", self.start_url));

        if let Err(e) = self.renderer.open().await {
            self.record_error("", &format!("renderer session failed: {}", e));
            self.finalize(TaskStatus::Failed, format!("Crawl failed: {}", e))
                .await;
            return Err(e.into());
        }

        self.frontier.enqueue(self.start_url.clone(), 0);
        self.crawl_loop().await;

        let status = if self.control.stop_requested() {
            TaskStatus::Stopped
        } else {
            TaskStatus::Completed
        };
        let message = format!(
            "Crawl {}: {} pages, {} resources, {} errors",
            status.to_db_string(),
            self.counters.pages,
            self.counters.total_resources(),
            self.counters.errors
        );
        self.finalize(status, message).await;

        Ok(self.counters)
    }

    /// Main page loop
    ///
    /// Pause and stop are cooperative: both are checked here, at iteration
    /// boundaries, never inside an in-flight render or download batch.
    async fn crawl_loop(&mut self) {
        loop {
            while self.control.is_paused() && !self.control.stop_requested() {
                tokio::time::sleep(PAUSE_POLL).await;
            }

            if self.frontier.should_stop(&self.config, &self.control) {
                if self.frontier.pages_processed() >= self.config.max_pages {
                    self.events.log(format!(
                        "Reached page cap of {}",
                        self.config.max_pages
                    ));
                }
                break;
            }

            let Some((url, depth)) = self.frontier.dequeue() else {
                break;
            };

            // Dequeue-time discards: not counted, not errors
            if depth > self.config.max_depth {
                continue;
            }
            if !self.policy.permits(&url) {
                tracing::debug!("Skipping {} (outside start domain)", url);
                continue;
            }
            if !self.frontier.mark_visited(&url) {
                continue;
            }

            self.frontier.record_page();
            self.counters.pages += 1;
            self.events
                .log(format!("[{}] Fetching {}", self.counters.pages, url));

            self.visit_page(&url, depth).await;

            self.push_stats();

            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }
    }

    /// Renders one page, downloads its resources, enqueues its links
    async fn visit_page(&mut self, url: &Url, depth: u32) {
        let timeout = Duration::from_millis(self.config.navigation_timeout_ms);

        let page = match self.renderer.navigate(url, timeout).await {
            Ok(page) => page,
            Err(e) => {
                self.record_error(url.as_str(), &e.to_string());
                return;
            }
        };

        if !page.is_success() {
            self.record_error(url.as_str(), &format!("HTTP {}", page.status));
            return;
        }

        let extraction = extract(&page.content, &page.final_url, &self.config.resources);

        self.download_batch(extraction.resources).await;

        if depth < self.config.max_depth {
            for link in extraction.links {
                self.frontier.enqueue(link, depth + 1);
            }
        }
    }

    /// Fans out downloads for one page's resources and fans back in
    ///
    /// The dispatched-set gate runs single-threaded before the fan-out, so
    /// each resource URL is fetched at most once per run. Results are
    /// recorded after the join; the store and counters are only ever touched
    /// from this task.
    async fn download_batch(&mut self, resources: Vec<(Url, ResourceCategory)>) {
        let mut jobs = Vec::new();
        for (url, category) in resources {
            if !self.frontier.mark_dispatched(&url) {
                continue;
            }
            let dest = self
                .config
                .save_path
                .join(category.dir_name())
                .join(file_name_for(&url));
            jobs.push(DownloadJob {
                url,
                category,
                dest,
            });
        }

        if jobs.is_empty() {
            return;
        }

        let mut batch = JoinSet::new();
        for job in jobs {
            let downloader = Arc::clone(&self.downloader);
            let slots = Arc::clone(&self.download_slots);
            let max_retries = self.config.max_retries;

            batch.spawn(async move {
                let _permit = match slots.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            job,
                            DownloadOutcome::Failed {
                                reason: "download pool closed".to_string(),
                            },
                        )
                    }
                };
                let outcome = downloader.download(&job.url, &job.dest, max_retries).await;
                (job, outcome)
            });
        }

        while let Some(joined) = batch.join_next().await {
            let Ok((job, outcome)) = joined else {
                continue;
            };

            match outcome {
                DownloadOutcome::Downloaded { bytes } => {
                    self.counters.record_resource(job.category, bytes);
                    if let Err(e) = self.store.add_resource(
                        self.task_id,
                        job.url.as_str(),
                        &job.dest.display().to_string(),
                        job.category.dir_name(),
                        bytes,
                    ) {
                        tracing::warn!("Failed to record resource {}: {}", job.url, e);
                    }
                    self.events.log(format!(
                        "Downloaded {} ({})",
                        job.dest.display(),
                        crate::output::format_size(bytes)
                    ));
                }
                DownloadOutcome::Skipped => {
                    tracing::debug!("Already present, skipping {}", job.url);
                }
                DownloadOutcome::Failed { reason } => {
                    self.record_error(job.url.as_str(), &format!("download failed: {}", reason));
                }
            }
        }
    }

    /// Records a non-fatal error: counter, error table, event log
    fn record_error(&mut self, url: &str, message: &str) {
        self.counters.errors += 1;
        if let Err(e) = self.store.add_error(self.task_id, url, message) {
            tracing::warn!("Failed to persist error record: {}", e);
        }
        if url.is_empty() {
            self.events.log(format!("Error: {}", message));
        } else {
            self.events.log(format!("Error: {} - {}", url, message));
        }
    }

    /// Reconciles the task row with the in-memory counters and emits a
    /// stats event
    ///
    /// Persistence failures are logged to the process log only; the crawl
    /// continues on its in-memory state.
    fn push_stats(&mut self) {
        if let Err(e) = self.store.update_task_stats(self.task_id, &self.counters) {
            tracing::warn!("Failed to persist stats: {}", e);
        }
        self.events.stats(self.counters);
    }

    /// Releases the renderer session and finalizes the task exactly once
    async fn finalize(&mut self, status: TaskStatus, message: String) {
        self.renderer.close().await;

        if let Err(e) = self.store.update_task_stats(self.task_id, &self.counters) {
            tracing::warn!("Failed to persist final stats: {}", e);
        }
        if let Err(e) = self.store.finish_task(self.task_id, status) {
            tracing::warn!("Failed to finalize task: {}", e);
        }

        self.events.complete(message, self.counters);
    }
}
