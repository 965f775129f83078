//! Crawl engine
//!
//! This module contains the engine proper:
//! - `frontier`: breadth-first traversal state and domain policy
//! - `renderer`: the page-rendering capability and its HTTP backend
//! - `extractor`: resource and link extraction from rendered content
//! - `downloader`: concurrent, retrying resource fetches
//! - `control`: cooperative pause/stop signalling
//! - `coordinator`: the run loop gluing everything together

pub mod control;
pub mod coordinator;
pub mod downloader;
pub mod extractor;
pub mod frontier;
pub mod renderer;

pub use control::ControlHandle;
pub use coordinator::Coordinator;
pub use downloader::{DownloadOutcome, Downloader, DEFAULT_MAX_RETRIES};
pub use extractor::{extract, Extraction};
pub use frontier::{DomainPolicy, Frontier};
pub use renderer::{HttpRenderer, PageRenderer, RenderError, RenderedPage};

use crate::config::CrawlConfig;
use crate::events::EventSender;
use crate::storage::CrawlCounters;
use crate::HarvestError;

/// Runs a crawl with the HTTP renderer backend
///
/// Convenience wrapper for consumers that do not need custom wiring: events
/// are discarded and no external control is exposed.
pub async fn run_crawl(config: CrawlConfig) -> Result<CrawlCounters, HarvestError> {
    let mut coordinator = Coordinator::new(
        config,
        HttpRenderer::new(),
        EventSender::disabled(),
        ControlHandle::new(),
    )?;
    coordinator.run().await
}
