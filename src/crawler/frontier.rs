//! Crawl frontier: breadth-first traversal state
//!
//! This module owns:
//! - The FIFO queue of `(url, depth)` pairs awaiting a visit
//! - The visited-page set (a URL enters it when dequeued for processing)
//! - The dispatched-resource set (a separate namespace from page URLs)
//! - The processed-page counter used for the page cap
//!
//! All state is in-memory and per-run; the frontier has exactly one owner,
//! the orchestrator, and no concurrent writers.

use crate::config::CrawlConfig;
use crate::crawler::control::ControlHandle;
use crate::url::extract_host;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Breadth-first frontier with dedup sets
#[derive(Default)]
pub struct Frontier {
    queue: VecDeque<(Url, u32)>,

    /// URLs currently sitting in the queue
    queued: HashSet<String>,

    /// Page URLs that have been dequeued for processing
    visited: HashSet<String>,

    /// Resource URLs already handed to the downloader
    dispatched: HashSet<String>,

    pages_processed: u32,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL at the given depth
    ///
    /// No-op if the URL was already visited or is already queued. Two pages
    /// linking to the same not-yet-queued URL enqueue it once; a URL that
    /// slips through is still discarded by the visited check at dequeue time.
    ///
    /// Returns true if the URL was actually added.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        let key = url.as_str().to_string();
        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }
        self.queued.insert(key);
        self.queue.push_back((url, depth));
        true
    }

    /// Removes and returns the oldest queued item
    pub fn dequeue(&mut self) -> Option<(Url, u32)> {
        let (url, depth) = self.queue.pop_front()?;
        self.queued.remove(url.as_str());
        Some((url, depth))
    }

    /// Marks a page URL as visited
    ///
    /// Returns false if it was already visited; the caller discards the item
    /// without processing it.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Marks a resource URL as dispatched to the downloader
    ///
    /// Must be called before fan-out so each resource is fetched at most
    /// once per run. Returns false if it was already dispatched.
    pub fn mark_dispatched(&mut self, url: &Url) -> bool {
        self.dispatched.insert(url.as_str().to_string())
    }

    /// Counts one processed page toward the page cap
    pub fn record_page(&mut self) {
        self.pages_processed += 1;
    }

    pub fn pages_processed(&self) -> u32 {
        self.pages_processed
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Termination check, consulted at every loop boundary
    ///
    /// True when the queue is exhausted, the page cap is reached, or an
    /// external stop has been requested.
    pub fn should_stop(&self, config: &CrawlConfig, control: &ControlHandle) -> bool {
        self.queue.is_empty()
            || self.pages_processed >= config.max_pages
            || control.stop_requested()
    }
}

/// Domain restriction policy for dequeued pages
///
/// When enabled, only URLs whose host exactly equals the start URL's host
/// pass; subdomains are distinct hosts.
pub struct DomainPolicy {
    limit_to: Option<String>,
}

impl DomainPolicy {
    /// Builds the policy for a run
    pub fn new(start_url: &Url, domain_limit: bool) -> Self {
        let limit_to = if domain_limit {
            extract_host(start_url)
        } else {
            None
        };
        Self { limit_to }
    }

    /// Returns true if the URL may be visited under this policy
    pub fn permits(&self, url: &Url) -> bool {
        match &self.limit_to {
            Some(host) => extract_host(url).as_deref() == Some(host.as_str()),
            None => true,
        }
    }
}
