//! Progress/event channel between the orchestrator and its consumer
//!
//! The original design delivered progress through callbacks into the shell;
//! here it is an explicit channel with non-blocking producer semantics: the
//! orchestrator never waits on the consumer, and a consumer that has gone
//! away silently discards events rather than failing the crawl.

use crate::storage::CrawlCounters;
use tokio::sync::mpsc;

/// Events emitted by the orchestrator, in causal loop order
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// Human-readable progress line
    Log(String),

    /// Counter snapshot after a page iteration
    Stats(CrawlCounters),

    /// Terminal event, emitted exactly once per run
    Complete {
        message: String,
        counters: CrawlCounters,
    },
}

/// Producer half of the event channel
#[derive(Clone)]
pub struct EventSender {
    tx: Option<mpsc::UnboundedSender<CrawlEvent>>,
}

impl EventSender {
    /// Creates a connected sender/receiver pair
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Creates a sender that discards every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn log(&self, message: impl Into<String>) {
        self.send(CrawlEvent::Log(message.into()));
    }

    pub fn stats(&self, counters: CrawlCounters) {
        self.send(CrawlEvent::Stats(counters));
    }

    pub fn complete(&self, message: impl Into<String>, counters: CrawlCounters) {
        self.send(CrawlEvent::Complete {
            message: message.into(),
            counters,
        });
    }

    fn send(&self, event: CrawlEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver is not an error for the crawl
            let _ = tx.send(event);
        }
    }
}
