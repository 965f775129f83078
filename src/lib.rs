//! Harvestman: a breadth-first site harvester
//!
//! This crate implements a crawl engine that walks a site graph breadth-first,
//! renders pages through a pluggable renderer backend, extracts embedded
//! resource references, downloads them concurrently with deduplication, and
//! persists tasks, resources, and errors to SQLite.

pub mod config;
pub mod crawler;
pub mod events;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Harvestman operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer error: {0}")]
    Render(#[from] crawler::RenderError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Harvestman operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{ControlHandle, Coordinator, HttpRenderer, PageRenderer};
pub use events::{CrawlEvent, EventSender};
pub use storage::{CrawlCounters, ResourceCategory, TaskStatus};
