//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawl engine:
//! - SQLite database initialization and schema management
//! - Task lifecycle (create, stats snapshots, finalization)
//! - Downloaded resource records
//! - Error log records

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, Store};

use crate::HarvestError;
use std::path::Path;

/// Opens or creates a storage database at the given path
pub fn open_store(path: &Path) -> Result<SqliteStore, HarvestError> {
    SqliteStore::new(path)
}

/// Terminal and in-flight status of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Completed,
    Stopped,
    Failed,
}

impl TaskStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "stopped" => Some(Self::Stopped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Category of a downloaded resource
///
/// Stylesheets and scripts share the `others` counter column and save
/// directory; the remaining variants each have their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    Image,
    Video,
    Audio,
    Document,
    Stylesheet,
    Script,
}

impl ResourceCategory {
    /// Directory under the save path, also stored in `resources.resource_type`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
            Self::Audio => "audios",
            Self::Document => "documents",
            Self::Stylesheet | Self::Script => "others",
        }
    }
}

/// In-memory mirror of a task row's counter block
///
/// Snapshot-persisted via `Store::update_task_stats` (last write wins),
/// never written incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlCounters {
    pub pages: u32,
    pub images: u32,
    pub videos: u32,
    pub audios: u32,
    pub documents: u32,
    pub others: u32,
    pub total_size: u64,
    pub errors: u32,
}

impl CrawlCounters {
    /// Records one successfully downloaded resource
    pub fn record_resource(&mut self, category: ResourceCategory, bytes: u64) {
        match category {
            ResourceCategory::Image => self.images += 1,
            ResourceCategory::Video => self.videos += 1,
            ResourceCategory::Audio => self.audios += 1,
            ResourceCategory::Document => self.documents += 1,
            ResourceCategory::Stylesheet | ResourceCategory::Script => self.others += 1,
        }
        self.total_size += bytes;
    }

    /// Total resources downloaded across all categories
    pub fn total_resources(&self) -> u32 {
        self.images + self.videos + self.audios + self.documents + self.others
    }
}

/// One crawl invocation, as persisted in the `tasks` table
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: i64,
    pub url: String,
    pub save_path: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub status: TaskStatus,
    pub counters: CrawlCounters,
    pub config: String,
}

/// One successfully downloaded artifact, as persisted in `resources`
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub id: i64,
    pub task_id: i64,
    pub url: String,
    pub filepath: String,
    pub resource_type: String,
    pub file_size: u64,
    pub download_time: String,
}

/// One recorded error, as persisted in `error_logs`
///
/// The URL is empty for task-level errors with no offending URL.
#[derive(Debug, Clone)]
pub struct ErrorLogRecord {
    pub id: i64,
    pub task_id: i64,
    pub url: String,
    pub error_message: String,
    pub error_time: String,
}
