//! Storage trait and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{CrawlCounters, ErrorLogRecord, ResourceRecord, TaskRecord, TaskStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// All writes are synchronous. Stats updates are last-write-wins snapshots,
/// not deltas, so repeating a call with the same logical state is idempotent.
/// Write failures are non-fatal to a crawl by design: the orchestrator logs
/// them and continues with its in-memory state.
pub trait Store: Send {
    // ===== Task lifecycle =====

    /// Creates a new task in `running` status with a start timestamp
    ///
    /// # Arguments
    ///
    /// * `url` - The start URL of the crawl
    /// * `save_path` - Root directory resources are saved under
    /// * `config_json` - JSON snapshot of the run configuration
    ///
    /// # Returns
    ///
    /// The ID of the newly created task
    fn create_task(&mut self, url: &str, save_path: &str, config_json: &str)
        -> StorageResult<i64>;

    /// Overwrites the task's counter columns with the given snapshot
    fn update_task_stats(&mut self, task_id: i64, counters: &CrawlCounters) -> StorageResult<()>;

    /// Finalizes a task: sets the end timestamp and terminal status
    fn finish_task(&mut self, task_id: i64, status: TaskStatus) -> StorageResult<()>;

    /// Gets a task by ID
    fn get_task(&self, task_id: i64) -> StorageResult<TaskRecord>;

    /// Lists the most recent tasks, newest first
    fn list_tasks(&self, limit: usize) -> StorageResult<Vec<TaskRecord>>;

    /// Deletes a task and its resource/error rows
    ///
    /// Housekeeping surface for the shell; the engine itself never deletes.
    fn delete_task(&mut self, task_id: i64) -> StorageResult<()>;

    // ===== Resources =====

    /// Records one successfully downloaded resource
    fn add_resource(
        &mut self,
        task_id: i64,
        url: &str,
        filepath: &str,
        resource_type: &str,
        file_size: u64,
    ) -> StorageResult<()>;

    /// Lists all resources downloaded by a task, newest first
    fn list_resources(&self, task_id: i64) -> StorageResult<Vec<ResourceRecord>>;

    // ===== Errors =====

    /// Appends an error record; `url` is empty for task-level errors
    fn add_error(&mut self, task_id: i64, url: &str, message: &str) -> StorageResult<()>;

    /// Lists all errors recorded by a task
    fn list_errors(&self, task_id: i64) -> StorageResult<Vec<ErrorLogRecord>>;
}
