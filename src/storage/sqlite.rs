//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.
//! One connection per store, opened at run start and held for the run's
//! lifetime.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, Store};
use crate::storage::{CrawlCounters, ErrorLogRecord, ResourceRecord, TaskRecord, TaskStatus};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
        Ok(TaskRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            save_path: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            status: TaskStatus::from_db_string(&row.get::<_, String>(5)?)
                .unwrap_or(TaskStatus::Failed),
            counters: CrawlCounters {
                pages: row.get(6)?,
                images: row.get(7)?,
                videos: row.get(8)?,
                audios: row.get(9)?,
                documents: row.get(10)?,
                others: row.get(11)?,
                total_size: row.get::<_, i64>(12)? as u64,
                errors: row.get(13)?,
            },
            config: row.get::<_, Option<String>>(14)?.unwrap_or_default(),
        })
    }
}

const TASK_COLUMNS: &str = "id, url, save_path, start_time, end_time, status, pages, images, \
     videos, audios, documents, others, total_size, errors, config";

impl Store for SqliteStore {
    // ===== Task lifecycle =====

    fn create_task(
        &mut self,
        url: &str,
        save_path: &str,
        config_json: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO tasks (url, save_path, start_time, status, config)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                url,
                save_path,
                now,
                TaskStatus::Running.to_db_string(),
                config_json
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_task_stats(&mut self, task_id: i64, counters: &CrawlCounters) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE tasks SET pages = ?1, images = ?2, videos = ?3, audios = ?4,
             documents = ?5, others = ?6, total_size = ?7, errors = ?8 WHERE id = ?9",
            params![
                counters.pages,
                counters.images,
                counters.videos,
                counters.audios,
                counters.documents,
                counters.others,
                counters.total_size as i64,
                counters.errors,
                task_id
            ],
        )?;
        Ok(())
    }

    fn finish_task(&mut self, task_id: i64, status: TaskStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE tasks SET end_time = ?1, status = ?2 WHERE id = ?3",
            params![now, status.to_db_string(), task_id],
        )?;
        Ok(())
    }

    fn get_task(&self, task_id: i64) -> StorageResult<TaskRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;

        let task = stmt
            .query_row(params![task_id], Self::task_from_row)
            .map_err(|_| StorageError::TaskNotFound(task_id))?;

        Ok(task)
    }

    fn list_tasks(&self, limit: usize) -> StorageResult<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY id DESC LIMIT ?1",
            TASK_COLUMNS
        ))?;

        let tasks = stmt
            .query_map(params![limit as i64], Self::task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    fn delete_task(&mut self, task_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM resources WHERE task_id = ?1",
            params![task_id],
        )?;
        self.conn.execute(
            "DELETE FROM error_logs WHERE task_id = ?1",
            params![task_id],
        )?;
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        Ok(())
    }

    // ===== Resources =====

    fn add_resource(
        &mut self,
        task_id: i64,
        url: &str,
        filepath: &str,
        resource_type: &str,
        file_size: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO resources (task_id, url, filepath, resource_type, file_size, download_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![task_id, url, filepath, resource_type, file_size as i64, now],
        )?;
        Ok(())
    }

    fn list_resources(&self, task_id: i64) -> StorageResult<Vec<ResourceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, url, filepath, resource_type, file_size, download_time
             FROM resources WHERE task_id = ?1 ORDER BY id DESC",
        )?;

        let resources = stmt
            .query_map(params![task_id], |row| {
                Ok(ResourceRecord {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    url: row.get(2)?,
                    filepath: row.get(3)?,
                    resource_type: row.get(4)?,
                    file_size: row.get::<_, i64>(5)? as u64,
                    download_time: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(resources)
    }

    // ===== Errors =====

    fn add_error(&mut self, task_id: i64, url: &str, message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO error_logs (task_id, url, error_message, error_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![task_id, url, message, now],
        )?;
        Ok(())
    }

    fn list_errors(&self, task_id: i64) -> StorageResult<Vec<ErrorLogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, url, error_message, error_time
             FROM error_logs WHERE task_id = ?1 ORDER BY id",
        )?;

        let errors = stmt
            .query_map(params![task_id], |row| {
                Ok(ErrorLogRecord {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    url: row.get(2)?,
                    error_message: row.get(3)?,
                    error_time: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(errors)
    }
}
