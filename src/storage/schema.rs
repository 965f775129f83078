//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Harvestman database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl invocation
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    save_path TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    status TEXT NOT NULL,
    pages INTEGER DEFAULT 0,
    images INTEGER DEFAULT 0,
    videos INTEGER DEFAULT 0,
    audios INTEGER DEFAULT 0,
    documents INTEGER DEFAULT 0,
    others INTEGER DEFAULT 0,
    total_size INTEGER DEFAULT 0,
    errors INTEGER DEFAULT 0,
    config TEXT
);

-- Successfully downloaded artifacts
CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id),
    url TEXT NOT NULL,
    filepath TEXT NOT NULL,
    resource_type TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    download_time TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resources_task ON resources(task_id);

-- Append-only error log
CREATE TABLE IF NOT EXISTS error_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id),
    url TEXT NOT NULL,
    error_message TEXT NOT NULL,
    error_time TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_error_logs_task ON error_logs(task_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
