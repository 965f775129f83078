//! Display helpers for task history and resources
//!
//! Used by the CLI shell; the engine itself only reads these indirectly
//! through `format_size` for log lines.

use crate::storage::Store;
use crate::HarvestError;

/// Formats a byte count for humans
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    let mut value = size as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} PB", value)
}

/// Prints the most recent tasks to stdout
pub fn print_task_history(store: &dyn Store, limit: usize) -> Result<(), HarvestError> {
    let tasks = store.list_tasks(limit)?;

    if tasks.is_empty() {
        println!("No crawl tasks recorded.");
        return Ok(());
    }

    println!("=== Task History ===\n");
    for task in &tasks {
        println!("#{} {} [{}]", task.id, task.url, task.status.to_db_string());
        println!("  started:   {}", task.start_time);
        if let Some(end) = &task.end_time {
            println!("  finished:  {}", end);
        }
        println!(
            "  pages: {}  images: {}  videos: {}  audios: {}  documents: {}  others: {}",
            task.counters.pages,
            task.counters.images,
            task.counters.videos,
            task.counters.audios,
            task.counters.documents,
            task.counters.others,
        );
        println!(
            "  downloaded: {}  errors: {}",
            format_size(task.counters.total_size),
            task.counters.errors
        );
        println!("  save path: {}", task.save_path);
        println!();
    }

    Ok(())
}

/// Prints one task's downloaded resources to stdout
pub fn print_task_resources(store: &dyn Store, task_id: i64) -> Result<(), HarvestError> {
    let task = store.get_task(task_id)?;
    let resources = store.list_resources(task_id)?;

    println!("=== Resources for task #{} ({}) ===\n", task.id, task.url);

    if resources.is_empty() {
        println!("No resources downloaded.");
        return Ok(());
    }

    for resource in &resources {
        println!(
            "[{}] {} ({})",
            resource.resource_type,
            resource.url,
            format_size(resource.file_size)
        );
        println!("  -> {}", resource.filepath);
    }
    println!("\n{} resources total", resources.len());

    Ok(())
}
