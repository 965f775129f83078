use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run configuration for one crawl
///
/// Immutable for the lifetime of a run: the coordinator takes a snapshot at
/// start and never re-reads it. Changing any field requires starting a new
/// run. Unknown fields in the TOML source are rejected at parse time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Traversal root
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Root directory; resources are saved under `<save-path>/<category>/`
    #[serde(rename = "save-path")]
    pub save_path: PathBuf,

    /// Hop limit from the start URL
    #[serde(rename = "max-depth", default = "defaults::max_depth")]
    pub max_depth: u32,

    /// Hard cap on pages rendered
    #[serde(rename = "max-pages", default = "defaults::max_pages")]
    pub max_pages: u32,

    /// Milliseconds paused between page visits
    #[serde(rename = "delay-ms", default = "defaults::delay_ms")]
    pub delay_ms: u64,

    /// Restrict traversal to the start URL's exact host
    #[serde(rename = "domain-limit", default = "defaults::enabled")]
    pub domain_limit: bool,

    /// Renderer visibility, passed through to the backend
    #[serde(default = "defaults::enabled")]
    pub headless: bool,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "defaults::database_path")]
    pub database_path: PathBuf,

    /// Per-page navigation timeout in milliseconds
    #[serde(rename = "navigation-timeout-ms", default = "defaults::navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Ceiling on simultaneous resource transfers within one page
    #[serde(rename = "max-concurrent-downloads", default = "defaults::max_concurrent_downloads")]
    pub max_concurrent_downloads: u32,

    /// Attempts per resource download
    #[serde(rename = "max-retries", default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Per-category collection toggles
    #[serde(default)]
    pub resources: ResourceToggles,
}

/// Independent boolean toggles for each resource category
///
/// A category whose toggle is off is simply not emitted by the extractor:
/// not counted, not downloaded, not logged.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceToggles {
    #[serde(default = "defaults::enabled")]
    pub images: bool,

    #[serde(default)]
    pub videos: bool,

    #[serde(default)]
    pub audios: bool,

    #[serde(default = "defaults::enabled")]
    pub documents: bool,

    #[serde(default)]
    pub stylesheets: bool,

    #[serde(default)]
    pub scripts: bool,
}

impl Default for ResourceToggles {
    fn default() -> Self {
        Self {
            images: true,
            videos: false,
            audios: false,
            documents: true,
            stylesheets: false,
            scripts: false,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn max_depth() -> u32 {
        2
    }

    pub fn max_pages() -> u32 {
        100
    }

    pub fn delay_ms() -> u64 {
        1000
    }

    pub fn enabled() -> bool {
        true
    }

    pub fn database_path() -> PathBuf {
        PathBuf::from("harvestman.db")
    }

    pub fn navigation_timeout_ms() -> u64 {
        30_000
    }

    pub fn max_concurrent_downloads() -> u32 {
        8
    }

    pub fn max_retries() -> u32 {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_gets_defaults() {
        let config: CrawlConfig = toml::from_str(
            r#"
start-url = "https://example.com/"
save-path = "./harvest"
"#,
        )
        .unwrap();

        assert_eq!(config.max_depth, 2);
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.delay_ms, 1000);
        assert!(config.domain_limit);
        assert!(config.headless);
        assert_eq!(config.max_retries, 3);
        assert!(config.resources.images);
        assert!(config.resources.documents);
        assert!(!config.resources.videos);
        assert!(!config.resources.scripts);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<CrawlConfig, _> = toml::from_str(
            r#"
start-url = "https://example.com/"
save-path = "./harvest"
frobnicate = true
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let result: Result<CrawlConfig, _> = toml::from_str(r#"save-path = "./harvest""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_toggle_overrides() {
        let config: CrawlConfig = toml::from_str(
            r#"
start-url = "https://example.com/"
save-path = "./harvest"

[resources]
images = false
scripts = true
"#,
        )
        .unwrap();

        assert!(!config.resources.images);
        assert!(config.resources.scripts);
        // Untouched toggles keep their defaults
        assert!(config.resources.documents);
    }
}
