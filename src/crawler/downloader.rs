//! Concurrent, retrying fetch-and-save primitive
//!
//! One `Downloader` per run, holding one connection-reusing client that is
//! released with the run. Individual downloads retry transient failures
//! with a linearly increasing backoff and treat an already-present
//! destination file as an immediate no-op.

use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default number of attempts per resource
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base unit for the linear backoff between attempts
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Terminal result of one download call
///
/// Failures are ordinary outcomes, not errors: a resource that cannot be
/// fetched never aborts the page or the run.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Fetched and written to disk
    Downloaded { bytes: u64 },

    /// Destination file already existed; nothing was fetched
    Skipped,

    /// All attempts exhausted or the write failed
    Failed { reason: String },
}

/// Resource downloader with a long-lived HTTP client
pub struct Downloader {
    client: Client,
    backoff: Duration,
}

impl Downloader {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_resource_client()?,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Overrides the backoff base, for tests that should not sleep seconds
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Downloads a resource to the given destination path
    ///
    /// Retries up to `max_retries` times on timeout, transport error, or a
    /// non-2xx status, sleeping `attempt x backoff` between attempts. A
    /// non-2xx status on the final attempt is a `Failed` outcome. Parent
    /// directories are created on demand; filesystem write errors fail
    /// immediately without further attempts.
    pub async fn download(&self, url: &Url, dest: &Path, max_retries: u32) -> DownloadOutcome {
        if dest.exists() {
            return DownloadOutcome::Skipped;
        }

        let mut last_error = String::new();

        for attempt in 1..=max_retries.max(1) {
            match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.bytes().await {
                        Ok(body) => return self.write_out(dest, &body).await,
                        Err(e) => {
                            last_error = format!("body read failed: {}", e);
                        }
                    }
                }
                Ok(response) => {
                    last_error = format!("HTTP {}", response.status().as_u16());
                }
                Err(e) if e.is_timeout() => {
                    last_error = "request timeout".to_string();
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            if attempt < max_retries {
                tokio::time::sleep(self.backoff * attempt).await;
            }
        }

        DownloadOutcome::Failed { reason: last_error }
    }

    async fn write_out(&self, dest: &Path, body: &[u8]) -> DownloadOutcome {
        if let Some(parent) = dest.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return DownloadOutcome::Failed {
                    reason: format!("create dir failed: {}", e),
                };
            }
        }

        match tokio::fs::write(dest, body).await {
            Ok(()) => DownloadOutcome::Downloaded {
                bytes: body.len() as u64,
            },
            Err(e) => DownloadOutcome::Failed {
                reason: format!("write failed: {}", e),
            },
        }
    }
}

/// Builds the HTTP client used for resource transfers
fn build_resource_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("harvestman/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}
