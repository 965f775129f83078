//! Page renderer capability
//!
//! The engine never talks to a concrete browser engine; it consumes a
//! navigation capability behind the `PageRenderer` trait so that any
//! headless-browser or HTTP+HTML-parse backend can satisfy it. The shipped
//! backend is `HttpRenderer`, a plain HTTP fetch whose response body stands
//! in for the rendered DOM.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a renderer backend
#[derive(Debug, Error)]
pub enum RenderError {
    /// The underlying session could not be established; fatal to the run
    #[error("renderer session could not be established: {0}")]
    Session(String),

    /// Navigation did not finish within the timeout
    #[error("navigation timeout for {url}")]
    Timeout { url: String },

    /// Navigation failed below the HTTP layer
    #[error("navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },
}

/// Result of navigating to one page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// HTTP status of the final response
    pub status: u16,

    /// URL after redirects; relative references resolve against this
    pub final_url: Url,

    /// Rendered page content
    pub content: String,
}

impl RenderedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Navigation capability consumed by the orchestrator
///
/// One session per run: `open` is called once before the first page and a
/// failure there is the engine's only fatal fault; `close` is called on
/// every exit path.
#[async_trait]
pub trait PageRenderer: Send {
    /// Establishes the rendering session
    async fn open(&mut self) -> Result<(), RenderError>;

    /// Navigates to a URL with a bounded timeout and returns the rendered page
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError>;

    /// Releases the session
    async fn close(&mut self);
}

/// HTTP-backed renderer
///
/// Satisfies the capability with a GET through a connection-reusing client.
/// The `headless` toggle has no meaning for this backend and is ignored;
/// it is part of the run configuration for backends that do show a window.
pub struct HttpRenderer {
    client: Option<Client>,
}

impl HttpRenderer {
    pub fn new() -> Self {
        Self { client: None }
    }
}

impl Default for HttpRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the HTTP client used for page navigation
fn build_page_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("harvestman/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn open(&mut self) -> Result<(), RenderError> {
        let client = build_page_client().map_err(|e| RenderError::Session(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RenderError::Session("navigate called before open".to_string()))?;

        let response = client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_navigation_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        let content = response
            .text()
            .await
            .map_err(|e| classify_navigation_error(url, e))?;

        Ok(RenderedPage {
            status,
            final_url,
            content,
        })
    }

    async fn close(&mut self) {
        self.client = None;
    }
}

fn classify_navigation_error(url: &Url, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
        }
    } else {
        RenderError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
