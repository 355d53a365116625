//! Rendered page fetching over a headless Chromium engine.
//!
//! One expensive browser engine is shared across a batch; each URL gets
//! its own fresh page that is never reused, so cookies and cached
//! redirects cannot leak between requests. Pages hold OS resources and
//! must be closed on every exit path - [`PageGuard`] makes a leak a
//! type-system problem instead of a discipline problem.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchResult};
use crate::fetch::extract::html_to_text;
use crate::fetch::Fetcher;
use crate::types::config::FetchConfig;
use crate::types::content::{ScrapedContent, MIN_CONTENT_CHARS};

/// A running browser engine and its CDP event loop.
struct Engine {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

/// RAII guard for a browser page.
///
/// chromiumoxide pages have no Drop implementation and require an
/// explicit async `close()` to release their CDP target. The guard
/// prefers the explicit path and falls back to a spawned cleanup task
/// when dropped on an error path.
struct PageGuard {
    page: Option<Page>,
    url: String,
    runtime: tokio::runtime::Handle,
}

impl PageGuard {
    fn new(page: Page, url: impl Into<String>) -> Self {
        Self {
            page: Some(page),
            url: url.into(),
            runtime: tokio::runtime::Handle::current(),
        }
    }

    fn page(&self) -> &Page {
        self.page.as_ref().expect("page already closed")
    }

    /// Close the page, consuming the guard.
    async fn close(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!(url = %self.url, error = %e, "page close failed");
            }
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            let url = std::mem::take(&mut self.url);
            // Fire-and-forget cleanup for error paths; Drop cannot await
            self.runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    debug!(url = %url, error = %e, "page cleanup failed");
                }
            });
        }
    }
}

/// A [`Fetcher`] backed by headless Chromium.
///
/// The engine starts lazily before the first fetch and stays up until
/// [`Fetcher::shutdown`] is called. One fetch = one isolated page.
pub struct BrowserFetcher {
    config: FetchConfig,
    engine: Mutex<Option<Engine>>,
}

impl BrowserFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    /// Create a fetcher with the given config.
    pub fn with_config(config: FetchConfig) -> Self {
        Self {
            config,
            engine: Mutex::new(None),
        }
    }

    /// Launch the browser engine.
    async fn launch(&self) -> FetchResult<Engine> {
        let browser_config = BrowserConfig::builder()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .build()
            .map_err(FetchError::Engine)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Engine(e.to_string()))?;

        // The handler stream drives all CDP traffic and must be polled
        // for the lifetime of the browser
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!("browser engine started");
        Ok(Engine {
            browser,
            handler_task,
        })
    }

    /// Open a fresh page, starting the engine if needed.
    async fn new_page(&self) -> FetchResult<Page> {
        let mut engine = self.engine.lock().await;
        if engine.is_none() {
            *engine = Some(self.launch().await?);
        }
        let engine = engine.as_ref().expect("engine just started");
        engine
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Engine(e.to_string()))
    }

    /// Fetch one URL, with typed failures for diagnostics.
    async fn try_fetch(&self, url: &str) -> FetchResult<ScrapedContent> {
        validate_url(url)?;

        let guard = PageGuard::new(self.new_page().await?, url);

        let navigation = tokio::time::timeout(
            self.config.navigation_timeout,
            guard.page().goto(url),
        )
        .await;

        match navigation {
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            Ok(Err(e)) => {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    details: e.to_string(),
                })
            }
            Ok(Ok(_)) => {}
        }

        // Give client-rendered content a chance to materialize. A
        // latency/completeness heuristic, not a correctness guarantee.
        tokio::time::sleep(self.config.settle_delay).await;

        let html = guard
            .page()
            .content()
            .await
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                details: e.to_string(),
            })?;

        guard.close().await;

        let text = html_to_text(&html);
        let chars = text.chars().count();
        if chars < MIN_CONTENT_CHARS {
            return Err(FetchError::InsufficientContent {
                url: url.to_string(),
                chars,
            });
        }

        Ok(ScrapedContent::new(url, text))
    }
}

/// Reject anything that is not a parseable http(s) URL.
///
/// AI-proposed links are untrusted input; `file://` and friends must
/// never reach the browser.
fn validate_url(url: &str) -> FetchResult<()> {
    let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
        url: url.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(FetchError::InvalidUrl {
            url: url.to_string(),
        }),
    }
}

impl Default for BrowserFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Option<ScrapedContent> {
        match self.try_fetch(url).await {
            Ok(content) => {
                debug!(url = %url, chars = content.content_chars(), "fetched");
                Some(content)
            }
            Err(e) => {
                // Absence is the whole contract; the cause stays in logs
                warn!(url = %url, error = %e, "fetch failed");
                None
            }
        }
    }

    async fn shutdown(&self) {
        let mut engine = self.engine.lock().await;
        if let Some(mut engine) = engine.take() {
            if let Err(e) = engine.browser.close().await {
                warn!(error = %e, "browser close failed");
            }
            let _ = engine.browser.wait().await;
            engine.handler_task.abort();
            info!("browser engine stopped");
        }
    }
}
