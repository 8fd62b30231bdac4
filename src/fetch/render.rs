//! Rendered HTML fetch through a headless browser
//!
//! Used only as a fallback: every call launches its own Chrome, loads the
//! page, waits for the network to go quiet, snapshots the DOM and tears the
//! browser down again whatever the outcome.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::page::Page;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{HtmlFetcher, RawDocument};
use crate::browser::{BrowserError, BrowserWrapper, create_blank_page, launch_isolated_browser};
use crate::utils::FetchError;
use crate::{BrowserConfig, ScrapeConfig};

/// CDP lifecycle event emitted when a new document starts loading
const LIFECYCLE_INIT: &str = "init";

/// CDP lifecycle event emitted after 500ms with no network connections
const LIFECYCLE_NETWORK_IDLE: &str = "networkIdle";

#[derive(Clone)]
pub struct RenderFetcher {
    browser: BrowserConfig,
    timeout: Duration,
}

impl RenderFetcher {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            browser: config.browser.clone(),
            timeout: config.render_timeout,
        }
    }
}

#[async_trait]
impl HtmlFetcher for RenderFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        info!(url, timeout_ms = self.timeout.as_millis() as u64, "render.fetch.start");

        let wrapper = launch_isolated_browser(&self.browser, self.timeout).await?;
        let result = render_page(&wrapper, url, self.timeout).await;
        wrapper.shutdown().await;

        match result {
            Ok(html) => {
                debug!(url, bytes = html.len(), "render.fetch.ok");
                Ok(RawDocument {
                    html,
                    rendered: true,
                })
            }
            Err(e) => {
                warn!(url, error = %e, "render.fetch.failed");
                Err(e)
            }
        }
    }
}

/// Navigate a fresh page to `url` and return the DOM once the network is idle.
///
/// Navigation and the idle wait share one `timeout` budget.
async fn render_page(
    wrapper: &BrowserWrapper,
    url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    let page = create_blank_page(wrapper).await?;

    let main_frame = match page.mainframe().await {
        Ok(Some(id)) => Some(id.inner().clone()),
        Ok(None) => {
            debug!(url, "No main frame reported, accepting networkIdle from any frame");
            None
        }
        Err(e) => {
            debug!(url, error = %e, "Main frame lookup failed, accepting networkIdle from any frame");
            None
        }
    };

    // Subscribe before navigating so no lifecycle event is missed
    let events = page
        .event_listener::<EventLifecycleEvent>()
        .await
        .map_err(|e| FetchError::Render(format!("failed to subscribe to lifecycle events: {e}")))?;
    let signals = events.map(|event| LifecycleSignal {
        frame_id: event.frame_id.inner().clone(),
        loader_id: event.loader_id.inner().clone(),
        name: event.name.clone(),
    });

    let outcome = tokio::time::timeout(timeout, async {
        page.goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

        if !wait_for_network_idle(signals, main_frame.as_deref()).await {
            debug!(url, "Lifecycle stream ended before networkIdle");
        }

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Render(format!("failed to read page content: {e}")))?;
        Ok::<_, FetchError>(html)
    })
    .await;

    close_page(page).await;

    match outcome {
        Ok(result) => result,
        Err(_) => Err(FetchError::NavigationTimeout {
            timeout_ms: timeout.as_millis() as u64,
            url: url.to_string(),
        }),
    }
}

async fn close_page(page: Page) {
    if let Err(e) = page.close().await {
        debug!("Failed to close render page: {}", e);
    }
}

/// The fields of a CDP `Page.lifecycleEvent` the idle wait needs
#[derive(Debug, Clone, PartialEq, Eq)]
struct LifecycleSignal {
    frame_id: String,
    loader_id: String,
    name: String,
}

/// Wait for `networkIdle` belonging to the most recent main-frame navigation.
///
/// The loader id is taken from the latest `init` so idle signals left over
/// from `about:blank` (or from a document replaced by a client-side redirect)
/// are ignored. Returns false if the stream ends first.
async fn wait_for_network_idle<S>(signals: S, main_frame: Option<&str>) -> bool
where
    S: Stream<Item = LifecycleSignal>,
{
    let mut signals = std::pin::pin!(signals);
    let mut current_loader: Option<String> = None;

    while let Some(signal) = signals.next().await {
        if main_frame.is_some_and(|frame| frame != signal.frame_id) {
            continue;
        }
        match signal.name.as_str() {
            LIFECYCLE_INIT => current_loader = Some(signal.loader_id),
            LIFECYCLE_NETWORK_IDLE
                if current_loader.as_deref() == Some(signal.loader_id.as_str()) =>
            {
                return true;
            }
            _ => {}
        }
    }

    false
}
