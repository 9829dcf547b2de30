use async_trait::async_trait;
use prospect_common::{ProspectError, Result};
use prospect_config::BrowserConfig;
use prospect_drivers::prospect_browser::driver::BrowserSession;
use prospect_extract::markdown::normalize_html;
use prospect_extract::{NormalizedDocument, PageRenderer};
use std::time::Duration;
use tracing::debug;

/// Concrete renderer backed by one shared fantoccini WebDriver session.
///
/// The session is created at process start and reused for every
/// navigation; processing is strictly sequential, so no two renders ever
/// overlap. The navigation timeout bounds a single fetch and never
/// affects the rest of a batch; the settle delay gives in-page scripts
/// time to finish before the source is read.
pub struct FantocciniRenderer {
    session: BrowserSession,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl FantocciniRenderer {
    /// Connect to the configured WebDriver endpoint.
    pub async fn connect(config: &BrowserConfig) -> anyhow::Result<Self> {
        let session = BrowserSession::connect(&config.webdriver_url, config.headless).await?;
        Ok(Self {
            session,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        })
    }

    /// Close the shared WebDriver session.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.session.shutdown().await
    }
}

#[async_trait]
impl PageRenderer for FantocciniRenderer {
    async fn render(&self, url: &str, full_page: bool) -> Result<NormalizedDocument> {
        let page = tokio::time::timeout(self.navigation_timeout, self.session.open(url))
            .await
            .map_err(|_| ProspectError::Timeout)?
            .map_err(|e| ProspectError::Render(e.to_string()))?;

        tokio::time::sleep(self.settle_delay).await;

        let html = page
            .source()
            .await
            .map_err(|e| ProspectError::Render(e.to_string()))?;
        let text = normalize_html(&html, full_page);

        debug!(
            url = %url,
            full_page,
            html_bytes = html.len(),
            text_chars = text.len(),
            "page rendered and normalized"
        );

        Ok(NormalizedDocument {
            url: url.to_string(),
            text,
        })
    }
}
