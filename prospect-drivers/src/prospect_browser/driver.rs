use crate::prospect_browser::page::BrowserPage;
use anyhow::Result;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// One session is created at process start and shared for the process
/// lifetime; page processing is strictly sequential, so the session is
/// never driven concurrently.
pub struct BrowserSession {
    pub client: Client,
}

impl BrowserSession {
    /// Connect to a running WebDriver service (Chromedriver by default).
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();

        let mut args = vec![
            "--disable-dev-shm-usage".to_string(),
            "--no-sandbox".to_string(),
            "--disable-gpu".to_string(),
        ];
        if headless {
            args.push("--headless".to_string());
        }
        chrome_opts.insert("args".to_string(), json!(args));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;

        debug!(url = %webdriver_url, headless, "webdriver session established");
        Ok(Self { client })
    }

    /// Navigate to `url` and return a [`BrowserPage`] for reading content.
    pub async fn open(&self, url: &str) -> Result<BrowserPage> {
        let page = BrowserPage::new(self.client.clone());
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    /// Close the session through a shared handle (the fantoccini client is
    /// a cheap clone of the same connection).
    pub async fn shutdown(&self) -> Result<()> {
        self.client.clone().close().await?;
        Ok(())
    }
}
