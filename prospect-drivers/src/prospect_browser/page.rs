use anyhow::Result;
use fantoccini::Client;

/// High-level page wrapper exposing the pieces of WebDriver state the
/// extraction pipeline reads.
pub struct BrowserPage {
    pub(crate) client: Client,
}

impl BrowserPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Navigate to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(anyhow::Error::from)
    }

    /// Return the full page HTML source.
    pub async fn source(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Return the page title.
    pub async fn title(&self) -> Result<String> {
        self.client.title().await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL.
    pub async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }
}
