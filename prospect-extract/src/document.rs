use prospect_common::Result;

/// A rendered page reduced to a markdown-like string plus its source URL.
///
/// Created once per fetch and never mutated afterwards; every recognizer
/// pass re-derives its own working state from the text.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub url: String,
    pub text: String,
}

/// Collaborator port for the browser-automation layer.
///
/// This is the only operation the extraction core depends on: render `url`
/// (full body for contact discovery, main-content region for content mode)
/// and hand back the normalized text, or a failure with a message.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, full_page: bool) -> Result<NormalizedDocument>;
}
