//! Per-URL orchestration: primary page, optional contact-page fallback.
//!
//! The state machine is deliberately shallow: contacts found on the
//! primary page end the pass at depth 0; otherwise the single best-scored
//! contact link is rendered once at depth 1 and whatever it yields is the
//! final answer. Bounding every source URL to at most two renders keeps
//! worst-case cost predictable.

use crate::document::PageRenderer;
use crate::email::EmailExtractor;
use crate::links::ContactScorer;
use crate::phone::{PhoneBreakdown, PhoneExtractor};
use crate::preprocess::preprocess;
use prospect_config::HeuristicsConfig;
use prospect_common::ProspectError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Provenance of a contact-mode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSource {
    MainPage,
    ContactPage,
    ContactPageFailed,
    NoContactsFound,
}

/// Contact-mode outcome for one source URL.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Semicolon-joined addresses, ready for spreadsheet export.
    pub emails: String,
    /// Semicolon-joined canonical numbers.
    pub phones: String,
    #[serde(rename = "phonesDetailed", skip_serializing_if = "Option::is_none")]
    pub phones_detailed: Option<PhoneBreakdown>,
    #[serde(rename = "countEmails")]
    pub count_emails: usize,
    #[serde(rename = "countPhones")]
    pub count_phones: usize,
    /// 0 when decided from the primary page, 1 when a contact page was
    /// consulted.
    pub depth: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ContactSource>,
    #[serde(rename = "contactPageUrl", skip_serializing_if = "Option::is_none")]
    pub contact_page_url: Option<String>,
    #[serde(rename = "contactPageScore", skip_serializing_if = "Option::is_none")]
    pub contact_page_score: Option<i32>,
}

impl ExtractionResult {
    fn render_failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            error: Some(error),
            emails: String::new(),
            phones: String::new(),
            phones_detailed: None,
            count_emails: 0,
            count_phones: 0,
            depth: 0,
            source: None,
            contact_page_url: None,
            contact_page_score: None,
        }
    }

    fn found(
        url: &str,
        emails: Vec<String>,
        phones: PhoneBreakdown,
        depth: u8,
        source: ContactSource,
    ) -> Self {
        let numbers: Vec<&str> = phones.all.iter().map(|p| p.number.as_str()).collect();
        Self {
            url: url.to_string(),
            success: true,
            error: None,
            emails: emails.join("; "),
            phones: numbers.join("; "),
            count_emails: emails.len(),
            count_phones: phones.all.len(),
            phones_detailed: Some(phones),
            depth,
            source: Some(source),
            contact_page_url: None,
            contact_page_score: None,
        }
    }

    fn empty(url: &str, depth: u8, source: ContactSource) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            error: None,
            emails: String::new(),
            phones: String::new(),
            phones_detailed: None,
            count_emails: 0,
            count_phones: 0,
            depth,
            source: Some(source),
            contact_page_url: None,
            contact_page_score: None,
        }
    }
}

/// Content-mode outcome for one URL: the normalized markdown as-is.
#[derive(Debug, Clone, Serialize)]
pub struct ContentResult {
    pub url: String,
    pub success: bool,
    pub markdown: String,
    #[serde(rename = "contentLength")]
    pub content_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Orchestrates recognizer passes over rendered documents.
///
/// The renderer is an injected capability; the pipeline holds no browser
/// state of its own and re-derives all dedup state per URL.
pub struct ExtractionPipeline {
    renderer: Arc<dyn PageRenderer>,
    phones: PhoneExtractor,
    emails: EmailExtractor,
    scorer: ContactScorer,
    cooldown: Duration,
}

impl ExtractionPipeline {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        heuristics: &HeuristicsConfig,
        cooldown: Duration,
    ) -> Result<Self, ProspectError> {
        Ok(Self {
            renderer,
            phones: PhoneExtractor::new(),
            emails: EmailExtractor::new(&heuristics.email_denylist),
            scorer: ContactScorer::new(heuristics)?,
            cooldown,
        })
    }

    /// Sequential contact extraction over a batch, with the configured
    /// cooldown after each URL to throttle outbound request rate.
    pub async fn contact_batch(&self, urls: &[String]) -> Vec<ExtractionResult> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            results.push(self.contact_one(url).await);
            sleep(self.cooldown).await;
        }
        results
    }

    /// The two-state machine for one source URL.
    pub async fn contact_one(&self, url: &str) -> ExtractionResult {
        let doc = match self.renderer.render(url, true).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(url = %url, error = %e, "primary page failed to render");
                return ExtractionResult::render_failed(url, e.to_string());
            }
        };

        let cleaned = preprocess(&doc.text);
        let phones = self.phones.extract(&cleaned);
        let emails = self.emails.extract(&cleaned);

        if !emails.is_empty() || !phones.is_empty() {
            info!(
                url = %url,
                emails = emails.len(),
                phones = phones.all.len(),
                "contacts found on main page"
            );
            return ExtractionResult::found(url, emails, phones, 0, ContactSource::MainPage);
        }

        let candidates = self.scorer.find_contact_links(&doc.text, url);
        let Some(best) = candidates.first() else {
            info!(url = %url, "no contacts and no contact-page candidates");
            return ExtractionResult::empty(url, 0, ContactSource::NoContactsFound);
        };

        debug!(
            url = %url,
            contact_url = %best.link.url,
            score = best.score,
            "following best contact-page candidate"
        );

        match self.renderer.render(&best.link.url, true).await {
            Err(e) => {
                warn!(url = %url, contact_url = %best.link.url, error = %e, "contact page failed to render");
                let mut result =
                    ExtractionResult::empty(url, 1, ContactSource::ContactPageFailed);
                result.contact_page_url = Some(best.link.url.clone());
                result.error = Some(e.to_string());
                result
            }
            Ok(contact_doc) => {
                let cleaned = preprocess(&contact_doc.text);
                let phones = self.phones.extract(&cleaned);
                let emails = self.emails.extract(&cleaned);
                info!(
                    url = %url,
                    contact_url = %best.link.url,
                    emails = emails.len(),
                    phones = phones.all.len(),
                    "contact page processed"
                );
                let mut result =
                    ExtractionResult::found(url, emails, phones, 1, ContactSource::ContactPage);
                result.contact_page_url = Some(best.link.url.clone());
                result.contact_page_score = Some(best.score);
                result
            }
        }
    }

    /// Sequential content extraction over a batch.
    pub async fn content_batch(&self, urls: &[String]) -> Vec<ContentResult> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            results.push(self.content_one(url).await);
            sleep(self.cooldown).await;
        }
        results
    }

    /// Content mode bypasses every recognizer and returns the normalized
    /// document as-is.
    pub async fn content_one(&self, url: &str) -> ContentResult {
        match self.renderer.render(url, false).await {
            Ok(doc) => ContentResult {
                url: url.to_string(),
                success: true,
                content_length: doc.text.len(),
                markdown: doc.text,
                error: None,
            },
            Err(e) => ContentResult {
                url: url.to_string(),
                success: false,
                markdown: String::new(),
                content_length: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NormalizedDocument;
    use std::collections::HashMap;

    /// Fixture renderer: URL → normalized text or failure message.
    struct MockRenderer {
        pages: HashMap<String, Result<String, String>>,
    }

    impl MockRenderer {
        fn new(pages: &[(&str, Result<&str, &str>)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(url, outcome)| {
                        (
                            url.to_string(),
                            outcome.map(str::to_string).map_err(str::to_string),
                        )
                    })
                    .collect(),
            })
        }
    }

    #[async_trait::async_trait]
    impl PageRenderer for MockRenderer {
        async fn render(
            &self,
            url: &str,
            _full_page: bool,
        ) -> prospect_common::Result<NormalizedDocument> {
            match self.pages.get(url) {
                Some(Ok(text)) => Ok(NormalizedDocument {
                    url: url.to_string(),
                    text: text.clone(),
                }),
                Some(Err(message)) => Err(ProspectError::Render(message.clone())),
                None => Err(ProspectError::Render(format!("no fixture for {url}"))),
            }
        }
    }

    fn pipeline(renderer: Arc<MockRenderer>) -> ExtractionPipeline {
        ExtractionPipeline::new(renderer, &HeuristicsConfig::default(), Duration::ZERO)
            .expect("default heuristics compile")
    }

    #[tokio::test]
    async fn contacts_on_the_primary_page_end_at_depth_zero() {
        let renderer = MockRenderer::new(&[(
            "https://company.sk",
            Ok("Call us at +421 910 123 456 or email sales@company.sk"),
        )]);
        let result = pipeline(renderer).contact_one("https://company.sk").await;

        assert!(result.success);
        assert_eq!(result.depth, 0);
        assert_eq!(result.source, Some(ContactSource::MainPage));
        assert_eq!(result.phones, "+421 910 123 456");
        assert_eq!(result.emails, "sales@company.sk");
        assert_eq!(result.count_phones, 1);
        assert_eq!(result.count_emails, 1);
        let detailed = result.phones_detailed.expect("breakdown present");
        assert_eq!(detailed.sk.len(), 1);
    }

    #[tokio::test]
    async fn fallback_follows_the_top_scored_contact_link() {
        let renderer = MockRenderer::new(&[
            (
                "https://firma.cz",
                Ok("Welcome! [Kontakt](/kontakt) [Pricing](/pricing)"),
            ),
            (
                "https://firma.cz/kontakt",
                Ok("Zavolejte nám: +420 123 456 789"),
            ),
        ]);
        let result = pipeline(renderer).contact_one("https://firma.cz").await;

        assert!(result.success);
        assert_eq!(result.depth, 1);
        assert_eq!(result.source, Some(ContactSource::ContactPage));
        assert_eq!(result.phones, "+420 123 456 789");
        assert_eq!(
            result.contact_page_url.as_deref(),
            Some("https://firma.cz/kontakt")
        );
        assert_eq!(result.contact_page_score, Some(25));
    }

    #[tokio::test]
    async fn no_contacts_and_no_candidates_is_a_successful_empty_result() {
        let renderer = MockRenderer::new(&[(
            "https://quiet.example",
            Ok("Just a landing page. [Pricing](/pricing)"),
        )]);
        let result = pipeline(renderer).contact_one("https://quiet.example").await;

        assert!(result.success);
        assert_eq!(result.depth, 0);
        assert_eq!(result.source, Some(ContactSource::NoContactsFound));
        assert!(result.emails.is_empty());
        assert!(result.phones.is_empty());
    }

    #[tokio::test]
    async fn failed_contact_page_keeps_the_batch_alive() {
        let renderer = MockRenderer::new(&[
            ("https://firma.hu", Ok("Üdvözöljük! [Kapcsolat](/kapcsolat)")),
            ("https://firma.hu/kapcsolat", Err("navigation timed out")),
        ]);
        let result = pipeline(renderer).contact_one("https://firma.hu").await;

        assert!(result.success);
        assert_eq!(result.depth, 1);
        assert_eq!(result.source, Some(ContactSource::ContactPageFailed));
        assert_eq!(
            result.contact_page_url.as_deref(),
            Some("https://firma.hu/kapcsolat")
        );
        assert!(result.error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn primary_render_failure_is_recorded_not_raised() {
        let renderer = MockRenderer::new(&[("https://down.example", Err("connection refused"))]);
        let results = pipeline(renderer)
            .contact_batch(&["https://down.example".to_string()])
            .await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert_eq!(results[0].depth, 0);
        assert!(results[0].error.as_deref().unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn one_bad_url_does_not_stop_the_others() {
        let renderer = MockRenderer::new(&[
            ("https://down.example", Err("connection refused")),
            ("https://up.example", Ok("info@up.example is happy to help")),
        ]);
        let results = pipeline(renderer)
            .contact_batch(&[
                "https://down.example".to_string(),
                "https://up.example".to_string(),
            ])
            .await;

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(results[1].emails, "info@up.example");
    }

    #[tokio::test]
    async fn content_mode_returns_markdown_untouched() {
        let text = "# Heading\n\nBody with https://example.org/link kept verbatim";
        let renderer = MockRenderer::new(&[("https://site.example", Ok(text))]);
        let result = pipeline(renderer).content_one("https://site.example").await;

        assert!(result.success);
        assert_eq!(result.markdown, text);
        assert_eq!(result.content_length, text.len());
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn content_mode_failure_reports_the_message() {
        let renderer = MockRenderer::new(&[("https://down.example", Err("dns failure"))]);
        let result = pipeline(renderer).content_one("https://down.example").await;

        assert!(!result.success);
        assert_eq!(result.content_length, 0);
        assert_eq!(result.error.as_deref(), Some("Render error: dns failure"));
    }
}
