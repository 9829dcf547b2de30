//! Link extraction from normalized markdown plus contact-page scoring.

use prospect_common::ProspectError;
use prospect_config::HeuristicsConfig;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

/// Awarded for the first matching contact keyword.
const KEYWORD_SCORE: i32 = 10;
/// Awarded when the URL path itself looks like a contact page. Additive
/// with the keyword score.
const PATH_SCORE: i32 = 15;

/// A link discovered in normalized markdown, URL resolved when a base was
/// known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// A link plus its contact-page likelihood.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredLink {
    pub link: Link,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Scans `[text](url)` tokens, strips stray quotes that leak from markup
/// conversion, and resolves URLs against a base.
pub struct LinkExtractor {
    token: Regex,
    quoted_tail: Regex,
    stray_tail: Regex,
    absolute: Regex,
    origin_fallback: Regex,
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self {
            token: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap(),
            quoted_tail: Regex::new(r#"\s*["'][^"']*["']\s*$"#).unwrap(),
            stray_tail: Regex::new(r#"["'\s]+$"#).unwrap(),
            absolute: RegexBuilder::new(r"^https?://")
                .case_insensitive(true)
                .build()
                .unwrap(),
            origin_fallback: RegexBuilder::new(r"^(https?://[^/]+)")
                .case_insensitive(true)
                .build()
                .unwrap(),
        }
    }

    /// Every link in the document, deduplicated by resolved URL; the first
    /// occurrence's text wins.
    pub fn extract(&self, markdown: &str, base_url: &str) -> Vec<Link> {
        if markdown.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for caps in self.token.captures_iter(markdown) {
            let cleaned = self.clean_url(&caps[2], base_url);
            if !seen.insert(cleaned.clone()) {
                continue;
            }
            links.push(Link {
                text: caps[1].to_string(),
                url: cleaned,
            });
        }
        links
    }

    /// Scheme+host of `url`, empty when it cannot be determined.
    fn base_origin(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }
        if let Ok(parsed) = Url::parse(url) {
            if let url::Origin::Tuple(..) = parsed.origin() {
                return parsed.origin().ascii_serialization();
            }
        }
        self.origin_fallback
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    fn clean_url(&self, raw: &str, base_url: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        let cleaned = self.quoted_tail.replace(raw, "");
        let cleaned = self.stray_tail.replace(cleaned.trim(), "");
        let cleaned = cleaned.trim().to_string();

        if self.absolute.is_match(&cleaned) {
            return cleaned;
        }

        if !base_url.is_empty() {
            let base = self.base_origin(base_url);
            if !base.is_empty() {
                if cleaned.starts_with("//") {
                    return format!("https:{cleaned}");
                }
                if cleaned.starts_with('/') {
                    return format!("{base}{cleaned}");
                }
                return format!("{base}/{cleaned}");
            }
        }
        cleaned
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Ranks links by how likely they are to lead to a contact page.
pub struct ContactScorer {
    links: LinkExtractor,
    keywords: Vec<Regex>,
    path: Regex,
}

impl ContactScorer {
    /// Compile the configured keyword and path tables. The tables are
    /// deployment data, so a bad entry surfaces as a configuration error
    /// rather than a panic.
    pub fn new(heuristics: &HeuristicsConfig) -> Result<Self, ProspectError> {
        let keywords = heuristics
            .contact_keywords
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        ProspectError::Config(format!("bad contact keyword `{pattern}`: {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let segments = heuristics
            .contact_paths
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let path = RegexBuilder::new(&format!("/({segments})"))
            .case_insensitive(true)
            .build()
            .map_err(|e| ProspectError::Config(format!("bad contact path table: {e}")))?;

        Ok(Self {
            links: LinkExtractor::new(),
            keywords,
            path,
        })
    }

    /// Score one link. The first keyword hit ends the keyword scan; the
    /// path test runs independently and its score is additive.
    pub fn score_link(&self, link: Link) -> ScoredLink {
        let mut score = 0;
        let mut reasons = Vec::new();
        let haystack = format!("{} {}", link.text, link.url).to_lowercase();

        for keyword in &self.keywords {
            if keyword.is_match(&haystack) {
                score += KEYWORD_SCORE;
                reasons.push(format!("Pattern: {}", keyword.as_str()));
                break;
            }
        }

        let url_path = link.url.to_lowercase();
        if self.path.is_match(&url_path) {
            score += PATH_SCORE;
            reasons.push("URL path match".to_string());
        }

        ScoredLink {
            link,
            score,
            reasons,
        }
    }

    /// All contact-like links in descending score order. Zero-score links
    /// are excluded and ties keep discovery order.
    pub fn find_contact_links(&self, markdown: &str, base_url: &str) -> Vec<ScoredLink> {
        let mut scored: Vec<ScoredLink> = self
            .links
            .extract(markdown, base_url)
            .into_iter()
            .map(|link| self.score_link(link))
            .filter(|s| s.score > 0)
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }
}
