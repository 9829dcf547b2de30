//! Email recognition with placeholder and noise filtering.

use regex::Regex;
use std::collections::HashSet;

/// Matches ending in these suffixes are filenames caught by the address
/// grammar, not addresses.
const IMAGE_SUFFIXES: [&str; 3] = [".png", ".jpg", ".svg"];

/// Scans text for addresses and drops the ones that cannot belong to the
/// scraped organization: placeholder domains, third-party service
/// domains, `your...@email.com`-style templates, and digit-heavy strings
/// that are usually tracking tokens.
pub struct EmailExtractor {
    address: Regex,
    digit_run: Regex,
    denylist: Vec<String>,
}

impl EmailExtractor {
    pub fn new(denylist: &[String]) -> Self {
        Self {
            address: Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap(),
            digit_run: Regex::new(r"\d{6,}").unwrap(),
            denylist: denylist.to_vec(),
        }
    }

    /// All unique acceptable addresses, lowercased, in discovery order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for m in self.address.find_iter(text) {
            let email = m.as_str().to_lowercase();

            if seen.contains(&email) {
                continue;
            }
            if self.denylist.iter().any(|domain| email.contains(domain)) {
                continue;
            }
            if email.contains("email.com") && email.starts_with("your") {
                continue;
            }
            if self.digit_run.is_match(&email) {
                continue;
            }
            if IMAGE_SUFFIXES.iter().any(|ext| email.ends_with(ext)) {
                continue;
            }

            seen.insert(email.clone());
            results.push(email);
        }
        results
    }
}
