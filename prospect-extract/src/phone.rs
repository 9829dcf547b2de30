//! Locale-aware phone recognition.
//!
//! Each locale is an ordered family of `(pattern, normalizer)` pairs.
//! Matches normalize into a canonical `+<country code> <groups>` display
//! string and deduplicate by digit signature, because the same number is
//! routinely written several ways on one page. The three priority locales
//! (HU, SK, CZ) run first and seed the exclusion set handed to the
//! generic EU fallback.

use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashSet;

/// A recognized phone number in canonical display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneMatch {
    pub number: String,
    pub country: &'static str,
}

/// Per-locale breakdown of one recognition pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PhoneBreakdown {
    pub all: Vec<PhoneMatch>,
    pub hu: Vec<PhoneMatch>,
    pub sk: Vec<PhoneMatch>,
    pub cz: Vec<PhoneMatch>,
    pub eu: Vec<PhoneMatch>,
}

impl PhoneBreakdown {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// A phone match's digits only, the deduplication key.
pub fn digit_signature(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

type Normalizer = fn(&Captures<'_>) -> String;

struct PhonePattern {
    regex: Regex,
    /// National-format patterns (no country-code prefix) must not match a
    /// substring of a longer number. The `regex` crate has no lookarounds,
    /// so adjacency is checked against the text instead.
    guarded: bool,
    normalize: Normalizer,
}

impl PhonePattern {
    fn new(pattern: &str, guarded: bool, normalize: Normalizer) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            guarded,
            normalize,
        }
    }
}

fn touches_digit(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
}

/// One priority locale: ordered patterns plus a valid signature range.
pub struct LocaleRecognizer {
    country: &'static str,
    min_digits: usize,
    max_digits: usize,
    patterns: Vec<PhonePattern>,
}

impl LocaleRecognizer {
    pub fn hungarian() -> Self {
        Self {
            country: "HU",
            min_digits: 10,
            max_digits: 12,
            patterns: vec![
                PhonePattern::new(
                    r"\+36[\s.-]?(\d{1,2})[\s.-]?(\d{3})[\s.-]?(\d{3,4})",
                    false,
                    |c| format!("+36 {} {} {}", &c[1], &c[2], &c[3]),
                ),
                PhonePattern::new(
                    r"00[\s.-]?36[\s.-]?(\d{1,2})[\s.-]?(\d{3})[\s.-]?(\d{3,4})",
                    false,
                    |c| format!("+36 {} {} {}", &c[1], &c[2], &c[3]),
                ),
                PhonePattern::new(
                    r"06[\s.-]?(1|20|30|31|50|70)[\s.-]?(\d{3})[\s.-]?(\d{3,4})",
                    true,
                    |c| format!("+36 {} {} {}", &c[1], &c[2], &c[3]),
                ),
                PhonePattern::new(r"\(06[\s.-]?1\)[\s.-]?(\d{3})[\s.-]?(\d{4})", false, |c| {
                    format!("+36 1 {} {}", &c[1], &c[2])
                }),
                PhonePattern::new(
                    r"36[\s.-]?(1|20|30|31|50|70)[\s.-]?(\d{3})[\s.-]?(\d{3,4})",
                    true,
                    |c| format!("+36 {} {} {}", &c[1], &c[2], &c[3]),
                ),
            ],
        }
    }

    pub fn slovak() -> Self {
        Self {
            country: "SK",
            min_digits: 11,
            max_digits: 13,
            patterns: vec![
                PhonePattern::new(
                    r"\+421[\s.-]?(\d{1,3})[\s.-]?(\d{3})[\s.-]?(\d{3})",
                    false,
                    |c| format!("+421 {} {} {}", &c[1], &c[2], &c[3]),
                ),
                PhonePattern::new(
                    r"00[\s.-]?421[\s.-]?(\d{1,3})[\s.-]?(\d{3})[\s.-]?(\d{3})",
                    false,
                    |c| format!("+421 {} {} {}", &c[1], &c[2], &c[3]),
                ),
                // Mobile prefixes 09xx.
                PhonePattern::new(r"0(9[01456789]\d)[\s.-]?(\d{3})[\s.-]?(\d{3})", true, |c| {
                    format!("+421 {} {} {}", &c[1], &c[2], &c[3])
                }),
                // Bratislava landlines.
                PhonePattern::new(r"0(2)[\s.-]?(\d{4})[\s.-]?(\d{4})", true, |c| {
                    format!("+421 {} {} {}", &c[1], &c[2], &c[3])
                }),
                // Regional landlines.
                PhonePattern::new(r"0([3-5]\d)[\s.-]?(\d{3})[\s.-]?(\d{4})", true, |c| {
                    format!("+421 {} {} {}", &c[1], &c[2], &c[3])
                }),
            ],
        }
    }

    pub fn czech() -> Self {
        Self {
            country: "CZ",
            min_digits: 11,
            max_digits: 13,
            patterns: vec![
                PhonePattern::new(
                    r"\+420[\s.-]?(\d{3})[\s.-]?(\d{3})[\s.-]?(\d{3})",
                    false,
                    |c| format!("+420 {} {} {}", &c[1], &c[2], &c[3]),
                ),
                PhonePattern::new(
                    r"00[\s.-]?420[\s.-]?(\d{3})[\s.-]?(\d{3})[\s.-]?(\d{3})",
                    false,
                    |c| format!("+420 {} {} {}", &c[1], &c[2], &c[3]),
                ),
                PhonePattern::new(r"420[\s.-]?(\d{3})[\s.-]?(\d{3})[\s.-]?(\d{3})", true, |c| {
                    format!("+420 {} {} {}", &c[1], &c[2], &c[3])
                }),
            ],
        }
    }

    /// Find all matches, accepting only signatures inside the locale's
    /// valid range and not yet present in `seen`. First pattern wins.
    pub fn recognize(&self, text: &str, seen: &mut HashSet<String>) -> Vec<PhoneMatch> {
        let mut results = Vec::new();
        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if pattern.guarded && touches_digit(text, whole.start(), whole.end()) {
                    continue;
                }
                let number = (pattern.normalize)(&caps);
                let signature = digit_signature(&number);
                if signature.len() < self.min_digits || signature.len() > self.max_digits {
                    continue;
                }
                if !seen.insert(signature) {
                    continue;
                }
                results.push(PhoneMatch {
                    number,
                    country: self.country,
                });
            }
        }
        results
    }
}

/// EU country calling codes handled by the generic fallback. The priority
/// codes 36, 421 and 420 are deliberately absent.
const EU_COUNTRY_CODES: [(&str, &str); 24] = [
    ("43", "AT"),
    ("32", "BE"),
    ("359", "BG"),
    ("385", "HR"),
    ("357", "CY"),
    ("45", "DK"),
    ("372", "EE"),
    ("358", "FI"),
    ("33", "FR"),
    ("49", "DE"),
    ("30", "GR"),
    ("353", "IE"),
    ("39", "IT"),
    ("371", "LV"),
    ("370", "LT"),
    ("352", "LU"),
    ("356", "MT"),
    ("31", "NL"),
    ("48", "PL"),
    ("351", "PT"),
    ("40", "RO"),
    ("386", "SI"),
    ("34", "ES"),
    ("46", "SE"),
];

const EU_MIN_DIGITS: usize = 9;
const EU_MAX_DIGITS: usize = 15;

/// Generic `+<cc>` / `00<cc>` recognizer for EU numbers outside the
/// priority locales.
pub struct EuFallbackRecognizer {
    patterns: [Regex; 2],
    separator_runs: Regex,
}

impl EuFallbackRecognizer {
    pub fn new() -> Self {
        Self {
            patterns: [
                Regex::new(r"\+(\d{2,3})[\s.-]?(\d[\d\s.-]{5,14}\d)").unwrap(),
                Regex::new(r"00(\d{2,3})[\s.-]?(\d[\d\s.-]{5,14}\d)").unwrap(),
            ],
            separator_runs: Regex::new(r"[\s.-]+").unwrap(),
        }
    }

    fn country_for(code: &str) -> Option<&'static str> {
        EU_COUNTRY_CODES
            .iter()
            .find(|(cc, _)| *cc == code)
            .map(|(_, country)| *country)
    }

    pub fn recognize(&self, text: &str, seen: &mut HashSet<String>) -> Vec<PhoneMatch> {
        let mut results = Vec::new();
        for regex in &self.patterns {
            for caps in regex.captures_iter(text) {
                let Some(country) = Self::country_for(&caps[1]) else {
                    continue;
                };
                let subscriber = self.separator_runs.replace_all(&caps[2], " ");
                let number = format!("+{} {}", &caps[1], subscriber.trim());
                let signature = digit_signature(&number);
                if signature.len() < EU_MIN_DIGITS || signature.len() > EU_MAX_DIGITS {
                    continue;
                }
                if !seen.insert(signature) {
                    continue;
                }
                results.push(PhoneMatch { number, country });
            }
        }
        results
    }
}

impl Default for EuFallbackRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Coordinator threading one exclusion set across all locale families in
/// priority order, so the fallback never duplicates a priority match and
/// no two results in a pass share a signature.
pub struct PhoneExtractor {
    hungarian: LocaleRecognizer,
    slovak: LocaleRecognizer,
    czech: LocaleRecognizer,
    fallback: EuFallbackRecognizer,
}

impl PhoneExtractor {
    pub fn new() -> Self {
        Self {
            hungarian: LocaleRecognizer::hungarian(),
            slovak: LocaleRecognizer::slovak(),
            czech: LocaleRecognizer::czech(),
            fallback: EuFallbackRecognizer::new(),
        }
    }

    /// Run every family over preprocessed text.
    pub fn extract(&self, text: &str) -> PhoneBreakdown {
        let mut seen = HashSet::new();
        let hu = self.hungarian.recognize(text, &mut seen);
        let sk = self.slovak.recognize(text, &mut seen);
        let cz = self.czech.recognize(text, &mut seen);
        let eu = self.fallback.recognize(text, &mut seen);

        let mut all = Vec::with_capacity(hu.len() + sk.len() + cz.len() + eu.len());
        all.extend(hu.iter().cloned());
        all.extend(sk.iter().cloned());
        all.extend(cz.iter().cloned());
        all.extend(eu.iter().cloned());

        PhoneBreakdown { all, hu, sk, cz, eu }
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> PhoneBreakdown {
        PhoneExtractor::new().extract(text)
    }

    #[test]
    fn hungarian_forms_normalize_to_one_canonical_number() {
        let breakdown = extract("Hívjon: +36 20 123 4567 vagy 06 20 123 4567");
        // Two spellings, one digit signature, one result.
        assert_eq!(breakdown.hu.len(), 1);
        assert_eq!(breakdown.hu[0].number, "+36 20 123 4567");
        assert_eq!(breakdown.hu[0].country, "HU");
    }

    #[test]
    fn budapest_parenthesized_form_is_recognized() {
        let breakdown = extract("Telefon: (06 1) 234 5678");
        assert_eq!(breakdown.hu.len(), 1);
        assert_eq!(breakdown.hu[0].number, "+36 1 234 5678");
    }

    #[test]
    fn slovak_mobile_and_international_forms() {
        let breakdown = extract("Call us at +421 910 123 456 alebo 0910 123 456");
        assert_eq!(breakdown.sk.len(), 1);
        assert_eq!(breakdown.sk[0].number, "+421 910 123 456");
        assert_eq!(breakdown.sk[0].country, "SK");
    }

    #[test]
    fn czech_bare_and_double_zero_forms() {
        let breakdown = extract("Volejte 420 123 456 789 nebo 00420 987 654 321");
        assert_eq!(breakdown.cz.len(), 2);
        // Pattern-list order decides result order: the 00-prefixed family
        // runs before the bare national one.
        assert_eq!(breakdown.cz[0].number, "+420 987 654 321");
        assert_eq!(breakdown.cz[1].number, "+420 123 456 789");
    }

    #[test]
    fn national_form_embedded_in_a_longer_digit_run_is_rejected() {
        // A preceding digit means this is a fragment of something longer.
        let breakdown = extract("Ref 906 20 123 4567");
        assert!(breakdown.all.is_empty());

        // Same for a trailing digit.
        let breakdown = extract("06 20 123 45678");
        assert!(breakdown.all.is_empty());
    }

    #[test]
    fn signature_one_short_of_the_locale_minimum_is_dropped() {
        // Nine digits against Hungary's 10-12 range.
        let breakdown = extract("+36 1 123 456");
        assert!(breakdown.hu.is_empty());
        assert!(breakdown.all.is_empty());
    }

    #[test]
    fn priority_locale_number_never_reaches_the_eu_fallback() {
        let breakdown = extract("+36 20 123 4567");
        assert_eq!(breakdown.hu.len(), 1);
        assert!(breakdown.eu.is_empty());
    }

    #[test]
    fn eu_fallback_handles_codes_outside_the_priority_set() {
        let breakdown = extract("Berlin office: +49 30 901820, Paris: 0033 1 23 45 67 89");
        assert_eq!(breakdown.eu.len(), 2);
        assert_eq!(breakdown.eu[0].number, "+49 30 901820");
        assert_eq!(breakdown.eu[0].country, "DE");
        assert_eq!(breakdown.eu[1].country, "FR");
    }

    #[test]
    fn canonical_form_round_trips_through_signature_extraction() {
        let breakdown = extract("Call us at +421 910 123 456");
        assert_eq!(breakdown.sk.len(), 1);
        let canonical = &breakdown.sk[0].number;
        assert_eq!(digit_signature(canonical), "421910123456");

        // Re-running the extractor on its own canonical output converges.
        let again = extract(canonical);
        assert_eq!(again.sk.len(), 1);
        assert_eq!(
            digit_signature(&again.sk[0].number),
            digit_signature(canonical)
        );
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let text = "+36 20 123 4567, 0910 123 456, 420 123 456 789, +49 30 901820";
        let first = extract(text);
        let second = extract(text);
        assert_eq!(first.all, second.all);
    }

    #[test]
    fn no_two_results_share_a_digit_signature() {
        let text = "+421 910 123 456, 00421 910 123 456, 0910 123 456";
        let breakdown = extract(text);
        let mut signatures: Vec<String> = breakdown
            .all
            .iter()
            .map(|p| digit_signature(&p.number))
            .collect();
        signatures.sort();
        signatures.dedup();
        assert_eq!(signatures.len(), breakdown.all.len());
        assert_eq!(breakdown.all.len(), 1);
    }
}