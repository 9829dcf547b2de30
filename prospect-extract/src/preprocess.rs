//! Noise stripping ahead of phone-pattern matching.
//!
//! Dates, times and money amounts share digit groupings with phone
//! numbers, so they are removed before any recognizer runs rather than
//! filtered out afterwards.

use regex::Regex;

/// Replacement passes, applied in order.
const PASSES: [(&str, &str); 9] = [
    // repeated whitespace → single space
    (r"\s+", " "),
    // bare URLs
    (r"https?://[^\s)]+", " "),
    // markdown image references
    (r"!\[[^\]]*\]\([^)]+\)", " "),
    // ISO-like dates (2024-01-31, 2024.1.31, 2024/01/31)
    (r"\b\d{4}[-/.]\d{1,2}[-/.]\d{1,2}\b", " "),
    // day-first dates (31-01-2024, 31.1.2024)
    (r"\b\d{1,2}[-/.]\d{1,2}[-/.]\d{4}\b", " "),
    // times of day (9:30, 09:30:15)
    (r"\b\d{1,2}:\d{2}(?::\d{2})?\b", " "),
    // currency amounts ($12 000, €1,500.00)
    (r"[$€£]\s?\d+[\d\s,.]*\b", " "),
    // spaced dash runs → bare hyphen
    (r"\s*[-–—]\s*", "-"),
    // spaced slashes → bare slash
    (r"\s*/\s*", "/"),
];

/// Return text safe for phone-pattern matching.
pub fn preprocess(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in PASSES {
        out = Regex::new(pattern)
            .unwrap()
            .replace_all(&out, replacement)
            .into_owned();
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(preprocess("a\n\n  b\tc"), "a b c");
    }

    #[test]
    fn strips_urls_and_image_references() {
        let text = "Visit https://example.org/about or ![logo](/img/logo.png) today";
        let cleaned = preprocess(text);
        assert!(!cleaned.contains("https://"));
        assert!(!cleaned.contains("!["));
        assert!(cleaned.starts_with("Visit"));
        assert!(cleaned.ends_with("today"));
    }

    #[test]
    fn removes_dates_and_times() {
        let text = "Opening 2024-03-01 at 9:30, closing 01.03.2024 at 17:45:00";
        let cleaned = preprocess(text);
        assert!(!cleaned.contains("2024"));
        assert!(!cleaned.contains("9:30"));
        assert!(!cleaned.contains("17:45"));
    }

    #[test]
    fn removes_currency_amounts() {
        let cleaned = preprocess("Tickets from €1 500, or $25.00 per head");
        assert!(!cleaned.contains("1 500"));
        assert!(!cleaned.contains("25.00"));
    }

    #[test]
    fn normalizes_spaced_dashes_and_slashes() {
        assert_eq!(preprocess("06 – 20"), "06-20");
        assert_eq!(preprocess("tel / fax"), "tel/fax");
    }

    #[test]
    fn phone_numbers_survive_intact() {
        let cleaned = preprocess("Call +421 910 123 456 today");
        assert!(cleaned.contains("+421 910 123 456"));
    }
}
