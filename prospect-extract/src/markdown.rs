//! Markup normalizer: rendered page source → markdown-like text.
//!
//! The output keeps the structural cues (headings, links, lists, tables)
//! that the downstream heuristics depend on, while flattening everything
//! else to plain text. The walk is a pure function over the parsed tree,
//! so the same snapshot always yields the same string.

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Landmarks tried in content mode before falling back to the full body.
const MAIN_CONTENT_SELECTORS: &str = "main, article, [role=\"main\"], .content, #content";

/// Subtrees that never contribute readable text.
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "noscript", "iframe", "svg"];

static BODY: OnceLock<Selector> = OnceLock::new();
static MAIN: OnceLock<Selector> = OnceLock::new();
static TABLE_ROWS: OnceLock<Selector> = OnceLock::new();
static TABLE_CELLS: OnceLock<Selector> = OnceLock::new();

fn selector(cell: &'static OnceLock<Selector>, css: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).unwrap())
}

/// Convert page source into normalized markdown-like text.
///
/// With `full_page` set the entire body is walked (contact details often
/// live in headers and footers); otherwise a main-content landmark is
/// preferred when one exists.
pub fn normalize_html(html: &str, full_page: bool) -> String {
    let doc = Html::parse_document(html);
    let body = doc.select(selector(&BODY, "body")).next();
    let target = if full_page {
        body
    } else {
        doc.select(selector(&MAIN, MAIN_CONTENT_SELECTORS))
            .next()
            .or(body)
    };

    let mut out = String::new();
    if let Some(el) = target {
        render_children(el, &mut out);
    }
    tidy(&out)
}

fn render_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    render_element(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn inner_markdown(el: ElementRef<'_>) -> String {
    let mut s = String::new();
    render_children(el, &mut s);
    s
}

/// Concatenated descendant text, markup ignored (the `textContent` view).
fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn render_element(el: ElementRef<'_>, out: &mut String) {
    let tag = el.value().name();
    if SKIPPED_TAGS.contains(&tag) {
        return;
    }
    if hidden_by_inline_style(el) {
        return;
    }

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag.as_bytes()[1] - b'0';
            out.push('\n');
            for _ in 0..level {
                out.push('#');
            }
            out.push(' ');
            out.push_str(&inner_markdown(el));
            out.push('\n');
        }
        "p" => {
            out.push('\n');
            out.push_str(&inner_markdown(el));
            out.push('\n');
        }
        "br" => out.push('\n'),
        "hr" => out.push_str("\n---\n"),
        "strong" | "b" => {
            out.push_str("**");
            out.push_str(&inner_markdown(el));
            out.push_str("**");
        }
        "em" | "i" => {
            out.push('*');
            out.push_str(&inner_markdown(el));
            out.push('*');
        }
        "a" => {
            // An empty href attribute counts as absent.
            let href = el.value().attr("href").filter(|h| !h.is_empty());
            let text = inner_markdown(el).trim().to_string();
            match href {
                Some(href) if !text.is_empty() => {
                    out.push_str(&format!("[{text}]({href})"));
                }
                Some(href) => out.push_str(&format!("[{href}]({href})")),
                None => out.push_str(&text),
            }
        }
        "img" => {
            let alt = el.value().attr("alt").unwrap_or("");
            let src = el.value().attr("src").unwrap_or("");
            if !src.is_empty() {
                out.push_str(&format!("![{alt}]({src})"));
            }
        }
        "ul" => {
            out.push('\n');
            for li in direct_list_items(el) {
                out.push_str(&format!("- {}\n", inner_markdown(li).trim()));
            }
        }
        "ol" => {
            out.push('\n');
            for (i, li) in direct_list_items(el).enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, inner_markdown(li).trim()));
            }
        }
        "li" => render_children(el, out),
        "blockquote" => {
            out.push_str(&format!("\n> {}\n", inner_markdown(el).trim()));
        }
        "code" => out.push_str(&format!("`{}`", text_content(el))),
        "pre" => out.push_str(&format!("\n```\n{}\n```\n", text_content(el))),
        "table" => {
            out.push('\n');
            let rows: Vec<ElementRef<'_>> = el.select(selector(&TABLE_ROWS, "tr")).collect();
            for (idx, row) in rows.iter().enumerate() {
                let cells: Vec<String> = row
                    .select(selector(&TABLE_CELLS, "th, td"))
                    .map(|cell| text_content(cell).trim().to_string())
                    .collect();
                out.push_str(&format!("| {} |\n", cells.join(" | ")));
                if idx == 0 {
                    let separator: Vec<&str> = cells.iter().map(|_| "---").collect();
                    out.push_str(&format!("| {} |\n", separator.join(" | ")));
                }
            }
        }
        _ => render_children(el, out),
    }
}

/// A static snapshot carries no computed styles, so visibility is decided
/// from the inline `style` attribute alone.
fn hidden_by_inline_style(el: ElementRef<'_>) -> bool {
    let Some(style) = el.value().attr("style") else {
        return false;
    };
    let compact: String = style
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    compact.contains("display:none") || compact.contains("visibility:hidden")
}

/// Direct `li` children only; deeper list markup renders through the
/// item's own content.
fn direct_list_items(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
}

fn tidy(raw: &str) -> String {
    let squeezed = Regex::new(r"\n{3,}").unwrap().replace_all(raw, "\n\n");
    let spaced = Regex::new(r"[ \t]+").unwrap().replace_all(&squeezed, " ");
    let unindented = Regex::new(r"\n +").unwrap().replace_all(&spaced, "\n");
    unindented.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_paragraphs_and_rules() {
        let html = "<body><h1>Acme Kft</h1><p>Budapest office</p><hr><h3>Team</h3></body>";
        let md = normalize_html(html, true);
        assert_eq!(md, "# Acme Kft\n\nBudapest office\n\n---\n\n### Team");
    }

    #[test]
    fn anchors_fall_back_when_text_or_href_is_missing() {
        let html = concat!(
            "<body>",
            "<a href=\"/contact\">Contact us</a> ",
            "<a href=\"/imprint\"></a> ",
            "<a>just text</a>",
            "</body>"
        );
        let md = normalize_html(html, true);
        assert!(md.contains("[Contact us](/contact)"));
        assert!(md.contains("[/imprint](/imprint)"));
        assert!(md.contains("just text"));
    }

    #[test]
    fn images_require_a_source() {
        let html = "<body><img alt=\"logo\" src=\"/logo.png\"><img alt=\"ghost\"></body>";
        let md = normalize_html(html, true);
        assert!(md.contains("![logo](/logo.png)"));
        assert!(!md.contains("ghost"));
    }

    #[test]
    fn lists_render_direct_items_only() {
        let html = concat!(
            "<body><ul>",
            "<li>First</li>",
            "<li>Second <ul><li>Nested</li></ul></li>",
            "</ul><ol><li>One</li><li>Two</li></ol></body>"
        );
        let md = normalize_html(html, true);
        assert!(md.contains("- First"));
        assert!(md.contains("- Second"));
        assert!(md.contains("1. One"));
        assert!(md.contains("2. Two"));
        // Nested list markup renders inside the parent item's content.
        assert!(md.contains("Nested"));
    }

    #[test]
    fn tables_get_a_separator_after_the_first_row() {
        let html = concat!(
            "<body><table>",
            "<tr><th>City</th><th>Phone</th></tr>",
            "<tr><td>Brno</td><td>+420 123 456 789</td></tr>",
            "</table></body>"
        );
        let md = normalize_html(html, true);
        assert!(md.contains("| City | Phone |"));
        assert!(md.contains("| --- | --- |"));
        assert!(md.contains("| Brno | +420 123 456 789 |"));
    }

    #[test]
    fn hidden_and_skipped_elements_are_dropped() {
        let html = concat!(
            "<body>",
            "<p style=\"display: none\">secret</p>",
            "<p style=\"visibility:hidden\">also secret</p>",
            "<script>var x = 'noise';</script>",
            "<p>visible</p>",
            "</body>"
        );
        let md = normalize_html(html, true);
        assert_eq!(md, "visible");
    }

    #[test]
    fn content_mode_prefers_the_main_landmark() {
        let html = concat!(
            "<body>",
            "<header><p>nav chrome</p></header>",
            "<main><p>the article</p></main>",
            "</body>"
        );
        assert_eq!(normalize_html(html, false), "the article");
        // Full-page mode keeps the header.
        assert!(normalize_html(html, true).contains("nav chrome"));
    }

    #[test]
    fn whitespace_is_collapsed_deterministically() {
        let html = "<body><p>a</p><p></p><p></p><p>b   c</p></body>";
        let first = normalize_html(html, true);
        let second = normalize_html(html, true);
        assert_eq!(first, second);
        assert_eq!(first, "a\n\nb c");
    }

    #[test]
    fn emphasis_and_code_are_wrapped() {
        let html = "<body><p><strong>Call</strong> <em>now</em> <code>+36</code></p></body>";
        let md = normalize_html(html, true);
        assert_eq!(md, "**Call** *now* `+36`");
    }
}
