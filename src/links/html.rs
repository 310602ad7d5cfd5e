// src/links/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Resolution of each href against the page URL is shared with the Markdown
// extractor (see resolve_href in mod.rs).
// =============================================================================

use super::resolve_href;
use scraper::{Html, Selector};
use url::Url;

// Elements whose href points at another page
const LINK_SELECTOR: &str = "a[href], area[href]";

// Extracts all crawlable links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the page (for resolving relative links)
//   ignore_relative: drop hrefs that are not absolute URLs
//
// Returns: absolute URLs in document order (may contain duplicates)
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base_url = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base_url: &str, ignore_relative: bool) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(base_url, error = %e, "invalid base URL, skipping link extraction");
            return Vec::new();
        }
    };

    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(&base, href, ignore_relative))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_html_links(html, "https://example.com", false);
        assert_eq!(links, vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_html_links(html, "https://example.com/page", false);
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_skip_mailto() {
        let html = r#"<a href="mailto:test@example.com">Email</a>"#;
        let links = extract_html_links(html, "https://example.com", false);
        assert!(links.is_empty());
    }

    #[test]
    fn test_multiple_links() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <map><area href="/area" alt=""></map>
        "#;
        let links = extract_html_links(html, "https://example.com/page/", false);
        assert_eq!(links.len(), 4);
    }

    #[test]
    fn test_only_relative_links_with_ignore() {
        let html = r#"
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="contact.html">Contact</a>
        "#;
        let links = extract_html_links(html, "https://example.com/page/", true);
        assert!(links.is_empty());
    }

    #[test]
    fn test_invalid_base_yields_nothing() {
        let html = r#"<a href="/docs">Docs</a>"#;
        assert!(extract_html_links(html, "not a url", false).is_empty());
    }
}
