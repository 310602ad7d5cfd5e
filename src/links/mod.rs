// src/links/mod.rs
// =============================================================================
// This module turns page content into the list of links to crawl next.
//
// Submodules:
// - html: extracts <a href> targets from HTML pages (scraper)
// - markdown: extracts [text](url) targets from Markdown pages (pulldown-cmark)
//
// Both extractors hand raw hrefs to `resolve_href`, which:
// - skips anchors and non-web schemes (mailto:, tel:, javascript:, data:)
// - resolves relative hrefs against the page URL (or drops them when
//   relative links are ignored)
// - strips the #fragment, so page#a and page#b are the same address
// - keeps only http/https results
// =============================================================================

mod html;
mod markdown;

pub use html::extract_html_links;
pub use markdown::extract_markdown_links;

use std::collections::HashSet;
use url::Url;

// What the crawl engine needs from a link extractor.
//
// Given the address a page was fetched from and its content, return the
// absolute addresses it links to, without duplicates. When `ignore_relative`
// is set, hrefs written in relative form must not appear in the result.
pub trait LinkExtractor: Send + Sync + 'static {
    fn extract_links(&self, base_url: &str, content: &str, ignore_relative: bool) -> Vec<String>;
}

// The default extractor: Markdown for .md/.markdown documents, HTML otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupLinkExtractor;

impl LinkExtractor for MarkupLinkExtractor {
    fn extract_links(&self, base_url: &str, content: &str, ignore_relative: bool) -> Vec<String> {
        let links = if is_markdown_document(base_url) {
            extract_markdown_links(content, base_url, ignore_relative)
        } else {
            extract_html_links(content, base_url, ignore_relative)
        };
        dedup_preserving_order(links)
    }
}

fn is_markdown_document(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path().to_ascii_lowercase();
            path.ends_with(".md") || path.ends_with(".markdown")
        }
        Err(_) => false,
    }
}

// Resolves one raw href found on the page at `base`
//
// Returns None for anything that should not be crawled.
pub(crate) fn resolve_href(base: &Url, href: &str, ignore_relative: bool) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Url::parse only succeeds for hrefs that carry their own scheme.
    // Everything else (/docs, ../x, //host/x) is a relative reference.
    let mut url = match Url::parse(href) {
        Ok(url) => url,
        Err(_) if ignore_relative => return None,
        Err(_) => base.join(href).ok()?,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url.to_string())
}

pub(crate) fn dedup_preserving_order(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_resolve_absolute_link() {
        let result = resolve_href(&base(), "https://other.com", false);
        assert_eq!(result, Some("https://other.com/".to_string()));
    }

    #[test]
    fn test_resolve_relative_link() {
        let result = resolve_href(&base(), "/docs", false);
        assert_eq!(result, Some("https://example.com/docs".to_string()));
    }

    #[test]
    fn test_relative_link_dropped_when_ignored() {
        assert_eq!(resolve_href(&base(), "/docs", true), None);
        assert_eq!(resolve_href(&base(), "//cdn.example.com/x", true), None);
        assert_eq!(
            resolve_href(&base(), "https://other.com/x", true),
            Some("https://other.com/x".to_string())
        );
    }

    #[test]
    fn test_skip_anchor_and_special_schemes() {
        assert_eq!(resolve_href(&base(), "#section", false), None);
        assert_eq!(resolve_href(&base(), "mailto:test@example.com", false), None);
        assert_eq!(resolve_href(&base(), "javascript:void(0)", false), None);
        assert_eq!(resolve_href(&base(), "ftp://files.example.com/", false), None);
    }

    #[test]
    fn test_fragment_is_stripped() {
        let result = resolve_href(&base(), "/docs#install", false);
        assert_eq!(result, Some("https://example.com/docs".to_string()));
    }

    #[test]
    fn test_markup_extractor_dedups() {
        let html = r#"
            <a href="/a">A</a>
            <a href="/a#top">A again</a>
            <a href="https://example.com/a">A absolute</a>
            <a href="/b">B</a>
        "#;
        let links = MarkupLinkExtractor.extract_links("https://example.com/", html, false);
        assert_eq!(links, vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_markup_extractor_picks_markdown_by_extension() {
        let markdown = "See [the guide](guide.md) and [Rust](https://www.rust-lang.org).";
        let links =
            MarkupLinkExtractor.extract_links("https://example.com/docs/README.md", markdown, false);
        assert_eq!(
            links,
            vec![
                "https://example.com/docs/guide.md",
                "https://www.rust-lang.org/"
            ]
        );
    }
}
