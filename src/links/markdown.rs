// src/links/markdown.rs
// =============================================================================
// This module extracts links from Markdown documents.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Is a streaming parser, so large READMEs are cheap
//
// Crawling a docs site served as raw .md files is the main use: relative
// links like [guide](guide.md) are resolved against the document URL.
// =============================================================================

use super::resolve_href;
use pulldown_cmark::{Event, Parser, Tag};
use url::Url;

// Extracts all crawlable link targets from Markdown text
//
// Example input:
//   "Check out [Rust](https://www.rust-lang.org)!"
//
// Example output:
//   vec!["https://www.rust-lang.org/"]
pub fn extract_markdown_links(markdown: &str, base_url: &str, ignore_relative: bool) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(base_url, error = %e, "invalid base URL, skipping link extraction");
            return Vec::new();
        }
    };

    // A link shows up as Start(Link) .. End(Link); the destination is
    // already on the Start event, so that's all we look at
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => Some(dest_url),
            _ => None,
        })
        .filter_map(|dest_url| resolve_href(&base, &dest_url, ignore_relative))
        .collect()
}
