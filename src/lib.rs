// src/lib.rs
// =============================================================================
// link-crawler: a rate-limited recursive web crawler.
//
// Give it a seed URL and it fetches the page, extracts the links, and keeps
// following them up to a maximum depth, calling you back for every page and
// once more when everything is done.
//
// Modules:
// - config: crawl options (depth, user agent, rate, link filter)
// - crawl: the rate-limited executor and the traversal engine
// - fetch: the Transport trait and the reqwest implementation
// - links: link extraction from HTML and Markdown
// - error: error types
//
// Example:
//   let crawler = Crawler::new(CrawlerConfig::default().with_max_depth(2))?;
//   let report = crawler.run("https://example.com").await?;
//   println!("{} pages", report.pages.len());
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod links;

pub use config::{CrawlOptions, CrawlerConfig};
pub use crawl::{CrawlEvent, CrawlReport, CrawlRequest, CrawledPage, Crawler, FailedPage};
pub use error::{ConfigError, CrawlError, ExecutorError, TransportError};
pub use fetch::{FetchResponse, HttpTransport, Transport};
pub use links::{LinkExtractor, MarkupLinkExtractor};
