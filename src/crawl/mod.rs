// src/crawl/mod.rs
// =============================================================================
// This module handles recursive website crawling.
//
// Features:
// - Depth-limited recursive crawling starting from a URL
// - Every page fetched at most once per crawl
// - Polite crawling: fetches are issued no faster than a configured rate
// - Callbacks per page (success / failure) and once at the very end
//
// Submodules:
// - executor: a generic rate-limited task runner
// - engine: the Crawler itself (visited / in-flight tracking, completion)
// - page: the payloads handed to callbacks
// =============================================================================

mod engine;
mod executor;
mod page;

pub use engine::Crawler;
pub use executor::{RateLimitedExecutor, Task};
pub use page::{
    CrawlEvent, CrawlReport, CrawlRequest, CrawledPage, FailedPage, FailureCallback,
    FinishedCallback, SuccessCallback,
};
