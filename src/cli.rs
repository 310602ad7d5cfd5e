// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every crawl option can come from a JSON options file (--config) or from a
// flag. Flags win. Anything left unset keeps the library default.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Recursively crawl a website, politely",
    long_about = "link-crawler fetches a page, follows its links up to a maximum depth, \
                  and reports every page it reached. Requests are throttled to a fixed \
                  rate so the target site is never hammered."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    pub url: String,

    /// Maximum crawl depth
    ///
    /// Depth 0 = fetch nothing
    /// Depth 1 = starting page + all pages it links to
    /// Depth 2 = ... + all pages those link to
    #[arg(long, allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Only follow links written as absolute URLs
    #[arg(long)]
    pub ignore_relative: bool,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Maximum number of requests issued per second
    #[arg(long = "max-rps")]
    pub max_requests_per_second: Option<f64>,

    /// Only follow links on the starting URL's host
    #[arg(long)]
    pub same_domain: bool,

    /// JSON file with crawl options (depth, ignoreRelative, userAgent,
    /// maxRequestsPerSecond)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}
