// src/config.rs
// =============================================================================
// Crawl configuration.
//
// CrawlerConfig is what the engine reads. It is built either with the
// `with_*` builder methods or by applying a CrawlOptions record (which is what
// the CLI and the JSON options file produce) through `configure`.
//
// Recognized options:
// - depth: max recursion depth, negative values are floored at 0
// - ignore_relative: only follow links written as absolute URLs
// - user_agent: User-Agent header sent with every fetch
// - max_requests_per_second: throttle ceiling for the crawl's executor
// - should_crawl: predicate filtering discovered links (code only)
// =============================================================================

use crate::error::ConfigError;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_MAX_REQUESTS_PER_SECOND: f64 = 100.0;

// Predicate deciding whether a discovered link becomes a work item
pub type FollowPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

// Spacing between two fetches for a requests-per-second ceiling. Rejects
// rates whose interval doesn't fit in a Duration (zero, negative, NaN, tiny).
pub fn interval_for_rate(rate: f64) -> Result<Duration, ConfigError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConfigError::InvalidRate(rate));
    }
    Duration::try_from_secs_f64(1.0 / rate).map_err(|_| ConfigError::InvalidRate(rate))
}

pub fn default_user_agent() -> String {
    format!("link-crawler/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Clone)]
pub struct CrawlerConfig {
    pub max_depth: usize,
    pub ignore_relative_links: bool,
    pub user_agent: String,
    pub max_requests_per_second: f64,
    pub should_follow: FollowPredicate,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ignore_relative_links: false,
            user_agent: default_user_agent(),
            max_requests_per_second: DEFAULT_MAX_REQUESTS_PER_SECOND,
            should_follow: Arc::new(|_| true),
        }
    }
}

// Closures don't implement Debug, so print everything else
impl fmt::Debug for CrawlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlerConfig")
            .field("max_depth", &self.max_depth)
            .field("ignore_relative_links", &self.ignore_relative_links)
            .field("user_agent", &self.user_agent)
            .field("max_requests_per_second", &self.max_requests_per_second)
            .finish_non_exhaustive()
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_ignore_relative_links(mut self, ignore: bool) -> Self {
        self.ignore_relative_links = ignore;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_requests_per_second(mut self, rate: f64) -> Self {
        self.max_requests_per_second = rate;
        self
    }

    pub fn with_should_follow<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.should_follow = Arc::new(predicate);
        self
    }

    // Applies every option that is set, leaving the rest untouched
    pub fn configure(mut self, options: CrawlOptions) -> Result<Self, ConfigError> {
        if let Some(depth) = options.depth {
            self.max_depth = depth.max(0) as usize;
        }
        if let Some(ignore) = options.ignore_relative {
            self.ignore_relative_links = ignore;
        }
        if let Some(user_agent) = options.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(rate) = options.max_requests_per_second {
            self.max_requests_per_second = rate;
        }
        if let Some(predicate) = options.should_crawl {
            self.should_follow = predicate;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.request_interval()?;
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        self.headers()?;
        Ok(())
    }

    // Headers sent with every fetch
    pub fn headers(&self) -> Result<HeaderMap, ConfigError> {
        let value = HeaderValue::from_str(&self.user_agent)
            .map_err(|_| ConfigError::InvalidUserAgent(self.user_agent.clone()))?;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value);
        Ok(headers)
    }

    // Minimum spacing between two fetches issued by the executor
    pub fn request_interval(&self) -> Result<Duration, ConfigError> {
        interval_for_rate(self.max_requests_per_second)
    }
}

/// Partial configuration, every field optional.
///
/// Deserializable so the CLI can read it from a JSON file. `should_crawl`
/// can only be set from code.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CrawlOptions {
    pub depth: Option<i64>,
    pub ignore_relative: Option<bool>,
    pub user_agent: Option<String>,
    pub max_requests_per_second: Option<f64>,
    #[serde(skip)]
    pub should_crawl: Option<FollowPredicate>,
}

impl fmt::Debug for CrawlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlOptions")
            .field("depth", &self.depth)
            .field("ignore_relative", &self.ignore_relative)
            .field("user_agent", &self.user_agent)
            .field("max_requests_per_second", &self.max_requests_per_second)
            .field("should_crawl", &self.should_crawl.is_some())
            .finish()
    }
}
