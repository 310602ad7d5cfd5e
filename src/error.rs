// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// Each layer gets its own enum so callers can match on what went wrong:
// - ConfigError: bad options (zero rate, empty user agent)
// - TransportError: a single fetch failed at the network level
// - ExecutorError: the rate limiter could not be started
// - CrawlError: a crawl could not be started at all
//
// Page-level failures (404, timeouts, ...) are NOT crawl errors. They are
// reported through the failure callback and the crawl keeps going.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max requests per second must be a positive number, got {0}")]
    InvalidRate(f64),

    #[error("user agent must not be empty")]
    EmptyUserAgent,

    #[error("user agent '{0}' is not a valid header value")]
    InvalidUserAgent(String),
}

/// Why a fetch did not produce a response.
///
/// Cloneable so one error can be handed to the failure callback and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("could not resolve hostname")]
    Dns,

    #[error("SSL certificate error")]
    Tls,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("executor already started")]
    AlreadyStarted,

    #[error("executor must be started from within a tokio runtime")]
    NoRuntime,
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("crawl ended without reporting completion")]
    Aborted,
}
