// src/crawl/page.rs
// =============================================================================
// What the crawl hands back to its caller.
//
// - CrawledPage: a page that answered 200, passed to the success callback
// - FailedPage: a page that errored or answered anything else
// - CrawlEvent / CrawlReport: the awaitable form of the same information,
//   used by Crawler::run
// =============================================================================

use crate::error::TransportError;
use crate::fetch::FetchResponse;
use std::sync::Arc;

/// A page fetched with status 200.
///
/// There is no `body` or `error` field: the raw body is `response.body`
/// (also copied into `content`), and a success never carries an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    pub url: String,
    pub status: u16,
    /// The response body, the same text links were extracted from
    pub content: String,
    pub response: FetchResponse,
}

/// A page whose fetch failed or returned a non-200 status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub url: String,
    /// None when the request never produced a response
    pub status: Option<u16>,
    /// Set for network-level failures, None for a plain bad status
    pub error: Option<TransportError>,
    pub response: Option<FetchResponse>,
}

impl FailedPage {
    pub(crate) fn from_status(url: String, response: FetchResponse) -> Self {
        Self {
            url,
            status: Some(response.status),
            error: None,
            response: Some(response),
        }
    }

    pub(crate) fn from_error(url: String, error: TransportError) -> Self {
        Self {
            url,
            status: None,
            error: Some(error),
            response: None,
        }
    }

    // Human readable reason, e.g. "HTTP 404" or "request timed out"
    pub fn reason(&self) -> String {
        match (&self.error, self.status) {
            (Some(error), _) => error.to_string(),
            (None, Some(status)) => format!("HTTP {}", status),
            (None, None) => "unknown failure".to_string(),
        }
    }
}

pub type SuccessCallback = Arc<dyn Fn(CrawledPage) + Send + Sync>;
pub type FailureCallback = Arc<dyn Fn(FailedPage) + Send + Sync>;
// Called once per crawl with every visited address
pub type FinishedCallback = Box<dyn FnOnce(Vec<String>) + Send>;

/// The single-record form of a crawl invocation.
///
/// Any callback left as None falls back to the one configured on the
/// Crawler, if any.
#[derive(Default)]
pub struct CrawlRequest {
    pub url: String,
    pub success: Option<SuccessCallback>,
    pub failure: Option<FailureCallback>,
    pub finished: Option<FinishedCallback>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(CrawledPage) + Send + Sync + 'static,
    {
        self.success = Some(Arc::new(callback));
        self
    }

    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(FailedPage) + Send + Sync + 'static,
    {
        self.failure = Some(Arc::new(callback));
        self
    }

    pub fn on_finished<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Vec<String>) + Send + 'static,
    {
        self.finished = Some(Box::new(callback));
        self
    }
}

#[derive(Debug, Clone)]
pub enum CrawlEvent {
    Page(CrawledPage),
    Failure(FailedPage),
    Finished(Vec<String>),
}

/// Everything one crawl produced, in the order results arrived.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub pages: Vec<CrawledPage>,
    pub failures: Vec<FailedPage>,
    pub visited: Vec<String>,
}

impl CrawlReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_for_status() {
        let failed = FailedPage::from_status(
            "https://example.com/".to_string(),
            FetchResponse::new(404, "not found"),
        );
        assert_eq!(failed.status, Some(404));
        assert_eq!(failed.reason(), "HTTP 404");
    }

    #[test]
    fn test_failure_reason_for_transport_error() {
        let failed = FailedPage::from_error("https://example.com/".to_string(), TransportError::Timeout);
        assert_eq!(failed.status, None);
        assert!(failed.response.is_none());
        assert_eq!(failed.reason(), "request timed out");
    }
}
