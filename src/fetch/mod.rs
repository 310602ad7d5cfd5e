// src/fetch/mod.rs
// =============================================================================
// This module is the crawler's view of the network.
//
// The engine never talks to reqwest directly. It calls the Transport trait,
// which makes it possible to crawl a fake in-memory web in tests.
//
// Submodules:
// - http: the real transport, built on reqwest
// =============================================================================

mod http;

pub use http::HttpTransport;

use crate::error::TransportError;
use futures::future::BoxFuture;
use reqwest::header::HeaderMap;

/// Everything the transport got back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code (200, 404, ...)
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body decoded as text
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    // Only a plain 200 counts, everything else is reported as a failure
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

// A fetch is started once per submitted work item and resolves at some
// arbitrary later time. The returned future must not borrow from `self`,
// since it is moved onto its own tokio task.
pub trait Transport: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &str,
        headers: &HeaderMap,
    ) -> BoxFuture<'static, Result<FetchResponse, TransportError>>;
}
