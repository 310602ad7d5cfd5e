// src/fetch/http.rs
// =============================================================================
// The default transport: plain GET requests over reqwest.
//
// Key functionality:
// - One shared Client (connection pooling across the whole crawl)
// - Per-request timeout and a redirect limit
// - Network failures are categorised into TransportError variants
//
// Status codes are NOT interpreted here. A 404 is a perfectly good response
// as far as the transport is concerned; the engine decides what counts as
// success.
// =============================================================================

use super::{FetchResponse, Transport};
use crate::error::TransportError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }

    // Wraps an already configured client (custom proxies, TLS roots, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn fetch(
        &self,
        url: &str,
        headers: &HeaderMap,
    ) -> BoxFuture<'static, Result<FetchResponse, TransportError>> {
        // Client is reference counted, cloning it is cheap
        let request = self.client.get(url).headers(headers.clone());

        async move {
            let response = request.send().await.map_err(categorize_error)?;

            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            Ok(FetchResponse {
                status,
                headers,
                body,
            })
        }
        .boxed()
    }
}

// Categorizes the error types reqwest can produce
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(error: reqwest::Error) -> TransportError {
    let error_string = error.to_string();
    let lowered = error_string.to_lowercase();

    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_redirect() {
        TransportError::TooManyRedirects
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if lowered.contains("dns") {
            TransportError::Dns
        } else {
            TransportError::Connect(error_string)
        }
    } else if lowered.contains("certificate") || lowered.contains("ssl") {
        TransportError::Tls
    } else {
        TransportError::Other(error_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds() {
        assert!(HttpTransport::new().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new().unwrap();
        // Port 9 (discard) on localhost is closed on any sane test machine
        let result = transport
            .fetch("http://127.0.0.1:9/", &HeaderMap::new())
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_response_is_ok_only_for_200() {
        assert!(FetchResponse::new(200, "").is_ok());
        assert!(!FetchResponse::new(204, "").is_ok());
        assert!(!FetchResponse::new(404, "").is_ok());
    }
}
