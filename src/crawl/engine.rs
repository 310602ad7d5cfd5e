// src/crawl/engine.rs
// =============================================================================
// The traversal engine: recursive, rate-limited crawling with callbacks.
//
// How it works:
// 1. crawl() builds a CrawlSession with its own RateLimitedExecutor
// 2. visit(url, depth) records the URL as in-flight and submits a fetch
//    task to the executor
// 3. When the executor runs the task, the fetch is spawned on tokio
// 4. When the fetch completes:
//    - the URL is marked visited (success or failure)
//    - 200: success callback, then every extracted link that passes
//      should_follow is visited with depth - 1
//    - anything else: failure callback, no descent
//    - the in-flight entry is removed; if nothing is left in flight the
//      finished callback runs (once) and the executor is stopped
//
// Depth counts the hops still allowed from a page: the seed gets max_depth,
// a page with 0 hops left is fetched but its links are not followed. A
// crawl with max_depth 0 fetches nothing at all.
//
// State:
// - visited: owned by the Crawler, shared by its crawls, cleared with
//   forget_crawled(). Independent crawls should use independent Crawlers.
// - in-flight list, in-progress set, finished callback: owned by one
//   CrawlSession behind a single mutex, so completions arriving on several
//   worker threads never race each other.
//
// In-flight is a list, not a set: a URL discovered twice before its first
// fetch completes is queued twice. The second task notices the URL is
// already being fetched (or done) when the executor reaches it and only
// settles its in-flight entry, so no URL is ever fetched twice.
// =============================================================================

use crate::config::CrawlerConfig;
use crate::crawl::executor::RateLimitedExecutor;
use crate::crawl::page::{
    CrawlEvent, CrawlReport, CrawlRequest, CrawledPage, FailedPage, FailureCallback,
    FinishedCallback, SuccessCallback,
};
use crate::error::{CrawlError, TransportError};
use crate::fetch::{FetchResponse, HttpTransport, Transport};
use crate::links::{LinkExtractor, MarkupLinkExtractor};
use reqwest::header::HeaderMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use url::Url;

type FinishedDefault = Arc<dyn Fn(Vec<String>) + Send + Sync>;

pub struct Crawler {
    config: CrawlerConfig,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
    visited: Arc<Mutex<HashSet<String>>>,
    // Used by crawl_with() when the request leaves a callback unset
    default_success: Option<SuccessCallback>,
    default_failure: Option<FailureCallback>,
    default_finished: Option<FinishedDefault>,
}

impl Crawler {
    // A crawler fetching over HTTP with reqwest
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let transport = HttpTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: CrawlerConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CrawlError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            extractor: Arc::new(MarkupLinkExtractor),
            visited: Arc::new(Mutex::new(HashSet::new())),
            default_success: None,
            default_failure: None,
            default_finished: None,
        })
    }

    pub fn with_link_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(CrawledPage) + Send + Sync + 'static,
    {
        self.default_success = Some(Arc::new(callback));
        self
    }

    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(FailedPage) + Send + Sync + 'static,
    {
        self.default_failure = Some(Arc::new(callback));
        self
    }

    pub fn on_finished<F>(mut self, callback: F) -> Self
    where
        F: Fn(Vec<String>) + Send + Sync + 'static,
    {
        self.default_finished = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    // Every address fetched so far (successfully or not), in no particular order
    pub fn visited(&self) -> Vec<String> {
        lock(&self.visited).iter().cloned().collect()
    }

    // Lets the next crawl on this Crawler revisit pages seen before
    pub fn forget_crawled(&self) {
        lock(&self.visited).clear();
    }

    // Starts a crawl and returns immediately; results arrive through the
    // callbacks. Must be called from within a tokio runtime.
    pub fn crawl<S, F, D>(
        &self,
        url: &str,
        on_success: S,
        on_failure: F,
        on_all_finished: D,
    ) -> Result<(), CrawlError>
    where
        S: Fn(CrawledPage) + Send + Sync + 'static,
        F: Fn(FailedPage) + Send + Sync + 'static,
        D: FnOnce(Vec<String>) + Send + 'static,
    {
        self.crawl_with(
            CrawlRequest::new(url)
                .on_success(on_success)
                .on_failure(on_failure)
                .on_finished(on_all_finished),
        )
    }

    pub fn crawl_with(&self, request: CrawlRequest) -> Result<(), CrawlError> {
        let seed = normalize_seed(&request.url)?;
        let headers = self.config.headers()?;

        let finished: Option<FinishedCallback> = match request.finished {
            Some(finished) => Some(finished),
            None => self.default_finished.clone().map(|callback| {
                Box::new(move |visited: Vec<String>| callback(visited)) as FinishedCallback
            }),
        };

        let executor = RateLimitedExecutor::new(self.config.request_interval()?);
        executor.start()?;

        let session = Arc::new(CrawlSession {
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
            extractor: Arc::clone(&self.extractor),
            visited: Arc::clone(&self.visited),
            executor,
            headers,
            on_success: request.success.or_else(|| self.default_success.clone()),
            on_failure: request.failure.or_else(|| self.default_failure.clone()),
            state: Mutex::new(SessionState {
                in_flight: Vec::new(),
                fetching: HashSet::new(),
                finished,
                done: false,
            }),
        });

        tracing::info!(
            url = %seed,
            max_depth = self.config.max_depth,
            max_requests_per_second = self.config.max_requests_per_second,
            "starting crawl"
        );

        if self.config.max_depth > 0 {
            session.visit(seed, self.config.max_depth);
        }

        // Depth 0, or a seed this Crawler already visited: nothing was
        // queued. Completion still goes through the executor so it never
        // fires before crawl() has returned.
        let idle = Arc::clone(&session);
        session.executor.submit(move || idle.finish_if_idle());
        Ok(())
    }

    // Runs a crawl to completion and collects everything it produced
    pub async fn run(&self, url: &str) -> Result<CrawlReport, CrawlError> {
        self.run_with(url, |_| {}).await
    }

    // Like run(), but lets the caller watch events as they arrive
    pub async fn run_with<O>(&self, url: &str, mut observe: O) -> Result<CrawlReport, CrawlError>
    where
        O: FnMut(&CrawlEvent),
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let page_tx = tx.clone();
        let failure_tx = tx.clone();

        // A send only fails once this function has stopped listening
        self.crawl(
            url,
            move |page| {
                let _ = page_tx.send(CrawlEvent::Page(page));
            },
            move |failed| {
                let _ = failure_tx.send(CrawlEvent::Failure(failed));
            },
            move |visited| {
                let _ = tx.send(CrawlEvent::Finished(visited));
            },
        )?;

        let mut report = CrawlReport::default();
        while let Some(event) = rx.recv().await {
            observe(&event);
            match event {
                CrawlEvent::Page(page) => report.pages.push(page),
                CrawlEvent::Failure(failed) => report.failures.push(failed),
                CrawlEvent::Finished(visited) => {
                    report.visited = visited;
                    return Ok(report);
                }
            }
        }

        Err(CrawlError::Aborted)
    }
}

fn normalize_seed(url: &str) -> Result<String, CrawlError> {
    let mut parsed = Url::parse(url).map_err(|source| CrawlError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

// A pending fetch: where to go and how many hops are left after it
#[derive(Debug)]
struct WorkItem {
    url: String,
    depth: usize,
}

struct SessionState {
    // Submitted but not yet completed; may hold the same URL more than once
    in_flight: Vec<String>,
    // Fetches actually issued and not yet completed
    fetching: HashSet<String>,
    // Taken when in_flight drains
    finished: Option<FinishedCallback>,
    done: bool,
}

// Everything one crawl() call owns. Shared by the executor tasks and fetch
// tasks through an Arc and dropped when the last of them finishes.
struct CrawlSession {
    config: CrawlerConfig,
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn LinkExtractor>,
    visited: Arc<Mutex<HashSet<String>>>,
    executor: RateLimitedExecutor,
    headers: HeaderMap,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
    state: Mutex<SessionState>,
}

impl CrawlSession {
    fn visit(self: &Arc<Self>, url: String, depth: usize) {
        if lock(&self.visited).contains(&url) {
            return;
        }

        lock(&self.state).in_flight.push(url.clone());

        let session = Arc::clone(self);
        let item = WorkItem { url, depth };
        self.executor.submit(move || session.issue(item));
    }

    // Runs on the executor, at most once per rate-limit interval
    fn issue(self: &Arc<Self>, item: WorkItem) {
        // Lock order: state, then visited
        let duplicate = {
            let mut state = lock(&self.state);
            let duplicate =
                state.fetching.contains(&item.url) || lock(&self.visited).contains(&item.url);
            if !duplicate {
                state.fetching.insert(item.url.clone());
            }
            duplicate
        };

        if duplicate {
            tracing::debug!(url = %item.url, "already fetched, skipping duplicate");
            self.settle(&item.url);
            return;
        }

        tracing::debug!(url = %item.url, depth = item.depth, "fetching");
        let fetch = self.transport.fetch(&item.url, &self.headers);
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let result = fetch.await;
            session.complete(item, result);
        });
    }

    fn complete(self: &Arc<Self>, item: WorkItem, result: Result<FetchResponse, TransportError>) {
        lock(&self.visited).insert(item.url.clone());
        lock(&self.state).fetching.remove(&item.url);

        match result {
            Ok(response) if response.is_ok() => self.succeed(&item, response),
            Ok(response) => {
                tracing::warn!(url = %item.url, status = response.status, "page failed");
                self.fail(FailedPage::from_status(item.url.clone(), response));
            }
            Err(error) => {
                tracing::warn!(url = %item.url, error = %error, "page failed");
                self.fail(FailedPage::from_error(item.url.clone(), error));
            }
        }

        self.settle(&item.url);
    }

    fn succeed(self: &Arc<Self>, item: &WorkItem, response: FetchResponse) {
        // Nothing below this page will be visited, so don't bother parsing it
        let links = if item.depth > 0 {
            self.extractor.extract_links(
                &item.url,
                &response.body,
                self.config.ignore_relative_links,
            )
        } else {
            Vec::new()
        };

        if let Some(on_success) = &self.on_success {
            on_success(CrawledPage {
                url: item.url.clone(),
                status: response.status,
                content: response.body.clone(),
                response,
            });
        }

        let mut seen = HashSet::new();
        for link in links {
            if seen.insert(link.clone()) && (self.config.should_follow)(&link) {
                self.visit(link, item.depth - 1);
            }
        }
    }

    fn fail(&self, failed: FailedPage) {
        if let Some(on_failure) = &self.on_failure {
            on_failure(failed);
        }
    }

    // Drops one in-flight entry for `url` and finishes the crawl if that
    // was the last one
    fn settle(&self, url: &str) {
        let completion = {
            let mut state = lock(&self.state);
            if let Some(position) = state.in_flight.iter().position(|u| u == url) {
                state.in_flight.remove(position);
            }
            take_completion(&mut state)
        };

        if let Some(finished) = completion {
            self.finish(finished);
        }
    }

    fn finish_if_idle(&self) {
        let completion = take_completion(&mut lock(&self.state));
        if let Some(finished) = completion {
            self.finish(finished);
        }
    }

    fn finish(&self, finished: Option<FinishedCallback>) {
        self.executor.stop();
        let visited: Vec<String> = lock(&self.visited).iter().cloned().collect();
        tracing::info!(visited = visited.len(), "crawl finished");
        if let Some(finished) = finished {
            finished(visited);
        }
    }
}

// Some(callback) the first time nothing is left in flight, None otherwise
fn take_completion(state: &mut SessionState) -> Option<Option<FinishedCallback>> {
    if state.done || !state.in_flight.is_empty() {
        return None;
    }
    state.done = true;
    Some(state.finished.take())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
