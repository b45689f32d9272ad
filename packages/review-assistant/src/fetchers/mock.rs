//! Mock fetcher for testing.
//!
//! Serves canned markup or canned failures per page index and records every
//! requested page.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;

#[derive(Debug, Clone)]
enum MockResponse {
    Markup(String),
    Status(u16),
    Timeout,
}

/// Mock page fetcher.
///
/// Pages without a configured response answer with HTTP 404.
///
/// # Example
///
/// ```rust
/// use review_assistant::fetchers::MockPageFetcher;
///
/// let fetcher = MockPageFetcher::new()
///     .with_page(2, "<div>...</div>")
///     .with_status(3, 503);
/// ```
#[derive(Default, Clone)]
pub struct MockPageFetcher {
    responses: Arc<RwLock<HashMap<u32, MockResponse>>>,
    calls: Arc<RwLock<Vec<u32>>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `markup` for `page`.
    pub fn with_page(self, page: u32, markup: impl Into<String>) -> Self {
        self.set(page, MockResponse::Markup(markup.into()));
        self
    }

    /// Fail `page` with an HTTP status.
    pub fn with_status(self, page: u32, status: u16) -> Self {
        self.set(page, MockResponse::Status(status));
        self
    }

    /// Fail `page` with a timeout.
    pub fn with_timeout(self, page: u32) -> Self {
        self.set(page, MockResponse::Timeout);
        self
    }

    fn set(&self, page: u32, response: MockResponse) {
        self.responses.write().unwrap().insert(page, response);
    }

    /// Pages requested so far, in call order.
    pub fn calls(&self) -> Vec<u32> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, page: u32) -> FetchResult<String> {
        self.calls.write().unwrap().push(page);

        let response = self.responses.read().unwrap().get(&page).cloned();
        match response {
            Some(MockResponse::Markup(markup)) => Ok(markup),
            Some(MockResponse::Status(status)) => Err(FetchError::Status { page, status }),
            Some(MockResponse::Timeout) => Err(FetchError::Timeout { page }),
            None => Err(FetchError::Status { page, status: 404 }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
