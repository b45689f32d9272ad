//! PageFetcher trait for retrieving listing pages.
//!
//! A fetcher turns a page index into raw markup. It issues exactly one
//! request per call and never retries; the collection loop decides what to
//! do with a failure.
//!
//! # Usage
//!
//! ```rust,ignore
//! use review_assistant::traits::fetcher::PageFetcher;
//!
//! let markup = fetcher.fetch(2).await?;
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::FetchResult;

/// Fetches one paginated listing page.
///
/// Implementations:
/// - `HttpPageFetcher` - reqwest GET against a URL template
/// - `MockPageFetcher` - canned markup per page, for tests
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw markup of `page`.
    async fn fetch(&self, page: u32) -> FetchResult<String>;

    /// Fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    async fn fetch(&self, page: u32) -> FetchResult<String> {
        (**self).fetch(page).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
