//! PageFetcher implementations.
//!
//! - `HttpPageFetcher` - reqwest GET with a page-number URL template
//! - `MockPageFetcher` - for testing

mod http;
mod mock;

pub use http::{HttpPageFetcher, PAGE_PLACEHOLDER};
pub use mock::MockPageFetcher;

// Re-export from traits for convenience
pub use crate::traits::fetcher::PageFetcher;
