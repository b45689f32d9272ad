//! HTTP-based page fetcher.
//!
//! One GET per listing page, built by substituting the page index into a URL
//! template.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ConfigError, FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::HttpFetcherConfig;

/// Placeholder replaced by the page index in the URL template.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Fetches listing pages over HTTP.
///
/// # Example
///
/// ```rust,ignore
/// use review_assistant::fetchers::HttpPageFetcher;
/// use review_assistant::types::config::HttpFetcherConfig;
///
/// let fetcher = HttpPageFetcher::new(HttpFetcherConfig::default())?;
/// let html = fetcher.fetch(2).await?;
/// ```
pub struct HttpPageFetcher {
    client: reqwest::Client,
    url_template: String,
}

impl HttpPageFetcher {
    /// Create a fetcher. Validates the URL template up front.
    pub fn new(config: HttpFetcherConfig) -> Result<Self, ConfigError> {
        Url::parse(&render_url(&config.url_template, 1)).map_err(|e| {
            ConfigError::InvalidUrlTemplate {
                template: config.url_template.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            url_template: config.url_template,
        })
    }

    /// Create a fetcher for `url_template` with default timeout and User-Agent.
    pub fn from_template(url_template: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(HttpFetcherConfig::new(url_template))
    }

    /// URL requested for `page`.
    pub fn page_url(&self, page: u32) -> String {
        render_url(&self.url_template, page)
    }
}

/// Substitute `page` into `template`.
///
/// A template without the placeholder gets a `page` query parameter instead.
fn render_url(template: &str, page: u32) -> String {
    if template.contains(PAGE_PLACEHOLDER) {
        return template.replace(PAGE_PLACEHOLDER, &page.to_string());
    }

    match Url::parse(template) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("page", &page.to_string());
            url.to_string()
        }
        Err(_) => template.to_string(),
    }
}

fn transport_error(page: u32, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout { page }
    } else {
        FetchError::Transport {
            page,
            source: Box::new(error),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, page: u32) -> FetchResult<String> {
        let url = self.page_url(page);
        let url = Url::parse(&url).map_err(|_| FetchError::InvalidUrl {
            page,
            url: url.clone(),
        })?;

        debug!(page, url = %url, "HTTP fetch starting");
        let started = std::time::Instant::now();

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(page, url = %url, error = %e, "HTTP request failed");
            transport_error(page, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(page, url = %url, status = %status, "HTTP error");
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(page, e))?;

        debug!(
            page,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Page fetched"
        );

        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl std::fmt::Debug for HttpPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("url_template", &self.url_template)
            .finish()
    }
}
