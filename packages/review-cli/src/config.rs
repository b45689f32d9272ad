use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use review_assistant::ai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use review_assistant::retrievers::DEFAULT_TOP_K;
use review_assistant::security::ApiKey;
use review_assistant::types::config::DEFAULT_SEARCH_URL_TEMPLATE;
use review_assistant::{HttpFetcherConfig, PageRange, TemplateName};

pub const DEFAULT_OUTPUT_PATH: &str = "data/product_reviews.csv";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub page_range: PageRange,
    pub output_path: PathBuf,
    pub template: TemplateName,
    pub search_url_template: String,
    pub page_delay: Duration,
    pub fetch_timeout: Duration,
    pub corpus_path: PathBuf,
    pub retriever_top_k: usize,
    pub openai_api_key: Option<ApiKey>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub query_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let output_path: PathBuf = get("OUTPUT_PATH")
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string())
            .into();

        Ok(Self {
            page_range: parse_or(get("PAGE_RANGE"), PageRange::default())
                .context("PAGE_RANGE must look like START-END")?,
            template: parse_or(get("TEMPLATE_NAME"), TemplateName::default())
                .context("TEMPLATE_NAME must name a registered template")?,
            search_url_template: get("SEARCH_URL_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_SEARCH_URL_TEMPLATE.to_string()),
            page_delay: Duration::from_millis(
                parse_or(get("PAGE_DELAY_MS"), 0).context("PAGE_DELAY_MS must be a number")?,
            ),
            fetch_timeout: Duration::from_secs(
                parse_or(
                    get("FETCH_TIMEOUT_SECS"),
                    HttpFetcherConfig::default().timeout.as_secs(),
                )
                .context("FETCH_TIMEOUT_SECS must be a number")?,
            ),
            corpus_path: get("CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| output_path.clone()),
            output_path,
            retriever_top_k: parse_or(get("RETRIEVER_TOP_K"), DEFAULT_TOP_K)
                .context("RETRIEVER_TOP_K must be a number")?,
            openai_api_key: get("OPENAI_API_KEY").map(|key| ApiKey::new(key.trim())),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            query_timeout: Duration::from_secs(
                parse_or(get("QUERY_TIMEOUT_SECS"), 60)
                    .context("QUERY_TIMEOUT_SECS must be a number")?,
            ),
        })
    }

    /// The completion credential, required by `ask` and `chat`.
    pub fn require_api_key(&self) -> Result<ApiKey> {
        self.openai_api_key
            .clone()
            .context("OPENAI_API_KEY must be set")
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => Ok(raw.trim().parse()?),
        None => Ok(default),
    }
}
