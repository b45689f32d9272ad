//! Configuration types for collection and querying.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::pipeline::prompts::TemplateName;
use crate::types::record::Column;

/// Default listing search: earbuds on Flipkart, page number substituted for `{page}`.
pub const DEFAULT_SEARCH_URL_TEMPLATE: &str =
    "https://www.flipkart.com/search?q=earbuds&as=on&as-show=on&page={page}";

/// Browser-like User-Agent; listing pages tend to reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// Inclusive, non-empty range of listing page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRange")]
pub struct PageRange {
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct RawPageRange {
    start: u32,
    end: u32,
}

impl TryFrom<RawPageRange> for PageRange {
    type Error = ConfigError;

    fn try_from(raw: RawPageRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl PageRange {
    /// Create a range. Fails if `end < start`.
    pub fn new(start: u32, end: u32) -> Result<Self, ConfigError> {
        if end < start {
            return Err(ConfigError::InvalidPageRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one page.
    pub fn single(page: u32) -> Self {
        Self {
            start: page,
            end: page,
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the range.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Page indices in ascending order.
    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl Default for PageRange {
    fn default() -> Self {
        Self { start: 2, end: 11 }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for PageRange {
    type Err = ConfigError;

    /// Accepts `"2-11"`, `"2..=11"`, `"2,11"`, or a single page `"5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || ConfigError::UnparseablePageRange(s.to_string());
        let trimmed = s.trim();

        let (start, end) = match ["..=", "-", ","]
            .iter()
            .find_map(|sep| trimmed.split_once(sep))
        {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (trimmed, trimmed),
        };

        let start: u32 = start.parse().map_err(|_| unparseable())?;
        let end: u32 = end.parse().map_err(|_| unparseable())?;
        Self::new(start, end)
    }
}

/// CSS selectors used to pull review fields out of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorSelectors {
    /// The single results container
    pub container: String,
    pub title: String,
    pub rating: String,
    pub summary: String,
    pub body: String,
}

impl Default for ExtractorSelectors {
    /// Flipkart search-result classes. The summary class contains a `+`,
    /// so it is matched as a whitespace-separated class token instead of `.class`.
    fn default() -> Self {
        Self {
            container: "div.DOjaWF.gdgoEp".to_string(),
            title: "a.wjcEIp".to_string(),
            rating: "div.XQDdHH".to_string(),
            summary: r#"div[class~="yN+eNk"][class~="w9jEaj"]"#.to_string(),
            body: "div.K5lpE5".to_string(),
        }
    }
}

/// Settings for the HTTP page fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Listing URL with a `{page}` placeholder
    pub url_template: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_SEARCH_URL_TEMPLATE.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpFetcherConfig {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Configuration for one corpus build.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Pages to visit, in ascending order
    pub page_range: PageRange,

    /// Destination of the corpus CSV. Overwritten on every run.
    pub output_path: PathBuf,

    /// Column order of the artifact
    pub columns: Vec<Column>,

    /// Pause between consecutive page requests (zero = none)
    pub delay_between_pages: Duration,
}

impl CollectionConfig {
    pub fn new(page_range: PageRange, output_path: impl Into<PathBuf>) -> Self {
        Self {
            page_range,
            output_path: output_path.into(),
            columns: Column::DEFAULT_ORDER.to_vec(),
            delay_between_pages: Duration::ZERO,
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_between_pages = delay;
        self
    }
}

/// Configuration for the query pipeline.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub template: TemplateName,

    /// Upper bound for each of the retrieval and completion calls
    pub stage_timeout: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            template: TemplateName::ProductBot,
            stage_timeout: None,
        }
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: TemplateName) -> Self {
        self.template = template;
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }
}
