//! Typed errors for the review assistant.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! per-page failures, which a collection run tolerates, apart from the fatal
//! ones that abort it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Boxed error used where a capability's failure modes are opaque.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transport-level failure while fetching one listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The page URL could not be built or parsed
    #[error("invalid URL for page {page}: {url}")]
    InvalidUrl { page: u32, url: String },

    /// Request timed out
    #[error("timeout fetching page {page}")]
    Timeout { page: u32 },

    /// Server answered with a non-success status
    #[error("HTTP {status} for page {page}")]
    Status { page: u32, status: u16 },

    /// Connection, DNS, or body decoding failure
    #[error("transport error for page {page}: {source}")]
    Transport {
        page: u32,
        #[source]
        source: BoxError,
    },
}

impl FetchError {
    /// Page index the failure belongs to.
    pub fn page(&self) -> u32 {
        match self {
            Self::InvalidUrl { page, .. }
            | Self::Timeout { page }
            | Self::Status { page, .. }
            | Self::Transport { page, .. } => *page,
        }
    }
}

/// Structural failure while parsing one page's markup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Body was empty or whitespace only
    #[error("page body is empty")]
    EmptyMarkup,

    /// Body contained no markup tags at all
    #[error("page body is not markup ({length} bytes of plain text)")]
    NotMarkup { length: usize },
}

/// Fatal failure while writing or reading the corpus artifact.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed
    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row
    #[error("corpus {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    /// No columns were requested for output
    #[error("column list is empty")]
    NoColumns,
}

/// Invalid configuration. Always fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Page range is empty or inverted
    #[error("invalid page range {start}..={end}")]
    InvalidPageRange { start: u32, end: u32 },

    /// Page range text could not be parsed
    #[error("cannot parse page range '{0}' (expected 'START-END')")]
    UnparseablePageRange(String),

    /// Template name is not in the registry
    #[error("unknown prompt template '{0}'")]
    UnknownTemplate(String),

    /// Column name is not part of the corpus schema
    #[error("unknown corpus column '{0}'")]
    UnknownColumn(String),

    /// CSS selector failed to parse
    #[error("invalid {name} selector '{selector}': {reason}")]
    InvalidSelector {
        name: &'static str,
        selector: String,
        reason: String,
    },

    /// Listing URL template is not a valid URL
    #[error("invalid URL template '{template}': {reason}")]
    InvalidUrlTemplate { template: String, reason: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Required setting is absent
    #[error("{0} must be set")]
    Missing(String),
}

/// Failure reported by an injected capability (retriever or completion backend).
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Backend cannot serve requests (no data, not configured)
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Network-level failure
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    /// Non-2xx API answer
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Response did not have the expected shape
    #[error("malformed response: {0}")]
    Parse(String),

    /// Stage exceeded its time budget
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Backend returned nothing usable
    #[error("empty response")]
    EmptyResponse,
}

/// Prompt rendering failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Question is blank after trimming
    #[error("question is empty")]
    EmptyQuestion,
}

/// Stage of the query pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Retrieval,
    Rendering,
    Completion,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieval => "retrieval",
            Self::Rendering => "rendering",
            Self::Completion => "completion",
        }
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query invocation failed. Carries the failing stage; no partial answer.
#[derive(Debug, Error)]
#[error("query failed at {stage} stage: {source}")]
pub struct QueryFailed {
    pub stage: QueryStage,
    #[source]
    pub source: BoxError,
}

impl QueryFailed {
    pub fn new(stage: QueryStage, source: impl Into<BoxError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for extraction.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for capability calls.
pub type CapabilityResult<T> = std::result::Result<T, CapabilityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_page() {
        let err = FetchError::Status {
            page: 4,
            status: 503,
        };
        assert_eq!(err.page(), 4);
        assert_eq!(err.to_string(), "HTTP 503 for page 4");
    }

    #[test]
    fn test_query_failed_names_stage() {
        let err = QueryFailed::new(QueryStage::Completion, CapabilityError::EmptyResponse);
        assert_eq!(err.stage, QueryStage::Completion);
        assert!(err.to_string().contains("completion stage"));
    }
}
