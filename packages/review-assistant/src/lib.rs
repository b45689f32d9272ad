//! Product review collection and question answering.
//!
//! Two independent pipelines:
//!
//! - **Collection** walks a paginated product listing, pulls
//!   `(title, rating, summary, review)` records out of each page, and writes
//!   them to a CSV corpus. Pages that fail are logged and skipped.
//! - **Query** answers a question by retrieving context snippets, filling a
//!   prompt template, and asking a completion backend.
//!
//! Both reach the outside world only through the traits in [`traits`], so
//! tests swap in the mocks from [`testing`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use review_assistant::{CorpusBuilder, HttpPageFetcher, RecordExtractor};
//! use review_assistant::types::config::{CollectionConfig, ExtractorSelectors, HttpFetcherConfig, PageRange};
//!
//! let fetcher = HttpPageFetcher::new(HttpFetcherConfig::default())?;
//! let extractor = RecordExtractor::new(&ExtractorSelectors::default())?;
//! let config = CollectionConfig::new(PageRange::new(2, 11)?, "data/product_reviews.csv");
//! let collection = CorpusBuilder::new(fetcher, extractor).build(&config).await?;
//!
//! let retriever = CorpusRetriever::from_path("data/product_reviews.csv", 5)?;
//! let pipeline = QueryPipeline::new(retriever, OpenAICompletion::from_env()?);
//! println!("{}", pipeline.respond("best noise cancelling earbuds").await);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability seams (PageFetcher, Retriever, Completion)
//! - [`types`] - Records, corpus, configuration, reports, query values
//! - [`pipeline`] - Collection and query pipelines
//! - [`fetchers`] - Page fetchers (HTTP, mock)
//! - [`retrievers`] - Reference retriever over the corpus
//! - [`stores`] - CSV corpus storage
//! - [`ai`] - Completion backends
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod retrievers;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    CapabilityError, ConfigError, ExtractError, FetchError, QueryFailed, QueryStage, RenderError,
    SerializationError,
};
pub use fetchers::HttpPageFetcher;
pub use pipeline::{
    Collection, CorpusBuilder, PromptComposer, QueryPipeline, RecordExtractor, TemplateName,
};
pub use retrievers::CorpusRetriever;
pub use stores::CsvCorpusStore;
pub use traits::{completion::Completion, fetcher::PageFetcher, retriever::Retriever};
pub use types::{
    config::{CollectionConfig, ExtractorSelectors, HttpFetcherConfig, PageRange, QueryConfig},
    query::{Answer, ContextBundle, Query, RenderedPrompt},
    record::{Column, Corpus, ReviewRecord},
    report::{CollectionReport, CountMismatch, FailureKind, PageFailure, PageWarning},
};

#[cfg(feature = "openai")]
pub use ai::OpenAICompletion;
