//! Retriever implementations.
//!
//! Available retrievers:
//! - `CorpusRetriever` - keyword overlap ranking over the collected corpus

mod corpus;

pub use corpus::{CorpusRetriever, DEFAULT_TOP_K};
