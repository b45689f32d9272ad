//! Core trait abstractions.
//!
//! These are the seams where the pipelines meet the outside world: the
//! listing site, the context index, and the language model.

pub mod completion;
pub mod fetcher;
pub mod retriever;
