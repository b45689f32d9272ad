//! Completion backends.
//!
//! Reference implementations of the `Completion` trait. Callers can use these
//! directly or implement their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAICompletion, DEFAULT_BASE_URL, DEFAULT_MODEL};
