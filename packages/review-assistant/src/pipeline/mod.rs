//! The two pipelines and their stages.
//!
//! - Collection: fetch each page, extract records, accumulate, serialize
//! - Query: retrieve context, render the prompt, complete, normalize
//!
//! They share no runtime state. The corpus file is the only thing passing
//! from one to the other.

pub mod corpus;
pub mod extract;
pub mod prompts;
pub mod query;

pub use corpus::{Collection, CorpusBuilder};
pub use extract::{PageExtraction, RecordExtractor};
pub use prompts::{PromptComposer, TemplateName, PRODUCT_BOT_PROMPT};
pub use query::{QueryPipeline, FALLBACK_ANSWER};
