//! Text completion capability.
//!
//! Takes a fully rendered prompt and returns the model's raw text. Prompt
//! assembly and output normalization happen in the query pipeline.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CapabilityResult;

#[async_trait]
pub trait Completion: Send + Sync {
    /// Complete a prompt (returns raw text response)
    async fn complete(&self, prompt: &str) -> CapabilityResult<String>;

    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<C: Completion + ?Sized> Completion for Arc<C> {
    async fn complete(&self, prompt: &str) -> CapabilityResult<String> {
        (**self).complete(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
