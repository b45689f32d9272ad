//! Prompt templates and rendering for the query pipeline.
//!
//! Templates live in a closed registry keyed by [`TemplateName`]. Each one
//! carries exactly two placeholders, `{context}` and `{question}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RenderError};
use crate::types::query::{ContextBundle, Query, RenderedPrompt};

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Separator placed between context snippets.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Product assistant prompt answering from scraped reviews.
pub const PRODUCT_BOT_PROMPT: &str = r#"You are an expert EcommerceBot specialized in product recommendations and handling customer queries.
Analyze the provided product titles, ratings, and reviews to provide accurate, helpful responses.
Stay relevant to the context, and keep your answers concise and informative.
If the context does not contain the answer, say that you do not know.

CONTEXT:
{context}

QUESTION: {question}

YOUR ANSWER:"#;

/// Registered prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateName {
    #[default]
    ProductBot,
}

impl TemplateName {
    pub const ALL: [TemplateName; 1] = [TemplateName::ProductBot];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductBot => "product_bot",
        }
    }

    /// Template text for this name.
    pub fn template(&self) -> &'static str {
        match self {
            Self::ProductBot => PRODUCT_BOT_PROMPT,
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownTemplate(s.to_string()))
    }
}

/// Renders registered templates with retrieved context and the user question.
///
/// Rendering is pure: the same inputs always give the same prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    /// Render `name` with `context` (joined in retrieval order) and `question` (verbatim).
    pub fn render(
        &self,
        name: TemplateName,
        context: &ContextBundle,
        question: &Query,
    ) -> Result<RenderedPrompt, RenderError> {
        if question.is_blank() {
            return Err(RenderError::EmptyQuestion);
        }

        let context_block = context.join(CONTEXT_SEPARATOR);
        Ok(RenderedPrompt::new(substitute(
            name.template(),
            &context_block,
            question.as_str(),
        )))
    }
}

/// Replace placeholders in a single left-to-right pass over `template`.
///
/// Substituted text is never scanned again, so braces inside the context or
/// question come through untouched.
fn substitute(template: &str, context: &str, question: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(QUESTION_PLACEHOLDER) {
            out.push_str(question);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
