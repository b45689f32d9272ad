//! Retrieval-augmented query pipeline.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info_span, warn, Instrument};

use crate::error::{CapabilityError, CapabilityResult, QueryFailed, QueryStage};
use crate::pipeline::prompts::{PromptComposer, TemplateName};
use crate::traits::{completion::Completion, retriever::Retriever};
use crate::types::config::QueryConfig;
use crate::types::query::{Answer, ContextBundle, Query};

/// Text shown to the user whenever a query fails.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not answer that question right now.";

/// Answers one question at a time: retrieve, render, complete, trim.
///
/// Each call makes exactly one retrieval and one completion request. Nothing
/// is cached between calls.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = QueryPipeline::new(retriever, OpenAICompletion::from_env()?);
/// let answer = pipeline.answer(&Query::new("best noise cancelling earbuds")).await?;
/// ```
pub struct QueryPipeline<R: Retriever, C: Completion> {
    retriever: R,
    completion: C,
    composer: PromptComposer,
    template: TemplateName,
    stage_timeout: Option<Duration>,
}

impl<R: Retriever, C: Completion> QueryPipeline<R, C> {
    pub fn new(retriever: R, completion: C) -> Self {
        Self {
            retriever,
            completion,
            composer: PromptComposer::new(),
            template: TemplateName::default(),
            stage_timeout: None,
        }
    }

    pub fn with_config(mut self, config: &QueryConfig) -> Self {
        self.template = config.template;
        self.stage_timeout = config.stage_timeout;
        self
    }

    pub fn with_template(mut self, template: TemplateName) -> Self {
        self.template = template;
        self
    }

    /// Bound each capability call by `timeout`.
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }

    /// Answer a single question.
    pub async fn answer(&self, question: &Query) -> Result<Answer, QueryFailed> {
        let span = info_span!(
            "answer",
            template = %self.template,
            retriever = self.retriever.name(),
            completion = self.completion.name(),
        );

        async {
            let snippets = bounded(self.stage_timeout, self.retriever.retrieve(question.as_str()))
                .await
                .map_err(|e| QueryFailed::new(QueryStage::Retrieval, e))?;
            let context = ContextBundle::new(snippets);
            if context.is_empty() {
                warn!("No context retrieved, answering from the template alone");
            } else {
                debug!(snippets = context.len(), "Context retrieved");
            }

            let prompt = self
                .composer
                .render(self.template, &context, question)
                .map_err(|e| QueryFailed::new(QueryStage::Rendering, e))?;
            debug!(prompt_len = prompt.as_str().len(), "Prompt rendered");

            let raw = bounded(self.stage_timeout, self.completion.complete(prompt.as_str()))
                .await
                .map_err(|e| QueryFailed::new(QueryStage::Completion, e))?;

            let text = raw.trim();
            if text.is_empty() {
                return Err(QueryFailed::new(
                    QueryStage::Completion,
                    CapabilityError::EmptyResponse,
                ));
            }

            Ok(Answer::new(text.to_string()))
        }
        .instrument(span)
        .await
    }

    /// Front-end entry point. Never surfaces internal error details.
    pub async fn respond(&self, question: &str) -> String {
        match self.answer(&Query::new(question)).await {
            Ok(answer) => answer.into_string(),
            Err(e) => {
                error!(stage = %e.stage, error = %e, "Query failed");
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}

async fn bounded<T>(
    timeout: Option<Duration>,
    call: impl Future<Output = CapabilityResult<T>>,
) -> CapabilityResult<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| CapabilityError::Timeout(limit))?,
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCompletion, MockRetriever};
    use async_trait::async_trait;

    struct SlowCompletion(Duration);

    #[async_trait]
    impl Completion for SlowCompletion {
        async fn complete(&self, _prompt: &str) -> CapabilityResult<String> {
            tokio::time::sleep(self.0).await;
            Ok("late".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_answer_contains_snippets_and_question() {
        let pipeline = QueryPipeline::new(
            MockRetriever::new(["snippet A", "snippet B"]),
            MockCompletion::echo(),
        );

        let answer = pipeline
            .answer(&Query::new("best noise cancelling earbuds"))
            .await
            .unwrap();
        let text = answer.as_str();

        assert!(text.starts_with("You are an expert EcommerceBot"));
        assert!(text.contains("snippet A\n\nsnippet B"));
        assert!(text.contains("QUESTION: best noise cancelling earbuds"));
        assert!(text.ends_with("YOUR ANSWER:"));
    }

    #[tokio::test]
    async fn test_one_call_per_port() {
        let retriever = MockRetriever::new(["ctx"]);
        let completion = MockCompletion::fixed("  Buy the X1.\n");
        let pipeline = QueryPipeline::new(retriever.clone(), completion.clone());

        let answer = tokio_test::assert_ok!(pipeline.answer(&Query::new("which one?")).await);

        assert_eq!(answer.as_str(), "Buy the X1.");
        assert_eq!(retriever.calls(), vec!["which one?".to_string()]);
        assert_eq!(completion.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retrieval_failure_skips_completion() {
        let completion = MockCompletion::echo();
        let pipeline = QueryPipeline::new(MockRetriever::failing("index offline"), completion.clone());

        let err = pipeline.answer(&Query::new("q")).await.unwrap_err();

        assert_eq!(err.stage, QueryStage::Retrieval);
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_fails_rendering() {
        let retriever = MockRetriever::new(["ctx"]);
        let pipeline = QueryPipeline::new(retriever.clone(), MockCompletion::echo());

        let err = pipeline.answer(&Query::new("  ")).await.unwrap_err();

        assert_eq!(err.stage, QueryStage::Rendering);
        assert_eq!(retriever.call_count(), 1);
    }

    #[tokio::test]
    async fn test_completion_failure() {
        let pipeline = QueryPipeline::new(MockRetriever::new(["ctx"]), MockCompletion::failing("boom"));
        let err = pipeline.answer(&Query::new("q")).await.unwrap_err();
        assert_eq!(err.stage, QueryStage::Completion);
    }

    #[tokio::test]
    async fn test_whitespace_answer_is_completion_failure() {
        let pipeline = QueryPipeline::new(MockRetriever::new(["ctx"]), MockCompletion::fixed(" \n "));
        let err = pipeline.answer(&Query::new("q")).await.unwrap_err();
        assert_eq!(err.stage, QueryStage::Completion);
    }

    #[tokio::test]
    async fn test_empty_context_still_answered() {
        let completion = MockCompletion::echo();
        let pipeline = QueryPipeline::new(MockRetriever::new(Vec::<String>::new()), completion.clone());

        let answer = pipeline.answer(&Query::new("anything?")).await.unwrap();

        assert!(answer.as_str().contains("CONTEXT:\n\n\nQUESTION: anything?"));
        assert_eq!(completion.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_timeout() {
        let pipeline = QueryPipeline::new(
            MockRetriever::new(["ctx"]),
            SlowCompletion(Duration::from_secs(120)),
        )
        .with_stage_timeout(Duration::from_secs(5));

        let err = pipeline.answer(&Query::new("q")).await.unwrap_err();

        assert_eq!(err.stage, QueryStage::Completion);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_respond_hides_error_details() {
        let pipeline = QueryPipeline::new(
            MockRetriever::new(["ctx"]),
            MockCompletion::failing("secret upstream detail"),
        );

        let text = pipeline.respond("q").await;

        assert_eq!(text, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_respond_returns_answer() {
        let pipeline = QueryPipeline::new(MockRetriever::new(["ctx"]), MockCompletion::fixed("Yes."));
        assert_eq!(pipeline.respond("q").await, "Yes.");
    }
}
