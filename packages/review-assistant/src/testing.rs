//! Testing utilities including mock implementations.
//!
//! These are useful for exercising both pipelines without touching the
//! network or a real language model.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::{CapabilityError, CapabilityResult};
use crate::traits::{completion::Completion, retriever::Retriever};

pub use crate::fetchers::MockPageFetcher;

/// Builder for listing-page markup shaped like the default selectors expect.
///
/// ```rust
/// use review_assistant::testing::ListingPage;
///
/// let html = ListingPage::new()
///     .review("Buds A", "4.1", "Good", "Nice sound")
///     .render();
/// assert!(html.contains("Buds A"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    cards: Vec<String>,
}

impl ListingPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a complete review card.
    pub fn review(mut self, title: &str, rating: &str, summary: &str, body: &str) -> Self {
        self.cards.push(format!(
            concat!(
                "<div class=\"col\">",
                "<a class=\"wjcEIp\" href=\"/p/1\">{}</a>",
                "<div class=\"XQDdHH\">{}</div>",
                "<div class=\"yN+eNk w9jEaj\">{}</div>",
                "<div class=\"K5lpE5\">{}</div>",
                "</div>"
            ),
            escape(title),
            escape(rating),
            escape(summary),
            escape(body)
        ));
        self
    }

    /// Add a card that only carries a title (simulates a missing field group).
    pub fn title_only(mut self, title: &str) -> Self {
        self.cards.push(format!(
            "<div class=\"col\"><a class=\"wjcEIp\" href=\"/p/2\">{}</a></div>",
            escape(title)
        ));
        self
    }

    /// Just the results container.
    pub fn render_container(&self) -> String {
        format!(
            "<div class=\"DOjaWF gdgoEp\">{}</div>",
            self.cards.concat()
        )
    }

    /// Full document with header chrome around the results container.
    pub fn render(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>Earbuds</title></head><body>\
             <header><a class=\"logo\">Shop</a></header>{}\
             <footer>footer</footer></body></html>",
            self.render_container()
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A mock retriever returning a fixed snippet list.
#[derive(Default, Clone)]
pub struct MockRetriever {
    snippets: Vec<String>,
    failure: Option<String>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockRetriever {
    /// Always return `snippets`, in order.
    pub fn new(snippets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            snippets: snippets.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Always fail as unavailable.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Queries received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(&self, query: &str) -> CapabilityResult<Vec<String>> {
        self.calls.write().unwrap().push(query.to_string());

        match &self.failure {
            Some(reason) => Err(CapabilityError::Unavailable(reason.clone())),
            None => Ok(self.snippets.clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Clone)]
enum CompletionMode {
    Echo,
    Fixed(String),
    Fail(String),
}

/// A mock completion backend.
///
/// Echoes the prompt by default, which makes the rendered prompt observable
/// through the answer.
#[derive(Clone)]
pub struct MockCompletion {
    mode: CompletionMode,
    calls: Arc<RwLock<Vec<String>>>,
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::echo()
    }
}

impl MockCompletion {
    /// Return the prompt unchanged.
    pub fn echo() -> Self {
        Self {
            mode: CompletionMode::Echo,
            calls: Arc::default(),
        }
    }

    /// Return `text` for every prompt.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self {
            mode: CompletionMode::Fixed(text.into()),
            calls: Arc::default(),
        }
    }

    /// Fail every call with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            mode: CompletionMode::Fail(message.into()),
            calls: Arc::default(),
        }
    }

    /// Prompts received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl Completion for MockCompletion {
    async fn complete(&self, prompt: &str) -> CapabilityResult<String> {
        self.calls.write().unwrap().push(prompt.to_string());

        match &self.mode {
            CompletionMode::Echo => Ok(prompt.to_string()),
            CompletionMode::Fixed(text) => Ok(text.clone()),
            CompletionMode::Fail(message) => Err(CapabilityError::Api {
                status: 500,
                body: message.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_retriever_tracks_calls() {
        let retriever = MockRetriever::new(["a", "b"]);
        let snippets = retriever.retrieve("query").await.unwrap();

        assert_eq!(snippets, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(retriever.calls(), vec!["query".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_completion_modes() {
        assert_eq!(MockCompletion::echo().complete("p").await.unwrap(), "p");
        assert_eq!(MockCompletion::fixed("x").complete("p").await.unwrap(), "x");
        tokio_test::assert_err!(MockCompletion::failing("down").complete("p").await);
    }

    #[test]
    fn test_listing_page_escapes_text() {
        let html = ListingPage::new().review("A<B", "4", "s", "b").render();
        assert!(html.contains("A&lt;B"));
    }
}
