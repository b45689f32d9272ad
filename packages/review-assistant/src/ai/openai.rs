//! OpenAI-compatible chat completion backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use review_assistant::ai::OpenAICompletion;
//!
//! let completion = OpenAICompletion::from_env()?.with_model("gpt-4o");
//! let pipeline = QueryPipeline::new(retriever, completion);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CapabilityError, CapabilityResult, ConfigError};
use crate::security::ApiKey;
use crate::traits::completion::Completion;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat completion over `POST {base_url}/chat/completions`.
///
/// The rendered prompt is sent as a single user message at temperature 0.
#[derive(Clone)]
pub struct OpenAICompletion {
    client: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl OpenAICompletion {
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ApiKey::from_env("OPENAI_API_KEY")?))
    }

    /// Set the chat model (default: gpt-4o-mini).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (Azure, proxies, local servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl std::fmt::Debug for OpenAICompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompletion")
            .field("api_key", &self.api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// First choice's content, or `EmptyResponse` if there is none.
fn first_content(response: ChatResponse) -> CapabilityResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(CapabilityError::EmptyResponse)
}

#[async_trait]
impl Completion for OpenAICompletion {
    async fn complete(&self, prompt: &str) -> CapabilityResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Requesting completion");

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", self.api_key.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| CapabilityError::Request(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::Parse(e.to_string()))?;

        first_content(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::stub_server::{response, serve_once};

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_first_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Buy X1"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "Buy X1");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_content(empty), Err(CapabilityError::EmptyResponse)));

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(first_content(null), Err(CapabilityError::EmptyResponse)));
    }

    #[test]
    fn test_builder_and_debug_redaction() {
        let completion = OpenAICompletion::new("sk-test")
            .with_model("gpt-4o")
            .with_base_url("http://localhost:8080/v1/");

        let debug = format!("{completion:?}");
        assert_eq!(completion.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert!(debug.contains("gpt-4o"));
        assert!(!debug.contains("sk-test"));
    }

    async fn completion_against(raw: String) -> CapabilityResult<String> {
        let base = serve_once(raw).await;
        OpenAICompletion::new("sk-test")
            .with_base_url(format!("{base}/v1"))
            .complete("which earbuds?")
            .await
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Get the T110."}}]}"#;
        let text = completion_against(response("200 OK", "application/json", body))
            .await
            .unwrap();
        assert_eq!(text, "Get the T110.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let result = completion_against(response(
            "429 Too Many Requests",
            "application/json",
            r#"{"error":"rate limited"}"#,
        ))
        .await;

        match result {
            Err(CapabilityError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let result = completion_against(response("200 OK", "application/json", "not json")).await;
        assert!(matches!(result, Err(CapabilityError::Parse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let completion = OpenAICompletion::new("sk-test").with_base_url("http://127.0.0.1:9/v1");
        let result = completion.complete("hi").await;
        assert!(matches!(result, Err(CapabilityError::Request(_))));
    }
}
