//! OpenAI-compatible Provider Implementation
//!
//! Talks to any service exposing the `/chat/completions` endpoint
//! (OpenAI, DeepSeek, OpenRouter, self-hosted gateways).
//!
//! # Wire contract
//!
//! Request:
//!
//! ```text
//! POST {base_url}/chat/completions
//! Authorization: Bearer {api_key}
//! { "model": ..., "messages": [{"role": "system", ...}, {"role": "user", ...}],
//!   "temperature": 0.1, "response_format": {"type": "json_object"} }
//! ```
//!
//! The reply's `choices[0].message.content` is returned verbatim. A
//! non-success status, an unparseable envelope or a missing content string
//! is an error. There is no retry here; callers decide how to recover.
//!
//! # Examples
//!
//! ```no_run
//! use packsmith_llm::{OpenAiProvider, ProviderConfig, ProviderKind};
//!
//! let config = ProviderConfig::new(ProviderKind::OpenAi, "sk-...");
//! let provider = OpenAiProvider::new(&config).unwrap();
//! assert_eq!(provider.endpoint(), "https://api.openai.com/v1/chat/completions");
//! ```

use crate::{LlmError, ProviderConfig};
use packsmith_domain::traits::LlmProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sampling temperature sent with every request
pub const TEMPERATURE: f32 = 0.1;

/// OpenAI-compatible chat completions provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

/// Request body for the chat completions API
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response envelope from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider from a validated config
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the config is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url()?),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body<'a>(&'a self, system_prompt: &'a str, user_prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat { kind: "json_object" },
        }
    }

    /// Send one chat completion request and return the message content
    ///
    /// # Errors
    ///
    /// - [`LlmError::Communication`] if the request cannot be sent
    /// - [`LlmError::ModelNotAvailable`] on HTTP 404 (message carries status and body)
    /// - [`LlmError::RateLimitExceeded`] on HTTP 429 (message carries status and body)
    /// - [`LlmError::Http`] on any other non-success status (carries the raw body)
    /// - [`LlmError::InvalidResponse`] if the envelope is not the expected shape
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let body = self.request_body(system_prompt, user_prompt);

        debug!(
            "POST {} (model {}, {} + {} prompt chars)",
            self.endpoint,
            self.model,
            system_prompt.len(),
            user_prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(status_error(status, &self.model, text));
        }

        parse_completion(&text)
    }
}

/// Map a non-success status to an error whose message names the status and the raw body
pub(crate) fn status_error(status: reqwest::StatusCode, model: &str, body: String) -> LlmError {
    match status {
        reqwest::StatusCode::NOT_FOUND => {
            LlmError::ModelNotAvailable(format!("HTTP {} for model {}: {}", status.as_u16(), model, body))
        }
        reqwest::StatusCode::TOO_MANY_REQUESTS => {
            LlmError::RateLimitExceeded(format!("HTTP {}: {}", status.as_u16(), body))
        }
        _ => LlmError::Http {
            status: status.as_u16(),
            body,
        },
    }
}

/// Extract `choices[0].message.content` from a chat completions envelope
pub(crate) fn parse_completion(body: &str) -> Result<String, LlmError> {
    let envelope: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no message content".to_string()))
}

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error> {
        self.complete(system_prompt, user_prompt).await
    }
}
