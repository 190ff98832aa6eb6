//! Packsmith LLM Provider Layer
//!
//! Pluggable implementations of the `LlmProvider` trait from
//! `packsmith-domain`, plus provider configuration and advisory token/cost
//! estimation.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scripted mock for testing
//! - `OpenAiProvider`: Any OpenAI-compatible chat completions endpoint
//!
//! # Examples
//!
//! ```
//! use packsmith_llm::MockProvider;
//! use packsmith_domain::traits::LlmProvider;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let provider = MockProvider::new(r#"{"cards": []}"#);
//! let reply = provider.generate("system", "user").await.unwrap();
//! assert_eq!(reply, r#"{"cards": []}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod openai;
pub mod usage;

use packsmith_domain::traits::LlmProvider;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use config::{ConfigStore, MemoryConfigStore, ProviderConfig, ProviderKind};
pub use openai::OpenAiProvider;
pub use usage::{estimate_tokens, PricingRate};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

type Responder = dyn Fn(&str, &str) -> Result<String, LlmError> + Send + Sync;

/// Mock LLM provider for deterministic testing
///
/// Replies are taken, in order, from:
/// 1. the queue filled by [`push_response`](Self::push_response) / [`push_error`](Self::push_error),
/// 2. the responder closure, if one was set,
/// 3. the fixed default response.
///
/// Every prompt pair is recorded. Clones share queue, record and call count.
///
/// # Examples
///
/// ```
/// use packsmith_llm::MockProvider;
/// use packsmith_domain::traits::LlmProvider;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let provider = MockProvider::new("default");
/// provider.push_response("first");
/// provider.push_error("boom");
///
/// assert_eq!(provider.generate("s", "u").await.unwrap(), "first");
/// assert!(provider.generate("s", "u").await.is_err());
/// assert_eq!(provider.generate("s", "u").await.unwrap(), "default");
/// assert_eq!(provider.call_count(), 3);
/// # });
/// ```
#[derive(Clone)]
pub struct MockProvider {
    model: String,
    default_response: String,
    queue: Arc<Mutex<VecDeque<Result<String, String>>>>,
    responder: Option<Arc<Responder>>,
    prompts: Arc<Mutex<Vec<(String, String)>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock".to_string(),
            default_response: response.into(),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            responder: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every non-queued call with a closure of `(system, user)`
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Set the reported model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Queue a one-shot response
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.queue).push_back(Ok(response.into()));
    }

    /// Queue a one-shot failure
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.queue).push_back(Err(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// All `(system, user)` prompt pairs received so far
    pub fn prompts(&self) -> Vec<(String, String)> {
        lock(&self.prompts).clone()
    }

    /// The most recent user prompt
    pub fn last_user_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().map(|(_, user)| user.clone())
    }

    /// Forget recorded prompts (and with them the call count)
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }

    fn respond(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        lock(&self.prompts).push((system_prompt.to_string(), user_prompt.to_string()));

        if let Some(queued) = lock(&self.queue).pop_front() {
            return queued.map_err(LlmError::Other);
        }
        if let Some(responder) = &self.responder {
            return responder(system_prompt, user_prompt);
        }
        Ok(self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(r#"{"cards": [], "metadata": {"processedUpTo": 0}}"#)
    }
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("model", &self.model)
            .field("queued", &lock(&self.queue).len())
            .field("has_responder", &self.responder.is_some())
            .field("calls", &self.call_count())
            .finish()
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error> {
        self.respond(system_prompt, user_prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("system", "any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_queue_order() {
        let provider = MockProvider::new("default");
        provider.push_response("one");
        provider.push_response("two");

        assert_eq!(provider.generate("s", "a").await.unwrap(), "one");
        assert_eq!(provider.generate("s", "b").await.unwrap(), "two");
        assert_eq!(provider.generate("s", "c").await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.push_error("bad prompt");

        let result = provider.generate("s", "u").await;
        assert!(matches!(result, Err(LlmError::Other(msg)) if msg == "bad prompt"));
    }

    #[tokio::test]
    async fn test_mock_provider_responder_sees_prompts() {
        let provider = MockProvider::default().with_responder(|_, user| Ok(format!("echo:{}", user)));
        assert_eq!(provider.generate("s", "hello").await.unwrap(), "echo:hello");
    }

    #[tokio::test]
    async fn test_mock_provider_records_prompts() {
        let provider = MockProvider::new("ok");
        provider.generate("sys", "first").await.unwrap();
        provider.generate("sys", "second").await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts()[0], ("sys".to_string(), "first".to_string()));
        assert_eq!(provider.last_user_prompt().as_deref(), Some("second"));

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test").with_model_name("mock-large");
        let provider2 = provider1.clone();

        provider1.generate("s", "u").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
        assert_eq!(provider2.model_name(), "mock-large");
    }

    #[test]
    fn test_http_error_message_includes_status_and_body() {
        let err = LlmError::Http {
            status: 502,
            body: "upstream timeout".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: upstream timeout");
    }
}
