//! Provider configuration and the credential store contract

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Default timeout for a single completion request (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which OpenAI-compatible service to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// api.openai.com
    #[default]
    OpenAi,
    /// api.deepseek.com
    Deepseek,
    /// openrouter.ai
    OpenRouter,
    /// Any other OpenAI-compatible endpoint (base URL required)
    Custom,
}

impl ProviderKind {
    /// Parse a provider name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "deepseek" => Some(ProviderKind::Deepseek),
            "openrouter" => Some(ProviderKind::OpenRouter),
            "custom" => Some(ProviderKind::Custom),
            _ => None,
        }
    }

    /// Provider name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Deepseek => "deepseek",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Custom => "custom",
        }
    }

    /// Base URL used when the config does not name one
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
            ProviderKind::Deepseek => Some("https://api.deepseek.com/v1"),
            ProviderKind::OpenRouter => Some("https://openrouter.ai/api/v1"),
            ProviderKind::Custom => None,
        }
    }

    /// Model used when the config does not name one
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Deepseek => "deepseek-chat",
            ProviderKind::OpenRouter => "openai/gpt-4o-mini",
            ProviderKind::Custom => "",
        }
    }
}

/// Connection settings for a model provider.
///
/// `Debug` output never contains the API key.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider kind
    #[serde(default)]
    pub provider: ProviderKind,

    /// Bearer token
    #[serde(default)]
    pub api_key: String,

    /// Override of the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model name
    #[serde(default)]
    pub model: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ProviderConfig {
    /// Create a config with the provider's default model
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: None,
            model: provider.default_model().to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolved base URL without a trailing slash
    pub fn base_url(&self) -> Result<String, LlmError> {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.provider.default_base_url())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .ok_or_else(|| {
                LlmError::Config(format!("provider '{}' requires a base_url", self.provider.as_str()))
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::Config("api_key must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::Config("model must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(LlmError::Config("timeout_secs must be greater than 0".to_string()));
        }
        self.base_url().map(|_| ())
    }

    /// API key with everything but the last four characters masked
    pub fn redacted_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.redacted_key())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Capability for persisting provider credentials.
///
/// The storage mechanism (file, keychain, browser storage) is up to the
/// implementor; the pipeline only ever calls `load` and `save`.
pub trait ConfigStore {
    /// Error type for store operations
    type Error;

    /// Load the stored config, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<ProviderConfig>, Self::Error>;

    /// Persist a config, replacing any previous one
    fn save(&self, config: &ProviderConfig) -> Result<(), Self::Error>;
}

/// In-process [`ConfigStore`], for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    slot: Mutex<Option<ProviderConfig>>,
}

impl MemoryConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    type Error = Infallible;

    fn load(&self) -> Result<Option<ProviderConfig>, Self::Error> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, config: &ProviderConfig) -> Result<(), Self::Error> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(())
    }
}
