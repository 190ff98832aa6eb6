//! Error types for the CLI application.

use packsmith_extractor::ExtractorError;
use packsmith_llm::LlmError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider setup error
    #[error("Provider error: {0}")]
    Llm(#[from] LlmError),

    /// Extractor error
    #[error("Import error: {0}")]
    Extractor(#[from] ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Aborted by a second interrupt
    #[error("Interrupted")]
    Interrupted,

    /// The imported package failed validation under `--strict`
    #[error("Validation failed with {0} error(s)")]
    ValidationFailed(usize),
}
