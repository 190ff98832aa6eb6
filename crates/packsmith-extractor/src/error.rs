//! Error types for the Extractor

use thiserror::Error;

/// Errors that abort an import run.
///
/// Everything that can go wrong with an individual chunk is recovered
/// inside the loop; only a configuration that cannot drive the loop at all
/// is reported here.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of a single model round-trip.
///
/// Never escapes [`Extractor::process`](crate::Extractor::process): the
/// orchestrator logs it, records a warning and skips ahead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelCallError {
    /// Transport or provider failure (status and raw body included)
    #[error("Provider error: {0}")]
    Provider(String),

    /// The call did not finish in time
    #[error("Model call timed out after {0}s")]
    Timeout(u64),

    /// Reply content is not JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A required field is absent
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// JSON of the wrong shape
    #[error("Invalid response shape: {0}")]
    InvalidShape(String),
}
