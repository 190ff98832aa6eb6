//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the ingestion pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{CardPackage, Diagnostic};
use std::future::Future;

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (packsmith-llm). A provider sends
/// one system prompt and one user prompt and returns the raw text content
/// of the model's reply; interpreting that text is the caller's job.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Name of the model requests are sent to
    fn model_name(&self) -> &str;

    /// Generate a completion for a system + user prompt pair
    fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Trait for structural validation of a finished package
///
/// Implemented by packsmith-validator. Validation never fails as an
/// operation; every finding is returned as a diagnostic.
pub trait PackageValidator {
    /// Validate a package and report every finding
    fn validate(&self, package: &CardPackage) -> Vec<Diagnostic>;
}

impl<V: PackageValidator + ?Sized> PackageValidator for &V {
    fn validate(&self, package: &CardPackage) -> Vec<Diagnostic> {
        (**self).validate(package)
    }
}
