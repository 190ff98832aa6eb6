//! Packsmith Extractor
//!
//! Converts free-form card text into a structured [`CardPackage`](packsmith_domain::CardPackage) by
//! prompting a language model over overlapping windows of the input.
//!
//! # Architecture
//!
//! ```text
//! Text → Windowing → Prompt → Model Gateway → Merger → (next window) … → Finalizer → Package
//! ```
//!
//! # Key Features
//!
//! - **Character windows**: fixed-size windows with overlap, sliced by character so CJK input is safe
//! - **Offset reporting**: the model says where it stopped; the loop resumes there
//! - **Guaranteed progress**: failed or stalled windows are skipped by a fixed distance
//! - **Bounded runs**: at most `max_iterations` model calls; partial results are always returned
//! - **Id reconciliation**: cards seen in several windows are merged field by field
//!
//! # Example Usage
//!
//! ```
//! use packsmith_domain::CardPackage;
//! use packsmith_extractor::{Extractor, ExtractorConfig, Termination};
//! use packsmith_llm::MockProvider;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let text = "Rune Ward (Arcana, level 1, recall 0): reduce incoming damage.";
//! let llm = MockProvider::new(format!(
//!     r#"{{"cards": [{{"type": "domain", "id": "rune-ward", "name": "Rune Ward",
//!         "domain": "Arcana", "level": 1, "recall": 0}}],
//!        "metadata": {{"processedUpTo": {}}}}}"#,
//!     text.chars().count()
//! ));
//! let extractor = Extractor::with_default_validator(llm, ExtractorConfig::default());
//!
//! let outcome = extractor.process(text, CardPackage::new(), |_| {}).await.unwrap();
//!
//! assert_eq!(outcome.termination, Termination::Completed);
//! assert_eq!(outcome.iterations, 1);
//! assert_eq!(outcome.data.domain[0].name.as_deref(), Some("Rune Ward"));
//! # });
//! ```

#![warn(missing_docs)]

mod chunking;
mod classifier;
mod config;
mod error;
mod extractor;
mod finalizer;
mod gateway;
mod merger;
mod parser;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use chunking::{estimated_chunks, window, InputText, Window};
pub use classifier::{classify, Classification, ClassificationSource};
pub use config::{ConflictStrategy, ExtractorConfig, MergePolicy};
pub use error::{ExtractorError, ModelCallError};
pub use extractor::Extractor;
pub use finalizer::finalize;
pub use gateway::{GatewayReply, ModelGateway};
pub use merger::merge;
pub use parser::parse_chunk_response;
pub use prompt::{PromptBuilder, SYSTEM_PROMPT};
pub use types::{
    ChunkMetadata, ChunkResponse, Confidence, FinalizedPackage, ImportOutcome, MergeOutcome,
    MergeStats, PackageMetadata, ProcessState, Termination, UsageEstimate,
};
