//! Request, response and progress types for an import run

use packsmith_domain::{CardPackage, Diagnostic, PackageStats};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// How much of its window the model claims to have covered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The window was fully processed
    #[default]
    Complete,
    /// The model stopped early (e.g. output budget)
    Partial,
}

/// Offset reporting attached to every chunk reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkMetadata {
    /// Absolute character offset the model processed up to
    pub processed_up_to: usize,

    /// Absolute character offset the model asks to resume from
    pub next_should_start_from: Option<usize>,

    /// Completeness claimed by the model
    pub confidence: Confidence,
}

impl ChunkMetadata {
    /// Offset the next window should start from
    pub fn resume_offset(&self) -> usize {
        self.next_should_start_from.unwrap_or(self.processed_up_to)
    }
}

/// Package-level fields a reply may carry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageMetadata {
    /// Package name
    pub name: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// Package author
    pub author: Option<String>,
    /// Package description
    pub description: Option<String>,
}

/// The parsed model reply for one window
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkResponse {
    /// Raw card records, still unclassified
    pub cards: Vec<Value>,

    /// Newly observed definition values per category
    pub custom_field_definitions: BTreeMap<String, Vec<String>>,

    /// Offset reporting
    pub metadata: ChunkMetadata,

    /// Model-authored advisories, kept raw until finalization
    pub warnings: Vec<Value>,

    /// Package metadata, if the window named any
    pub package: PackageMetadata,
}

/// Counters of one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MergeStats {
    /// Cards whose id was new
    pub added: usize,
    /// Existing cards replaced wholesale
    pub replaced: usize,
    /// Existing cards that had empty fields filled
    pub filled: usize,
    /// Incoming cards that changed nothing
    pub discarded: usize,
    /// Cards classified as variant for lack of any signal
    pub defaulted_to_variant: usize,
    /// Records that could not be used at all
    pub dropped: usize,
}

/// Result of merging one chunk into the package
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The new package
    pub package: CardPackage,

    /// Issues met while merging
    pub warnings: Vec<Diagnostic>,

    /// Counters
    pub stats: MergeStats,
}

/// Output of the finalizer
#[derive(Debug, Clone)]
pub struct FinalizedPackage {
    /// Package with advisories stripped
    pub data: CardPackage,

    /// Non-blocking findings
    pub warnings: Vec<Diagnostic>,

    /// Blocking findings
    pub errors: Vec<Diagnostic>,

    /// Card counts
    pub stats: PackageStats,
}

/// Terminal state of the ingestion loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// The whole input was consumed
    Completed,
    /// The iteration budget ran out first
    Aborted,
    /// The cancel flag was raised
    Cancelled,
}

/// Advisory token and cost accounting
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UsageEstimate {
    /// Model calls made
    pub calls: usize,
    /// Estimated prompt tokens
    pub input_tokens: usize,
    /// Estimated completion tokens
    pub output_tokens: usize,
    /// Estimated cost in USD
    pub estimated_cost: f64,
}

impl UsageEstimate {
    /// Account for one call
    pub fn record(&mut self, input_tokens: usize, output_tokens: usize, cost: f64) {
        self.calls += 1;
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
        self.estimated_cost += cost;
    }
}

/// Everything an import run produces
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// The finished package
    pub data: CardPackage,

    /// Run warnings followed by finalization warnings
    pub warnings: Vec<Diagnostic>,

    /// Validation errors
    pub errors: Vec<Diagnostic>,

    /// Card counts
    pub stats: PackageStats,

    /// How the loop ended
    pub termination: Termination,

    /// Model calls attempted
    pub iterations: usize,

    /// Character offset reached
    pub position: usize,

    /// Input length in characters
    pub total_length: usize,

    /// Token and cost estimates
    pub usage: UsageEstimate,
}

impl ImportOutcome {
    /// Whether validation produced blocking errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Progress notification passed to the observer
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessState {
    /// Before each model call
    Parsing {
        /// 0 to 90
        progress: f64,
        /// 1-based window index
        chunk: usize,
        /// Advisory window count
        total_chunks: usize,
        /// Counts of the package so far
        stats: PackageStats,
    },

    /// Loop finished, finalizer running
    Validating {
        /// Always 95
        progress: f64,
    },

    /// Run finished
    Completed {
        /// Always 100
        progress: f64,
        /// Final counts
        stats: PackageStats,
        /// Final warnings
        warnings: Vec<Diagnostic>,
        /// Final errors
        errors: Vec<Diagnostic>,
    },
}

impl ProcessState {
    /// Phase name (`parsing`, `validating`, `completed`)
    pub fn phase(&self) -> &'static str {
        match self {
            ProcessState::Parsing { .. } => "parsing",
            ProcessState::Validating { .. } => "validating",
            ProcessState::Completed { .. } => "completed",
        }
    }

    /// Progress in percent
    pub fn progress(&self) -> f64 {
        match self {
            ProcessState::Parsing { progress, .. }
            | ProcessState::Validating { progress }
            | ProcessState::Completed { progress, .. } => *progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_offset_prefers_next_start() {
        let metadata = ChunkMetadata {
            processed_up_to: 900,
            next_should_start_from: Some(850),
            confidence: Confidence::Partial,
        };
        assert_eq!(metadata.resume_offset(), 850);

        let metadata = ChunkMetadata {
            processed_up_to: 900,
            ..Default::default()
        };
        assert_eq!(metadata.resume_offset(), 900);
    }

    #[test]
    fn test_usage_accumulates() {
        let mut usage = UsageEstimate::default();
        usage.record(100, 20, 0.5);
        usage.record(50, 10, 0.25);
        assert_eq!(usage.calls, 2);
        assert_eq!(usage.input_tokens, 150);
        assert_eq!(usage.output_tokens, 30);
        assert!((usage.estimated_cost - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_process_state_accessors() {
        let state = ProcessState::Validating { progress: 95.0 };
        assert_eq!(state.phase(), "validating");
        assert_eq!(state.progress(), 95.0);
    }
}
