//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do when an incoming card has an id already in the package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Incoming record replaces the existing one
    Overwrite,
    /// Incoming record is discarded
    KeepExisting,
    /// Empty fields of the existing record are filled from the incoming one
    #[default]
    Merge,
}

impl ConflictStrategy {
    /// Parse a strategy name (`overwrite`, `keep_existing`/`keep-existing`, `merge`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "overwrite" => Some(ConflictStrategy::Overwrite),
            "keep_existing" | "keep" => Some(ConflictStrategy::KeepExisting),
            "merge" => Some(ConflictStrategy::Merge),
            _ => None,
        }
    }
}

/// Knobs of the response merger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Reconcile records by id; when false, incoming records are appended
    pub deduplicate_by_id: bool,

    /// Resolution for an id that is already present
    pub conflict_strategy: ConflictStrategy,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            deduplicate_by_id: true,
            conflict_strategy: ConflictStrategy::Merge,
        }
    }
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Characters sent to the model per call
    pub window_size: usize,

    /// Characters re-sent before the current position on later windows
    pub overlap: usize,

    /// Characters skipped after a failed or stalled call
    pub fallback_skip: usize,

    /// Upper bound on model calls per run
    pub max_iterations: usize,

    /// Maximum time for a single model call (seconds)
    pub call_timeout_secs: u64,

    /// Definition values per category shown to the model on later windows
    pub definitions_preview_limit: usize,

    /// Reconcile cards by id while merging
    pub deduplicate_by_id: bool,

    /// Resolution for an id that is already present
    pub conflict_strategy: ConflictStrategy,
}

impl ExtractorConfig {
    /// Get the call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Merge policy derived from this configuration
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy {
            deduplicate_by_id: self.deduplicate_by_id,
            conflict_strategy: self.conflict_strategy,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.window_size == 0 {
            return Err(ExtractorError::Config("window_size must be greater than 0".to_string()));
        }
        if self.overlap >= self.window_size {
            return Err(ExtractorError::Config(format!(
                "overlap ({}) must be smaller than window_size ({})",
                self.overlap, self.window_size
            )));
        }
        if self.fallback_skip == 0 {
            return Err(ExtractorError::Config("fallback_skip must be greater than 0".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(ExtractorError::Config("max_iterations must be greater than 0".to_string()));
        }
        if self.call_timeout_secs == 0 {
            return Err(ExtractorError::Config("call_timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            window_size: 6_000,
            overlap: 200,
            fallback_skip: 1_000,
            max_iterations: 50,
            call_timeout_secs: 120,
            definitions_preview_limit: 5,
            deduplicate_by_id: true,
            conflict_strategy: ConflictStrategy::Merge,
        }
    }
}

impl ExtractorConfig {
    /// Fast preset: bigger windows, smaller budget
    pub fn fast() -> Self {
        Self {
            window_size: 10_000,
            overlap: 200,
            fallback_skip: 2_000,
            max_iterations: 25,
            call_timeout_secs: 90,
            definitions_preview_limit: 3,
            ..Self::default()
        }
    }

    /// Thorough preset: smaller windows, more overlap, larger budget
    pub fn thorough() -> Self {
        Self {
            window_size: 4_000,
            overlap: 400,
            fallback_skip: 500,
            max_iterations: 120,
            call_timeout_secs: 300,
            definitions_preview_limit: 10,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 6_000);
        assert_eq!(config.overlap, 200);
        assert_eq!(config.fallback_skip, 1_000);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.call_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::fast().validate().is_ok());
        assert!(ExtractorConfig::thorough().validate().is_ok());
        assert!(ExtractorConfig::fast().window_size > ExtractorConfig::thorough().window_size);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_window() {
        let config = ExtractorConfig {
            overlap: 6_000,
            ..ExtractorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_zero_values_are_invalid() {
        for config in [
            ExtractorConfig { window_size: 0, ..Default::default() },
            ExtractorConfig { fallback_skip: 0, ..Default::default() },
            ExtractorConfig { max_iterations: 0, ..Default::default() },
            ExtractorConfig { call_timeout_secs: 0, ..Default::default() },
        ] {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_merge_policy_defaults() {
        let policy = ExtractorConfig::default().merge_policy();
        assert_eq!(policy, MergePolicy::default());
        assert!(policy.deduplicate_by_id);
        assert_eq!(policy.conflict_strategy, ConflictStrategy::Merge);
    }

    #[test]
    fn test_conflict_strategy_parse() {
        assert_eq!(ConflictStrategy::parse("keep-existing"), Some(ConflictStrategy::KeepExisting));
        assert_eq!(ConflictStrategy::parse("Overwrite"), Some(ConflictStrategy::Overwrite));
        assert_eq!(ConflictStrategy::parse("replace-all"), None);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            conflict_strategy: ConflictStrategy::KeepExisting,
            ..ExtractorConfig::thorough()
        };
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("conflict_strategy = \"keep_existing\""));

        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("window_size = 3000\n").unwrap();
        assert_eq!(parsed.window_size, 3_000);
        assert_eq!(parsed.max_iterations, 50);
    }
}
