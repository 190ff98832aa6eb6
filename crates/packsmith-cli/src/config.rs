//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use packsmith_extractor::ExtractorConfig;
use packsmith_llm::{ConfigStore, ProviderConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Stored provider credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// Default extractor tuning
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

/// TOML-file backed configuration store.
///
/// The whole [`Config`] lives in one file; the [`ConfigStore`] impl reads and
/// writes only its `[provider]` table.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.packsmith/config.toml`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(Self::new(home.join(".packsmith").join("config.toml")))
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, or the default if the file does not exist.
    pub fn load_config(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save the configuration, creating the parent directory if needed.
    pub fn save_config(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    type Error = CliError;

    fn load(&self) -> Result<Option<ProviderConfig>> {
        Ok(self.load_config()?.provider)
    }

    fn save(&self, provider: &ProviderConfig) -> Result<()> {
        let mut config = self.load_config()?;
        config.provider = Some(provider.clone());
        self.save_config(&config)
    }
}
