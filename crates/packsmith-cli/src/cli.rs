//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Packsmith - Turn free-form card text into structured card packages.
#[derive(Debug, Parser)]
#[command(name = "packsmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.packsmith/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (nothing but errors)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a text file into a card package
    Import(ImportArgs),

    /// Inspect or update the stored configuration
    Config(ConfigArgs),
}

/// Provider connection overrides shared by `import` and `config set`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProviderArgs {
    /// Provider (openai, deepseek, openrouter, custom)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key
    #[arg(long, env = "PACKSMITH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Extractor tuning overrides shared by `import` and `config set`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TuningArgs {
    /// Characters per window
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Characters repeated from the previous window
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Maximum number of model calls
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// Text file to import
    pub file: PathBuf,

    /// Existing package JSON to extend
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Where to write the package (default: <FILE stem>.package.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Apply strict validation and fail when the package has errors
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub provider: ProviderArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the stored configuration (API key redacted)
    Show,

    /// Update stored values
    Set {
        #[command(flatten)]
        provider: ProviderArgs,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Print the configuration file path
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
