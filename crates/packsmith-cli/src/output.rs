//! Output formatting for the CLI.

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use colored::*;
use packsmith_domain::{CardKind, Diagnostic, PackageStats, Severity};
use packsmith_extractor::{ImportOutcome, ProcessState, Termination};
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the result of an import.
    pub fn format_outcome(&self, outcome: &ImportOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_outcome_json(outcome),
            OutputFormat::Table => Ok(self.format_outcome_table(outcome)),
            OutputFormat::Quiet => Ok(String::new()),
        }
    }

    fn format_outcome_json(&self, outcome: &ImportOutcome) -> Result<String> {
        let summary = json!({
            "termination": outcome.termination,
            "iterations": outcome.iterations,
            "position": outcome.position,
            "totalLength": outcome.total_length,
            "stats": outcome.stats,
            "warnings": outcome.warnings,
            "errors": outcome.errors,
            "usage": outcome.usage,
        });
        Ok(serde_json::to_string_pretty(&summary)?)
    }

    fn format_outcome_table(&self, outcome: &ImportOutcome) -> String {
        let mut sections = vec![self.format_stats(&outcome.stats)];

        if !outcome.warnings.is_empty() {
            sections.push(self.format_diagnostics("Warnings", &outcome.warnings));
        }
        if !outcome.errors.is_empty() {
            sections.push(self.format_diagnostics("Errors", &outcome.errors));
        }

        sections.push(format!(
            "{} model call(s), ~{} input / ~{} output tokens, ~${:.4}",
            outcome.usage.calls,
            outcome.usage.input_tokens,
            outcome.usage.output_tokens,
            outcome.usage.estimated_cost
        ));

        let summary = format!(
            "{} after {} iteration(s) ({} of {} characters)",
            termination_label(outcome.termination),
            outcome.iterations,
            outcome.position,
            outcome.total_length
        );
        sections.push(match outcome.termination {
            Termination::Completed if outcome.errors.is_empty() => self.success(&summary),
            Termination::Completed => self.warning(&summary),
            Termination::Aborted | Termination::Cancelled => self.warning(&summary),
        });

        sections.join("\n\n")
    }

    /// Format card counts per kind as a table.
    pub fn format_stats(&self, stats: &PackageStats) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Kind", "Cards"]);
        for kind in CardKind::ALL {
            builder.push_record([kind.as_str().to_string(), stats.count(kind).to_string()]);
        }
        builder.push_record(["total".to_string(), stats.total.to_string()]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a titled list of diagnostics.
    pub fn format_diagnostics(&self, title: &str, diagnostics: &[Diagnostic]) -> String {
        let mut lines = vec![format!("{} ({}):", title, diagnostics.len())];
        for diagnostic in diagnostics {
            let line = format!("  {}", diagnostic);
            lines.push(match diagnostic.severity {
                Severity::Error => self.colorize(&line, "red"),
                Severity::Warning => self.colorize(&line, "yellow"),
                Severity::Info => self.colorize(&line, "blue"),
            });
        }
        lines.join("\n")
    }

    /// One-line progress report.
    pub fn progress(&self, state: &ProcessState) -> String {
        let line = match state {
            ProcessState::Parsing {
                progress,
                chunk,
                total_chunks,
                stats,
            } => format!(
                "[{:>3.0}%] window {}/~{}, {} card(s) so far",
                progress, chunk, total_chunks, stats.total
            ),
            ProcessState::Validating { progress } => format!("[{:>3.0}%] validating", progress),
            ProcessState::Completed {
                progress,
                stats,
                warnings,
                errors,
            } => format!(
                "[{:>3.0}%] done: {} card(s), {} warning(s), {} error(s)",
                progress,
                stats.total,
                warnings.len(),
                errors.len()
            ),
        };
        self.colorize(&line, "cyan")
    }

    /// Format the stored configuration with the API key redacted.
    pub fn format_config(&self, config: &Config) -> Result<String> {
        let redacted = config.provider.as_ref().map(|provider| {
            let mut provider = provider.clone();
            provider.api_key = provider.redacted_key();
            provider
        });
        let view = Config {
            provider: redacted,
            ..config.clone()
        };

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&view)?),
            OutputFormat::Table | OutputFormat::Quiet => Ok(toml::to_string_pretty(&view)?),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn termination_label(termination: Termination) -> &'static str {
    match termination {
        Termination::Completed => "Completed",
        Termination::Aborted => "Stopped at the iteration limit",
        Termination::Cancelled => "Cancelled",
    }
}
