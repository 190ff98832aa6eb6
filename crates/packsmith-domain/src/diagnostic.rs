//! Diagnostics - the uniform advisory record

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only
    Info,

    /// Something the user should look at
    Warning,

    /// Blocks downstream use (e.g. export)
    Error,
}

impl Severity {
    /// Parse a severity label as written by a model.
    ///
    /// Unknown labels read as [`Severity::Warning`].
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "info" | "information" | "note" | "hint" => Severity::Info,
            "error" | "err" | "fatal" | "critical" => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A `{severity, path, message}` advisory.
///
/// `path` points into the package, e.g. `domain[3].level` or
/// `customFieldDefinitions.domains`; it is empty for run-level notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,

    /// Location inside the package
    #[serde(default)]
    pub path: String,

    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an info diagnostic
    pub fn info(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, path, message)
    }

    /// Create a warning diagnostic
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, path, message)
    }

    /// Create an error diagnostic
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, path, message)
    }

    /// Whether this diagnostic has error severity
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.severity.as_str(), self.message)
        } else {
            write!(f, "[{}] {}: {}", self.severity.as_str(), self.path, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("ERROR"), Severity::Error);
        assert_eq!(Severity::parse("note"), Severity::Info);
        assert_eq!(Severity::parse("warn"), Severity::Warning);
        assert_eq!(Severity::parse("whatever"), Severity::Warning);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::error("domain[0].level", "level out of range");
        assert_eq!(d.to_string(), "[error] domain[0].level: level out of range");

        let d = Diagnostic::warning("", "iteration budget exhausted");
        assert_eq!(d.to_string(), "[warning] iteration budget exhausted");
    }

    #[test]
    fn test_is_error() {
        assert!(Diagnostic::error("", "x").is_error());
        assert!(!Diagnostic::info("", "x").is_error());
    }
}
