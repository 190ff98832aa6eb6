//! Packsmith CLI library.
//!
//! This library provides the pieces behind the `packsmith` binary: argument
//! parsing, the file-backed configuration store, command execution, and
//! output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::{Config, FileConfigStore};
pub use error::{CliError, Result};
pub use output::Formatter;
