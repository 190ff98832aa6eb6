//! Command implementations.

pub mod config;
pub mod import;

pub use self::config::execute_config;
pub use self::import::{execute_import, run_import, ImportJob};
