//! Packsmith Validator
//!
//! Structural and cross-reference checks for a finished card package.
//!
//! The Validator provides:
//! - Identity checks (missing ids and names, duplicate ids within a kind)
//! - Cross-kind id collision reporting
//! - Reference integrity against `customFieldDefinitions`
//!   (profession and domain-card domains, subclass main classes)
//! - Ancestry category checks
//!
//! Validation never fails as an operation: every finding is a
//! [`Diagnostic`](packsmith_domain::Diagnostic) and the caller decides what
//! blocks downstream use.
//!
//! # Examples
//!
//! ```
//! use packsmith_domain::traits::PackageValidator;
//! use packsmith_domain::CardPackage;
//! use packsmith_validator::{ValidationConfig, Validator};
//!
//! let validator = Validator::new(ValidationConfig::default());
//! let findings = validator.validate(&CardPackage::named("Empty"));
//! assert!(findings.is_empty());
//! ```

#![warn(missing_docs)]

mod config;
mod validator;

pub use config::ValidationConfig;
pub use validator::{Validator, DOMAINS_CATEGORY, PROFESSIONS_CATEGORY};
