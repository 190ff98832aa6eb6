//! Packsmith Domain Layer
//!
//! Core vocabulary shared by every other Packsmith crate: the six card kinds,
//! their typed records, the accumulated [`CardPackage`], the uniform
//! [`Diagnostic`] record, and the capability traits that infrastructure
//! crates implement.
//!
//! ## Key Concepts
//!
//! - **Card kind**: one of profession, ancestry, community, subclass, domain, variant
//! - **Card record**: a typed field set per kind, plus an open `extra` map for
//!   fields the model emitted that the schema does not name
//! - **Card package**: the consumer-facing document (six ordered collections,
//!   custom field definitions, package metadata)
//! - **Diagnostic**: `{severity, path, message}` advisory used for warnings and errors
//!
//! ## Architecture
//!
//! - No I/O, no async runtime
//! - Trait definitions for the model call and package validation
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod card;
pub mod diagnostic;
pub mod kind;
mod lenient;
pub mod package;
pub mod traits;

// Re-exports for convenience
pub use card::{
    temporary_id, AncestryCard, Card, CardRecord, CommunityCard, DomainCard, ProfessionCard,
    SubclassCard, VariantCard,
};
pub use diagnostic::{Diagnostic, Severity};
pub use kind::CardKind;
pub use package::{CardPackage, PackageStats};
