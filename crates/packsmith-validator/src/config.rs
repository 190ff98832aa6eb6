//! Validator configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Report cards without an id or name
    pub validate_identity: bool,

    /// Report duplicate ids inside one kind
    pub validate_duplicate_ids: bool,

    /// Report ids shared between kinds
    pub validate_cross_kind_ids: bool,

    /// Report cross-kind id collisions as errors instead of warnings
    pub cross_kind_ids_are_errors: bool,

    /// Check domain references against the `domains` definitions
    pub validate_domain_references: bool,

    /// Check subclass main classes against professions and the `professions` definitions
    pub validate_class_references: bool,

    /// Check ancestry categories are 1 or 2
    pub validate_ancestry_category: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_identity: true,
            validate_duplicate_ids: true,
            validate_cross_kind_ids: true,
            cross_kind_ids_are_errors: false,
            validate_domain_references: true,
            validate_class_references: true,
            validate_ancestry_category: true,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (identity checks only)
    pub fn permissive() -> Self {
        Self {
            validate_identity: true,
            validate_duplicate_ids: true,
            validate_cross_kind_ids: false,
            cross_kind_ids_are_errors: false,
            validate_domain_references: false,
            validate_class_references: false,
            validate_ancestry_category: false,
        }
    }

    /// Create a strict configuration (all checks, cross-kind collisions are errors)
    pub fn strict() -> Self {
        Self {
            cross_kind_ids_are_errors: true,
            ..Self::default()
        }
    }
}
