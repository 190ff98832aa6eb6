//! Package validation logic

use crate::ValidationConfig;
use packsmith_domain::traits::PackageValidator;
use packsmith_domain::{CardKind, CardPackage, Diagnostic, Severity};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Definition category listing valid domain names
pub const DOMAINS_CATEGORY: &str = "domains";

/// Definition category listing valid profession names
pub const PROFESSIONS_CATEGORY: &str = "professions";

/// The Validator checks a package before it is handed to consumers
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl Validator {
    /// Create a new Validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Missing ids/names and duplicate ids within each kind
    fn check_identity(&self, package: &CardPackage, out: &mut Vec<Diagnostic>) {
        for kind in CardKind::ALL {
            let mut first_seen: HashMap<&str, usize> = HashMap::new();

            for (idx, (id, name)) in package.identities(kind).into_iter().enumerate() {
                if self.config.validate_identity {
                    if is_blank(id) {
                        out.push(Diagnostic::error(format!("{}[{}].id", kind, idx), "missing id"));
                    }
                    if is_blank(name) {
                        out.push(Diagnostic::error(format!("{}[{}].name", kind, idx), "missing name"));
                    }
                }

                let Some(id) = id.filter(|id| !id.trim().is_empty()) else {
                    continue;
                };
                if let Some(first) = first_seen.get(id) {
                    if self.config.validate_duplicate_ids {
                        out.push(Diagnostic::error(
                            format!("{}[{}].id", kind, idx),
                            format!("duplicate id '{}' (first used by {}[{}])", id, kind, first),
                        ));
                    }
                } else {
                    first_seen.insert(id, idx);
                }
            }
        }
    }

    /// Ids that appear in more than one kind
    fn check_cross_kind_ids(&self, package: &CardPackage, out: &mut Vec<Diagnostic>) {
        let severity = if self.config.cross_kind_ids_are_errors {
            Severity::Error
        } else {
            Severity::Warning
        };
        let mut owner: HashMap<&str, CardKind> = HashMap::new();

        for kind in CardKind::ALL {
            for (idx, (id, _)) in package.identities(kind).into_iter().enumerate() {
                let Some(id) = id.filter(|id| !id.trim().is_empty()) else {
                    continue;
                };
                match owner.get(id) {
                    Some(first) if *first != kind => out.push(Diagnostic::new(
                        severity,
                        format!("{}[{}].id", kind, idx),
                        format!("id '{}' is also used by a {} card", id, first),
                    )),
                    Some(_) => {}
                    None => {
                        owner.insert(id, kind);
                    }
                }
            }
        }
    }

    /// Domain names must come from the `domains` definitions, when present
    fn check_domain_references(&self, package: &CardPackage, out: &mut Vec<Diagnostic>) {
        let known: HashSet<&str> = package
            .definitions(DOMAINS_CATEGORY)
            .iter()
            .map(String::as_str)
            .collect();
        if known.is_empty() {
            return;
        }

        let mut check = |path: String, value: Option<&str>| {
            if let Some(domain) = value.filter(|v| !v.trim().is_empty()) {
                if !known.contains(domain) {
                    out.push(Diagnostic::error(path, format!("unknown domain '{}'", domain)));
                }
            }
        };

        for (idx, card) in package.profession.iter().enumerate() {
            check(format!("profession[{}].domain1", idx), card.domain1.as_deref());
            check(format!("profession[{}].domain2", idx), card.domain2.as_deref());
        }
        for (idx, card) in package.domain.iter().enumerate() {
            check(format!("domain[{}].domain", idx), card.domain.as_deref());
        }
    }

    /// Subclass main classes must name a known profession, when any are known
    fn check_class_references(&self, package: &CardPackage, out: &mut Vec<Diagnostic>) {
        let known: HashSet<&str> = package
            .profession
            .iter()
            .filter_map(|p| p.name.as_deref())
            .chain(package.definitions(PROFESSIONS_CATEGORY).iter().map(String::as_str))
            .collect();
        if known.is_empty() {
            return;
        }

        for (idx, card) in package.subclass.iter().enumerate() {
            if let Some(class) = card.main_class.as_deref().filter(|v| !v.trim().is_empty()) {
                if !known.contains(class) {
                    out.push(Diagnostic::warning(
                        format!("subclass[{}].mainClass", idx),
                        format!("main class '{}' is not a known profession", class),
                    ));
                }
            }
        }
    }

    /// Ancestry cards come in pairs numbered 1 and 2
    fn check_ancestry_category(&self, package: &CardPackage, out: &mut Vec<Diagnostic>) {
        for (idx, card) in package.ancestry.iter().enumerate() {
            let path = format!("ancestry[{}].category", idx);
            match card.category {
                Some(1) | Some(2) => {}
                Some(other) => out.push(Diagnostic::error(
                    path,
                    format!("category must be 1 or 2, found {}", other),
                )),
                None => out.push(Diagnostic::warning(path, "missing category")),
            }
        }
    }
}

impl PackageValidator for Validator {
    fn validate(&self, package: &CardPackage) -> Vec<Diagnostic> {
        let mut findings = Vec::new();

        // 1. Identity and duplicate ids
        if self.config.validate_identity || self.config.validate_duplicate_ids {
            self.check_identity(package, &mut findings);
        }

        // 2. Cross-kind id collisions
        if self.config.validate_cross_kind_ids {
            self.check_cross_kind_ids(package, &mut findings);
        }

        // 3. Reference integrity
        if self.config.validate_domain_references {
            self.check_domain_references(package, &mut findings);
        }
        if self.config.validate_class_references {
            self.check_class_references(package, &mut findings);
        }

        // 4. Ancestry pairing
        if self.config.validate_ancestry_category {
            self.check_ancestry_category(package, &mut findings);
        }

        debug!(
            "Validated {} cards: {} findings ({} errors)",
            package.total_cards(),
            findings.len(),
            findings.iter().filter(|d| d.is_error()).count()
        );

        findings
    }
}
