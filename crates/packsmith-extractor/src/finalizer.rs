//! Result finalizer: strip model advisories, count, validate

use crate::types::FinalizedPackage;
use packsmith_domain::traits::PackageValidator;
use packsmith_domain::{CardPackage, CardRecord, Diagnostic, Severity};
use serde_json::Value;
use tracing::debug;

/// Per-card advisory fields and the severity they default to
const CARD_ADVISORIES: [(&str, Severity); 2] = [("_note", Severity::Info), ("_warning", Severity::Warning)];

/// Finalize an accumulated package.
///
/// Never fails: advisories become diagnostics, validator findings of error
/// severity become `errors`, everything else lands in `warnings`.
pub fn finalize<V: PackageValidator>(mut document: CardPackage, validator: &V) -> FinalizedPackage {
    let mut warnings = Vec::new();

    for (idx, entry) in std::mem::take(&mut document.pending_warnings).into_iter().enumerate() {
        warnings.push(advisory(entry, Severity::Warning, format!("_warnings[{}]", idx)));
    }

    strip_card_advisories(&mut document.profession, &mut warnings);
    strip_card_advisories(&mut document.ancestry, &mut warnings);
    strip_card_advisories(&mut document.community, &mut warnings);
    strip_card_advisories(&mut document.subclass, &mut warnings);
    strip_card_advisories(&mut document.domain, &mut warnings);
    strip_card_advisories(&mut document.variant, &mut warnings);

    let stats = document.stats();

    let (errors, findings): (Vec<_>, Vec<_>) =
        validator.validate(&document).into_iter().partition(Diagnostic::is_error);
    warnings.extend(findings);

    debug!(
        "Finalized {} cards: {} warnings, {} errors",
        stats.total,
        warnings.len(),
        errors.len()
    );

    FinalizedPackage {
        data: document,
        warnings,
        errors,
        stats,
    }
}

fn strip_card_advisories<T: CardRecord>(cards: &mut [T], out: &mut Vec<Diagnostic>) {
    for (idx, card) in cards.iter_mut().enumerate() {
        let path = format!("{}[{}]", T::KIND, idx);
        for (key, severity) in CARD_ADVISORIES {
            if let Some(value) = card.extra_mut().remove(key) {
                out.push(advisory(value, severity, path.clone()));
            }
        }
    }
}

/// Convert a string or `{severity, path, message}` object into a diagnostic
fn advisory(value: Value, default_severity: Severity, default_path: String) -> Diagnostic {
    match value {
        Value::String(message) => Diagnostic::new(default_severity, default_path, message),
        Value::Object(obj) => {
            let severity = obj
                .get("severity")
                .and_then(Value::as_str)
                .map_or(default_severity, Severity::parse);
            let path = obj
                .get("path")
                .and_then(Value::as_str)
                .filter(|p| !p.trim().is_empty())
                .map_or(default_path, str::to_string);
            let message = match obj.get("message") {
                Some(Value::String(m)) => m.clone(),
                _ => Value::Object(obj.clone()).to_string(),
            };
            Diagnostic::new(severity, path, message)
        }
        other => Diagnostic::new(default_severity, default_path, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsmith_domain::CardKind;
    use packsmith_validator::Validator;
    use serde_json::json;

    struct NoFindings;

    impl PackageValidator for NoFindings {
        fn validate(&self, _package: &CardPackage) -> Vec<Diagnostic> {
            Vec::new()
        }
    }

    fn package(value: Value) -> CardPackage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_strips_top_level_warnings() {
        let doc = package(json!({
            "_warnings": [
                "recall costs guessed",
                {"severity": "error", "path": "domain[0]", "message": "level missing"},
                {"note": "odd"},
                42
            ]
        }));

        let result = finalize(doc, &NoFindings);
        assert!(result.data.pending_warnings.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 4);
        assert_eq!(result.warnings[0], Diagnostic::warning("_warnings[0]", "recall costs guessed"));
        assert_eq!(result.warnings[1], Diagnostic::error("domain[0]", "level missing"));
        assert_eq!(result.warnings[2].message, r#"{"note":"odd"}"#);
        assert_eq!(result.warnings[3].message, "42");

        let value = serde_json::to_value(&result.data).unwrap();
        assert!(value.get("_warnings").is_none());
    }

    #[test]
    fn test_strips_card_notes() {
        let doc = package(json!({
            "variant": [
                {"id": "v1", "name": "A", "_note": "check art"},
                {"id": "v2", "name": "B", "_warning": {"message": "effect truncated"}, "art": "b.png"}
            ]
        }));

        let result = finalize(doc, &NoFindings);
        assert_eq!(result.warnings, vec![
            Diagnostic::info("variant[0]", "check art"),
            Diagnostic::warning("variant[1]", "effect truncated"),
        ]);
        assert!(result.data.variant[0].extra.is_empty());
        assert_eq!(result.data.variant[1].extra.get("art"), Some(&json!("b.png")));
    }

    #[test]
    fn test_stats_and_validation() {
        let doc = package(json!({
            "community": [{"id": "c1", "name": "Loreborne", "trait": "Well-read"}],
            "ancestry": [{"id": "a1", "lineage": "Elf", "category": 1}]
        }));

        let result = finalize(doc, &Validator::default_config());
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.count(CardKind::Community), 1);
        assert_eq!(result.errors, vec![Diagnostic::error("ancestry[0].name", "missing name")]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_package() {
        let result = finalize(CardPackage::new(), &Validator::default_config());
        assert_eq!(result.stats.total, 0);
        assert!(result.warnings.is_empty());
        assert!(result.errors.is_empty());
    }
}
