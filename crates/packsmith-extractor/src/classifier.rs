//! Card classification: which of the six collections a raw record belongs to

use packsmith_domain::CardKind;
use serde_json::{Map, Value};

/// Key holding the model's explicit kind tag
pub const TYPE_TAG: &str = "type";

/// How a kind was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// Explicit `type` tag
    Tagged,
    /// Structural heuristic matched
    Inferred,
    /// Nothing matched; fell back to variant
    Defaulted,
}

/// Kind assigned to a raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Assigned kind
    pub kind: CardKind,
    /// How it was decided
    pub source: ClassificationSource,
}

const DOMAIN1: &[&str] = &["domain1", "领域1"];
const DOMAIN2: &[&str] = &["domain2", "领域2"];
const LINEAGE: &[&str] = &["lineage", "种族"];
const CATEGORY: &[&str] = &["category", "类别"];
const TRAIT: &[&str] = &["trait", "特性"];
const SPELLCASTING: &[&str] = &["spellcastingTrait", "施法"];
const MAIN_CLASS: &[&str] = &["mainClass", "主职"];
const SUBCLASS: &[&str] = &["subclass", "子职业"];
const LEVEL: &[&str] = &["level", "等级"];
const DOMAIN: &[&str] = &["domain", "领域"];
const RECALL: &[&str] = &["recall", "回想"];

/// Classify a raw record.
///
/// An explicit, recognised `type` tag wins. Otherwise the structural
/// heuristics run in a fixed order: profession, ancestry, community,
/// subclass, domain. A record matching none of them is a variant.
pub fn classify(record: &Map<String, Value>) -> Classification {
    if let Some(kind) = record
        .get(TYPE_TAG)
        .and_then(Value::as_str)
        .and_then(CardKind::from_tag)
    {
        return Classification {
            kind,
            source: ClassificationSource::Tagged,
        };
    }

    match infer(record) {
        Some(kind) => Classification {
            kind,
            source: ClassificationSource::Inferred,
        },
        None => Classification {
            kind: CardKind::Variant,
            source: ClassificationSource::Defaulted,
        },
    }
}

fn infer(record: &Map<String, Value>) -> Option<CardKind> {
    let has = |keys: &[&str]| field(record, keys).is_some();

    if has(DOMAIN1) && has(DOMAIN2) {
        return Some(CardKind::Profession);
    }

    if has(LINEAGE) && field(record, CATEGORY).and_then(number).is_some_and(|c| c == 1 || c == 2) {
        return Some(CardKind::Ancestry);
    }

    if has(TRAIT) && !has(SPELLCASTING) {
        return Some(CardKind::Community);
    }

    let level = field(record, LEVEL);
    let tier_level = level.is_some_and(|v| v.is_string() && number(v).is_none());
    if has(MAIN_CLASS) || has(SUBCLASS) || (has(SPELLCASTING) && tier_level) {
        return Some(CardKind::Subclass);
    }

    if has(DOMAIN)
        && level.and_then(number).is_some()
        && field(record, RECALL).and_then(number).is_some()
    {
        return Some(CardKind::Domain);
    }

    None
}

/// First non-empty value under any of the keys
fn field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !is_empty_value(v))
}

fn number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Null, blank string, empty array or empty object
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
