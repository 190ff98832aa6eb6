//! Response merger: folds one chunk response into the accumulated package
//!
//! The merge is a pure function of its inputs; the existing package is
//! cloned, never modified.

use crate::classifier::{classify, is_empty_value, ClassificationSource, TYPE_TAG};
use crate::config::{ConflictStrategy, MergePolicy};
use crate::types::{ChunkResponse, MergeOutcome, MergeStats, PackageMetadata};
use packsmith_domain::{temporary_id, Card, CardPackage, CardRecord, Diagnostic};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Merge `incoming` into a copy of `existing`
pub fn merge(existing: &CardPackage, incoming: ChunkResponse, policy: MergePolicy) -> MergeOutcome {
    let mut package = existing.clone();
    let mut warnings = Vec::new();
    let mut stats = MergeStats::default();

    // 1. Classify; arrivals keeps per-kind arrival order
    let mut arrivals = CardPackage::new();
    for (idx, raw) in incoming.cards.into_iter().enumerate() {
        let path = format!("cards[{}]", idx);

        let Value::Object(mut record) = raw else {
            warn!("Dropping {}: not an object", path);
            warnings.push(Diagnostic::warning(path, "card is not an object, dropped"));
            stats.dropped += 1;
            continue;
        };

        let classification = classify(&record);
        record.remove(TYPE_TAG);

        if classification.source == ClassificationSource::Defaulted {
            stats.defaulted_to_variant += 1;
            warnings.push(Diagnostic::warning(
                path.clone(),
                "card kind could not be determined, stored as variant",
            ));
        }

        match Card::from_record(classification.kind, record) {
            Ok(card) => arrivals.push(card),
            Err(e) => {
                warn!("Dropping {} ({}): {}", path, classification.kind, e);
                warnings.push(Diagnostic::warning(
                    path,
                    format!("invalid {} card, dropped: {}", classification.kind, e),
                ));
                stats.dropped += 1;
            }
        }
    }

    // 2. Per-kind reconciliation
    let mut reconciler = Reconciler {
        policy,
        stats: &mut stats,
        warnings: &mut warnings,
    };
    reconciler.merge_kind(&mut package.profession, arrivals.profession);
    reconciler.merge_kind(&mut package.ancestry, arrivals.ancestry);
    reconciler.merge_kind(&mut package.community, arrivals.community);
    reconciler.merge_kind(&mut package.subclass, arrivals.subclass);
    reconciler.merge_kind(&mut package.domain, arrivals.domain);
    reconciler.merge_kind(&mut package.variant, arrivals.variant);

    // 3. Definitions union
    union_definitions(&mut package.custom_field_definitions, incoming.custom_field_definitions);

    // 4. Metadata, last non-empty wins
    apply_metadata(&mut package, incoming.package);

    // 5. Model advisories wait for the finalizer
    package.pending_warnings.extend(incoming.warnings);

    debug!("Merge stats: {:?}", stats);

    MergeOutcome {
        package,
        warnings,
        stats,
    }
}

struct Reconciler<'a> {
    policy: MergePolicy,
    stats: &'a mut MergeStats,
    warnings: &'a mut Vec<Diagnostic>,
}

impl Reconciler<'_> {
    fn merge_kind<T: CardRecord>(&mut self, target: &mut Vec<T>, incoming: Vec<T>) {
        let mut index: HashMap<String, usize> = HashMap::new();
        if self.policy.deduplicate_by_id {
            for (pos, card) in target.iter().enumerate() {
                if let Some(id) = card.id().filter(|id| !id.trim().is_empty()) {
                    index.entry(id.to_string()).or_insert(pos);
                }
            }
        }

        for mut card in incoming {
            let id = match card.id().map(str::trim).filter(|id| !id.is_empty()) {
                Some(id) => id.to_string(),
                None => {
                    let id = temporary_id(T::KIND, card.name());
                    card.set_id(id.clone());
                    id
                }
            };

            if !self.policy.deduplicate_by_id {
                target.push(card);
                self.stats.added += 1;
                continue;
            }

            let Some(&pos) = index.get(&id) else {
                index.insert(id, target.len());
                target.push(card);
                self.stats.added += 1;
                continue;
            };

            match self.policy.conflict_strategy {
                ConflictStrategy::Overwrite => {
                    target[pos] = card;
                    self.stats.replaced += 1;
                }
                ConflictStrategy::KeepExisting => {
                    self.stats.discarded += 1;
                }
                ConflictStrategy::Merge => match fill_fields(&target[pos], &card) {
                    Ok(Some(filled)) => {
                        target[pos] = filled;
                        self.stats.filled += 1;
                    }
                    Ok(None) => self.stats.discarded += 1,
                    Err(e) => {
                        warn!("Could not merge {} '{}': {}", T::KIND, id, e);
                        self.warnings.push(Diagnostic::warning(
                            format!("{}[{}]", T::KIND, pos),
                            format!("could not merge duplicate '{}', kept existing: {}", id, e),
                        ));
                        self.stats.discarded += 1;
                    }
                },
            }
        }
    }
}

/// Copy every non-empty incoming field whose existing counterpart is empty.
///
/// Returns `None` when nothing would change.
pub(crate) fn fill_fields<T: CardRecord>(existing: &T, incoming: &T) -> Result<Option<T>, serde_json::Error> {
    let Value::Object(mut base) = serde_json::to_value(existing)? else {
        return Ok(None);
    };
    let Value::Object(other) = serde_json::to_value(incoming)? else {
        return Ok(None);
    };

    let mut changed = false;
    for (key, value) in other {
        if is_empty_value(&value) {
            continue;
        }
        if base.get(&key).is_some_and(|current| !is_empty_value(current)) {
            continue;
        }
        base.insert(key, value);
        changed = true;
    }

    if !changed {
        return Ok(None);
    }
    serde_json::from_value(Value::Object(base)).map(Some)
}

/// Union per category, keeping order of first appearance
pub(crate) fn union_definitions(
    target: &mut BTreeMap<String, Vec<String>>,
    incoming: BTreeMap<String, Vec<String>>,
) {
    for (category, values) in incoming {
        let known = target.entry(category).or_default();
        for value in values {
            if !known.contains(&value) {
                known.push(value);
            }
        }
    }
}

fn apply_metadata(package: &mut CardPackage, metadata: PackageMetadata) {
    fn set(slot: &mut Option<String>, value: Option<String>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            *slot = Some(value);
        }
    }

    set(&mut package.name, metadata.name);
    set(&mut package.version, metadata.version);
    set(&mut package.author, metadata.author);
    set(&mut package.description, metadata.description);
}
