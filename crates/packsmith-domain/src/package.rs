//! Card package - the accumulated, consumer-facing document

use crate::card::{
    AncestryCard, Card, CardRecord, CommunityCard, DomainCard, ProfessionCard, SubclassCard,
    VariantCard,
};
use crate::CardKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A card package.
///
/// This is the persisted/exported artifact: six ordered card collections,
/// controlled-vocabulary lists (`customFieldDefinitions`) and package
/// metadata. Ids are unique within one collection; nothing is enforced
/// across collections.
///
/// `pending_warnings` (`_warnings` on the wire) holds model-authored
/// advisories collected during ingestion. Finalization strips it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPackage {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Package author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Package description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category name -> allowed values, in order of first appearance
    #[serde(default)]
    pub custom_field_definitions: BTreeMap<String, Vec<String>>,

    /// Profession cards
    #[serde(default)]
    pub profession: Vec<ProfessionCard>,

    /// Ancestry cards
    #[serde(default)]
    pub ancestry: Vec<AncestryCard>,

    /// Community cards
    #[serde(default)]
    pub community: Vec<CommunityCard>,

    /// Subclass cards
    #[serde(default)]
    pub subclass: Vec<SubclassCard>,

    /// Domain cards
    #[serde(default)]
    pub domain: Vec<DomainCard>,

    /// Variant cards
    #[serde(default)]
    pub variant: Vec<VariantCard>,

    /// Model-authored advisories awaiting finalization
    #[serde(default, rename = "_warnings", skip_serializing_if = "Vec::is_empty")]
    pub pending_warnings: Vec<Value>,
}

/// Card counts of a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageStats {
    /// Total number of cards
    pub total: usize,

    /// Number of cards per kind (every kind present, zero included)
    pub by_kind: BTreeMap<CardKind, usize>,
}

impl PackageStats {
    /// Count for one kind
    pub fn count(&self, kind: CardKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

impl CardPackage {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty package with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Number of cards of one kind
    pub fn count(&self, kind: CardKind) -> usize {
        match kind {
            CardKind::Profession => self.profession.len(),
            CardKind::Ancestry => self.ancestry.len(),
            CardKind::Community => self.community.len(),
            CardKind::Subclass => self.subclass.len(),
            CardKind::Domain => self.domain.len(),
            CardKind::Variant => self.variant.len(),
        }
    }

    /// Total number of cards
    pub fn total_cards(&self) -> usize {
        CardKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    /// Whether the package holds no cards
    pub fn is_empty(&self) -> bool {
        self.total_cards() == 0
    }

    /// Per-kind and total card counts
    pub fn stats(&self) -> PackageStats {
        let by_kind: BTreeMap<CardKind, usize> =
            CardKind::ALL.iter().map(|k| (*k, self.count(*k))).collect();
        PackageStats {
            total: by_kind.values().sum(),
            by_kind,
        }
    }

    /// Values defined for a custom field category (empty if unknown)
    pub fn definitions(&self, category: &str) -> &[String] {
        self.custom_field_definitions
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `(id, name)` of every card of one kind, in collection order
    pub fn identities(&self, kind: CardKind) -> Vec<(Option<&str>, Option<&str>)> {
        fn collect<T: CardRecord>(cards: &[T]) -> Vec<(Option<&str>, Option<&str>)> {
            cards.iter().map(|c| (c.id(), c.name())).collect()
        }

        match kind {
            CardKind::Profession => collect(&self.profession),
            CardKind::Ancestry => collect(&self.ancestry),
            CardKind::Community => collect(&self.community),
            CardKind::Subclass => collect(&self.subclass),
            CardKind::Domain => collect(&self.domain),
            CardKind::Variant => collect(&self.variant),
        }
    }

    /// Append a card to the collection of its kind
    pub fn push(&mut self, card: Card) {
        match card {
            Card::Profession(c) => self.profession.push(c),
            Card::Ancestry(c) => self.ancestry.push(c),
            Card::Community(c) => self.community.push(c),
            Card::Subclass(c) => self.subclass.push(c),
            Card::Domain(c) => self.domain.push(c),
            Card::Variant(c) => self.variant.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_empty_package_shape() {
        let value = serde_json::to_value(CardPackage::new()).unwrap();
        for kind in CardKind::ALL {
            assert_eq!(value[kind.as_str()], json!([]));
        }
        assert_eq!(value["customFieldDefinitions"], json!({}));
        assert!(value.get("_warnings").is_none());
        assert!(value.get("name").is_none());
    }

    #[test]
    fn test_parse_consumer_document() {
        let doc = json!({
            "name": "Homebrew",
            "version": "1.0.0",
            "customFieldDefinitions": {"domains": ["Arcana", "Blade"]},
            "domain": [{"id": "d1", "名称": "Rune Ward", "领域": "Arcana", "等级": 1, "回想": 0}],
            "_warnings": ["check recall costs"]
        });
        let package: CardPackage = serde_json::from_value(doc).unwrap();
        assert_eq!(package.name.as_deref(), Some("Homebrew"));
        assert_eq!(package.definitions("domains"), ["Arcana", "Blade"]);
        assert_eq!(package.definitions("professions").len(), 0);
        assert_eq!(package.domain[0].recall, Some(0));
        assert_eq!(package.pending_warnings.len(), 1);
        assert_eq!(package.total_cards(), 1);
    }

    #[test]
    fn test_stats_include_every_kind() {
        let mut package = CardPackage::named("p");
        package.push(Card::Variant(VariantCard::default()));
        package.push(Card::Variant(VariantCard::default()));
        package.push(Card::Profession(ProfessionCard::default()));

        let stats = package.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_kind.len(), 6);
        assert_eq!(stats.count(CardKind::Variant), 2);
        assert_eq!(stats.count(CardKind::Ancestry), 0);
    }

    #[test]
    fn test_identities() {
        let mut package = CardPackage::new();
        package.push(Card::Community(CommunityCard {
            id: Some("c1".into()),
            name: Some("Loreborne".into()),
            ..Default::default()
        }));
        assert_eq!(
            package.identities(CardKind::Community),
            vec![(Some("c1"), Some("Loreborne"))]
        );
        assert!(package.identities(CardKind::Domain).is_empty());
    }

    proptest! {
        #[test]
        fn prop_total_matches_pushes(kinds in proptest::collection::vec(0usize..6, 0..40)) {
            let mut package = CardPackage::new();
            for k in &kinds {
                let card = match CardKind::ALL[*k] {
                    CardKind::Profession => Card::Profession(Default::default()),
                    CardKind::Ancestry => Card::Ancestry(Default::default()),
                    CardKind::Community => Card::Community(Default::default()),
                    CardKind::Subclass => Card::Subclass(Default::default()),
                    CardKind::Domain => Card::Domain(Default::default()),
                    CardKind::Variant => Card::Variant(Default::default()),
                };
                package.push(card);
            }
            let stats = package.stats();
            prop_assert_eq!(stats.total, kinds.len());
            prop_assert_eq!(stats.by_kind.values().sum::<usize>(), kinds.len());
        }
    }
}
