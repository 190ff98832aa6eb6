//! Card kinds - the six collections of a card package

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category a card belongs to.
///
/// The lowercase name doubles as the key of the matching collection in the
/// serialized package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Character class with two domains and starting stats
    Profession,

    /// Lineage card (each lineage has two cards, category 1 and 2)
    Ancestry,

    /// Community / upbringing card
    Community,

    /// Subclass card at a given level tier
    Subclass,

    /// Domain (spell/ability) card
    Domain,

    /// Catch-all for anything else
    Variant,
}

impl CardKind {
    /// All kinds in package order
    pub const ALL: [CardKind; 6] = [
        CardKind::Profession,
        CardKind::Ancestry,
        CardKind::Community,
        CardKind::Subclass,
        CardKind::Domain,
        CardKind::Variant,
    ];

    /// Collection key used in the serialized package
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Profession => "profession",
            CardKind::Ancestry => "ancestry",
            CardKind::Community => "community",
            CardKind::Subclass => "subclass",
            CardKind::Domain => "domain",
            CardKind::Variant => "variant",
        }
    }

    /// Resolve a model-supplied `type` tag.
    ///
    /// Matching ignores case, surrounding whitespace and `-`/`_`/space
    /// separators, and accepts English as well as Chinese synonyms.
    ///
    /// # Examples
    ///
    /// ```
    /// use packsmith_domain::CardKind;
    ///
    /// assert_eq!(CardKind::from_tag("Domain-Card"), Some(CardKind::Domain));
    /// assert_eq!(CardKind::from_tag("子职业"), Some(CardKind::Subclass));
    /// assert_eq!(CardKind::from_tag("weapon"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "profession" | "class" | "职业" | "职业卡" => Some(CardKind::Profession),
            "ancestry" | "race" | "heritage" | "种族" | "血统" | "种族卡" => Some(CardKind::Ancestry),
            "community" | "社群" | "社区" | "社群卡" => Some(CardKind::Community),
            "subclass" | "子职业" | "子职业卡" => Some(CardKind::Subclass),
            "domain" | "domaincard" | "spell" | "领域" | "领域卡" | "法术" => Some(CardKind::Domain),
            "variant" | "变体" | "变体卡" => Some(CardKind::Variant),
            _ => None,
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
