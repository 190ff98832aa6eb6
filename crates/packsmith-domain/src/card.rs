//! Card records - one typed field set per card kind
//!
//! Every record carries an `id`, a `name`, its kind-specific fields and an
//! `extra` map holding whatever else the source supplied (image URLs,
//! model advisories such as `_note`, fields from newer package versions).
//! Field names serialize as camelCase; Chinese field names from localized
//! packages are accepted on input.

use crate::lenient;
use crate::CardKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Common behaviour of the six typed card records.
pub trait CardRecord: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Kind this record type belongs to
    const KIND: CardKind;

    /// Card identifier, if any
    fn id(&self) -> Option<&str>;

    /// Replace the identifier
    fn set_id(&mut self, id: String);

    /// Display name, if any
    fn name(&self) -> Option<&str>;

    /// Fields outside the typed schema
    fn extra(&self) -> &Map<String, Value>;

    /// Mutable access to fields outside the typed schema
    fn extra_mut(&mut self) -> &mut Map<String, Value>;
}

/// Profession (class) card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfessionCard {
    /// Identifier
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(alias = "名称", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Flavour / summary text
    #[serde(alias = "简介", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// First domain
    #[serde(alias = "领域1", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub domain1: Option<String>,
    /// Second domain
    #[serde(alias = "领域2", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub domain2: Option<String>,
    /// Starting hit points
    #[serde(alias = "起始生命", deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub starting_hit_points: Option<u32>,
    /// Starting evasion
    #[serde(alias = "起始闪避", deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub starting_evasion: Option<u32>,
    /// Starting items
    #[serde(alias = "起始物品", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub starting_items: Option<String>,
    /// Hope feature
    #[serde(alias = "希望特性", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub hope_feature: Option<String>,
    /// Class feature
    #[serde(alias = "职业特性", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub class_feature: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ancestry card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AncestryCard {
    /// Identifier
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(alias = "名称", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lineage the card belongs to
    #[serde(alias = "种族", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
    /// Which of the lineage's two cards this is (1 or 2)
    #[serde(alias = "类别", deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub category: Option<u32>,
    /// Flavour text
    #[serde(alias = "简介", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rules text
    #[serde(alias = "效果", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Community card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommunityCard {
    /// Identifier
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(alias = "名称", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Community trait
    #[serde(rename = "trait", alias = "特性", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub community_trait: Option<String>,
    /// Flavour text
    #[serde(alias = "简介", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Subclass card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubclassCard {
    /// Identifier
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(alias = "名称", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Profession this subclass belongs to
    #[serde(alias = "主职", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    /// Subclass family name
    #[serde(alias = "子职业", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub subclass: Option<String>,
    /// Level tier (foundation / specialization / mastery)
    #[serde(alias = "等级", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Spellcasting trait
    #[serde(alias = "施法", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub spellcasting_trait: Option<String>,
    /// Rules text
    #[serde(alias = "描述", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Domain card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainCard {
    /// Identifier
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(alias = "名称", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Domain the card belongs to
    #[serde(alias = "领域", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Card level
    #[serde(alias = "等级", deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Recall cost
    #[serde(alias = "回想", deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub recall: Option<u32>,
    /// Card attribute (ability / spell / grimoire)
    #[serde(alias = "属性", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Rules text
    #[serde(alias = "描述", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Variant card, the catch-all kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariantCard {
    /// Identifier
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(alias = "名称", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variant type (references a custom field definition)
    #[serde(alias = "类型", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub variant_type: Option<String>,
    /// Sub-category within the variant type
    #[serde(alias = "子类别", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Level
    #[serde(alias = "等级", deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Rules text
    #[serde(alias = "效果", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// Flavour text
    #[serde(alias = "简介", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

macro_rules! impl_card_record {
    ($ty:ty, $kind:expr) => {
        impl CardRecord for $ty {
            const KIND: CardKind = $kind;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: String) {
                self.id = Some(id);
            }

            fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }

            fn extra(&self) -> &Map<String, Value> {
                &self.extra
            }

            fn extra_mut(&mut self) -> &mut Map<String, Value> {
                &mut self.extra
            }
        }
    };
}

impl_card_record!(ProfessionCard, CardKind::Profession);
impl_card_record!(AncestryCard, CardKind::Ancestry);
impl_card_record!(CommunityCard, CardKind::Community);
impl_card_record!(SubclassCard, CardKind::Subclass);
impl_card_record!(DomainCard, CardKind::Domain);
impl_card_record!(VariantCard, CardKind::Variant);

/// Localized field names per kind, as `(localized, canonical)` pairs
fn field_aliases(kind: CardKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        CardKind::Profession => &[
            ("名称", "name"),
            ("简介", "description"),
            ("领域1", "domain1"),
            ("领域2", "domain2"),
            ("起始生命", "startingHitPoints"),
            ("起始闪避", "startingEvasion"),
            ("起始物品", "startingItems"),
            ("希望特性", "hopeFeature"),
            ("职业特性", "classFeature"),
        ],
        CardKind::Ancestry => &[
            ("名称", "name"),
            ("种族", "lineage"),
            ("类别", "category"),
            ("简介", "description"),
            ("效果", "effect"),
        ],
        CardKind::Community => &[("名称", "name"), ("特性", "trait"), ("简介", "description")],
        CardKind::Subclass => &[
            ("名称", "name"),
            ("主职", "mainClass"),
            ("子职业", "subclass"),
            ("等级", "level"),
            ("施法", "spellcastingTrait"),
            ("描述", "description"),
        ],
        CardKind::Domain => &[
            ("名称", "name"),
            ("领域", "domain"),
            ("等级", "level"),
            ("回想", "recall"),
            ("属性", "attribute"),
            ("描述", "description"),
        ],
        CardKind::Variant => &[
            ("名称", "name"),
            ("类型", "variantType"),
            ("子类别", "subcategory"),
            ("等级", "level"),
            ("效果", "effect"),
            ("简介", "description"),
        ],
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Fold localized keys into their canonical names.
///
/// A record may carry both spellings of one field; the canonical value wins
/// unless it is blank.
fn fold_aliases(kind: CardKind, record: &mut Map<String, Value>) {
    for (localized, canonical) in field_aliases(kind) {
        let Some(value) = record.remove(*localized) else {
            continue;
        };
        if record.get(*canonical).is_none_or(is_blank) {
            record.insert((*canonical).to_string(), value);
        }
    }
}

/// A classified card of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    /// Profession card
    Profession(ProfessionCard),
    /// Ancestry card
    Ancestry(AncestryCard),
    /// Community card
    Community(CommunityCard),
    /// Subclass card
    Subclass(SubclassCard),
    /// Domain card
    Domain(DomainCard),
    /// Variant card
    Variant(VariantCard),
}

impl Card {
    /// Convert a raw key/value record into the typed record of `kind`.
    ///
    /// Localized field names are accepted; when a record carries both the
    /// localized and the English name of a field, the non-blank English
    /// value is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use packsmith_domain::{Card, CardKind};
    /// use serde_json::json;
    ///
    /// let raw = json!({"名称": "Fireball", "领域": "Arcana", "等级": "1", "回想": 2});
    /// let card = Card::from_record(CardKind::Domain, raw.as_object().unwrap().clone()).unwrap();
    /// match card {
    ///     Card::Domain(c) => {
    ///         assert_eq!(c.name.as_deref(), Some("Fireball"));
    ///         assert_eq!(c.level, Some(1));
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn from_record(kind: CardKind, mut record: Map<String, Value>) -> Result<Self, serde_json::Error> {
        fold_aliases(kind, &mut record);
        let value = Value::Object(record);
        Ok(match kind {
            CardKind::Profession => Card::Profession(serde_json::from_value(value)?),
            CardKind::Ancestry => Card::Ancestry(serde_json::from_value(value)?),
            CardKind::Community => Card::Community(serde_json::from_value(value)?),
            CardKind::Subclass => Card::Subclass(serde_json::from_value(value)?),
            CardKind::Domain => Card::Domain(serde_json::from_value(value)?),
            CardKind::Variant => Card::Variant(serde_json::from_value(value)?),
        })
    }

    /// Kind of this card
    pub fn kind(&self) -> CardKind {
        match self {
            Card::Profession(_) => CardKind::Profession,
            Card::Ancestry(_) => CardKind::Ancestry,
            Card::Community(_) => CardKind::Community,
            Card::Subclass(_) => CardKind::Subclass,
            Card::Domain(_) => CardKind::Domain,
            Card::Variant(_) => CardKind::Variant,
        }
    }

    /// Identifier of this card, if any
    pub fn id(&self) -> Option<&str> {
        match self {
            Card::Profession(c) => c.id(),
            Card::Ancestry(c) => c.id(),
            Card::Community(c) => c.id(),
            Card::Subclass(c) => c.id(),
            Card::Domain(c) => c.id(),
            Card::Variant(c) => c.id(),
        }
    }

    /// Display name of this card, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            Card::Profession(c) => c.name(),
            Card::Ancestry(c) => c.name(),
            Card::Community(c) => c.name(),
            Card::Subclass(c) => c.name(),
            Card::Domain(c) => c.name(),
            Card::Variant(c) => c.name(),
        }
    }
}

/// Generate a temporary identifier for a card that arrived without one.
///
/// The id is `"{kind}-{name-slug}-{suffix}"` where the suffix is eight random
/// hex digits, so two calls never collide but repeated imports of the same
/// unlabeled card also never match each other.
pub fn temporary_id(kind: CardKind, name: Option<&str>) -> String {
    let slug = name.map(slugify).filter(|s| !s.is_empty());
    let suffix = uuid::Uuid::now_v7().simple().to_string();
    format!(
        "{}-{}-{}",
        kind,
        slug.as_deref().unwrap_or("unnamed"),
        &suffix[suffix.len() - 8..]
    )
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
