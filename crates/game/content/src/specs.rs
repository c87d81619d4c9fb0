//! Author-time content specs.
//!
//! Specs reference each other by name (attribute ids, tag paths, effect and
//! profile names). [`ContentDatabase`](crate::ContentDatabase) validates and
//! resolves them into shared core definitions.

use gameplay_core::{AbilityKind, ModifierOp, TagQueryExpr};
use serde::{Deserialize, Serialize};

/// Every tag path the content uses. Ancestors are implied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagCatalog {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub default_value: f32,
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
    /// Id of another attribute whose live value caps this one.
    #[serde(default)]
    pub max_attribute: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeCatalog {
    pub attributes: Vec<AttributeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// `(attribute id, base value)` in seeding order.
    #[serde(default)]
    pub values: Vec<(String, f32)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileCatalog {
    pub profiles: Vec<ProfileSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub attribute: String,
    pub op: ModifierOp,
    pub value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSpec {
    pub name: String,
    /// Seconds; `0` = instant, negative = infinite.
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub modifiers: Vec<ModifierSpec>,
    #[serde(default)]
    pub grant_tags: Vec<String>,
    #[serde(default)]
    pub remove_tags: Vec<String>,
    #[serde(default)]
    pub require_tags: Option<TagQueryExpr>,
    #[serde(default)]
    pub block_tags: Option<TagQueryExpr>,
    /// Presence enables stacking.
    #[serde(default)]
    pub max_stacks: Option<u32>,
    #[serde(default)]
    pub period: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectCatalog {
    pub effects: Vec<EffectSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSpec {
    pub attribute: String,
    pub amount: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownSpec {
    pub seconds: f32,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySpec {
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub kind: Option<AbilityKind>,
    #[serde(default)]
    pub cost: Option<CostSpec>,
    #[serde(default)]
    pub cooldown: Option<CooldownSpec>,
    #[serde(default)]
    pub require_tags: Option<TagQueryExpr>,
    #[serde(default)]
    pub blocked_by_tags: Option<TagQueryExpr>,
    #[serde(default)]
    pub active_tags: Vec<String>,
    /// Effect names applied to the owner on activation.
    #[serde(default)]
    pub on_activate: Vec<String>,
    /// Effect names applied to the owner when the ability ends.
    #[serde(default)]
    pub on_end: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityCatalog {
    pub abilities: Vec<AbilitySpec>,
}

/// Everything needed to build a [`ContentDatabase`](crate::ContentDatabase).
#[derive(Debug, Clone, Default)]
pub struct ContentSpecs {
    pub tags: TagCatalog,
    pub attributes: AttributeCatalog,
    pub profiles: ProfileCatalog,
    pub effects: EffectCatalog,
    pub abilities: AbilityCatalog,
}
