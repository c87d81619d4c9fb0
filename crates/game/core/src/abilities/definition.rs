//! Ability definitions.

use std::fmt;
use std::sync::Arc;

use super::behavior::AbilityKind;
use crate::attributes::AttributeDef;
use crate::effects::EffectDef;
use crate::tags::{TagId, TagQuery};

/// Attribute spent on activation.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilityCost {
    pub attribute: Arc<AttributeDef>,
    pub amount: f32,
}

/// Cooldown enforced through a tag that is removed after `seconds`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityCooldown {
    pub seconds: f32,
    pub tag: TagId,
}

/// Identity of an ability within one owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKey {
    Tag(TagId),
    Name(String),
}

impl fmt::Display for AbilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(id) => write!(f, "tag#{}", id.0),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<TagId> for AbilityKey {
    fn from(id: TagId) -> Self {
        Self::Tag(id)
    }
}

impl From<&str> for AbilityKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Static description of an ability.
#[derive(Clone, Debug)]
pub struct AbilityDef {
    pub name: String,
    /// Identity tag; abilities without one are keyed by name.
    pub ability_tag: Option<TagId>,
    pub cost: Option<AbilityCost>,
    pub cooldown: Option<AbilityCooldown>,
    pub require_tags: TagQuery,
    /// Activation fails when this matches (an empty query never blocks).
    pub blocked_by_tags: TagQuery,
    /// Granted while the ability is active.
    pub active_tags: Vec<TagId>,
    /// Applied to the owner on activation.
    pub on_activate_effects: Vec<Arc<EffectDef>>,
    /// Applied to the owner when the ability ends (cancelled or not).
    pub on_end_effects: Vec<Arc<EffectDef>>,
    pub kind: AbilityKind,
}

impl AbilityDef {
    pub fn new(name: impl Into<String>, kind: AbilityKind) -> Self {
        Self {
            name: name.into(),
            ability_tag: None,
            cost: None,
            cooldown: None,
            require_tags: TagQuery::empty(),
            blocked_by_tags: TagQuery::empty(),
            active_tags: Vec::new(),
            on_activate_effects: Vec::new(),
            on_end_effects: Vec::new(),
            kind,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: TagId) -> Self {
        self.ability_tag = Some(tag);
        self
    }

    #[must_use]
    pub fn with_cost(mut self, attribute: Arc<AttributeDef>, amount: f32) -> Self {
        self.cost = Some(AbilityCost { attribute, amount });
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, seconds: f32, tag: TagId) -> Self {
        self.cooldown = Some(AbilityCooldown { seconds, tag });
        self
    }

    #[must_use]
    pub fn requiring(mut self, query: TagQuery) -> Self {
        self.require_tags = query;
        self
    }

    #[must_use]
    pub fn blocked_by(mut self, query: TagQuery) -> Self {
        self.blocked_by_tags = query;
        self
    }

    #[must_use]
    pub fn granting_while_active(mut self, tag: TagId) -> Self {
        self.active_tags.push(tag);
        self
    }

    #[must_use]
    pub fn on_activate(mut self, effect: Arc<EffectDef>) -> Self {
        self.on_activate_effects.push(effect);
        self
    }

    #[must_use]
    pub fn on_end(mut self, effect: Arc<EffectDef>) -> Self {
        self.on_end_effects.push(effect);
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn key(&self) -> AbilityKey {
        match self.ability_tag {
            Some(tag) => AbilityKey::Tag(tag),
            None => AbilityKey::Name(self.name.clone()),
        }
    }

    /// Whether `key` identifies this ability, by tag or by name.
    pub fn matches(&self, key: &AbilityKey) -> bool {
        match key {
            AbilityKey::Tag(tag) => self.ability_tag == Some(*tag),
            AbilityKey::Name(name) => self.name == *name,
        }
    }
}
