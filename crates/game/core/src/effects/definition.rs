//! Effect definitions: static, shareable descriptions of attribute/tag changes.

use std::sync::Arc;

use crate::attributes::AttributeDef;
use crate::config::EngineConfig;
use crate::tags::{TagId, TagQuery};

/// How a modifier combines with the running attribute value.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierOp {
    /// Summed, scaled by stack count.
    Add,
    /// Multiplied; each stack contributes `(value - 1)`.
    Multiply,
    /// Replaces the running value; first override wins.
    Override,
}

/// A single attribute modification carried by an effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Modifier {
    pub attribute: Arc<AttributeDef>,
    pub op: ModifierOp,
    pub value: f32,
}

impl Modifier {
    pub fn new(attribute: Arc<AttributeDef>, op: ModifierOp, value: f32) -> Self {
        Self {
            attribute,
            op,
            value,
        }
    }

    pub fn add(attribute: Arc<AttributeDef>, value: f32) -> Self {
        Self::new(attribute, ModifierOp::Add, value)
    }

    pub fn multiply(attribute: Arc<AttributeDef>, value: f32) -> Self {
        Self::new(attribute, ModifierOp::Multiply, value)
    }

    pub fn override_with(attribute: Arc<AttributeDef>, value: f32) -> Self {
        Self::new(attribute, ModifierOp::Override, value)
    }
}

/// Lifetime class of an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Applied once to stored values and discarded.
    Instant,
    /// Retained until explicitly removed or force-expired.
    Infinite,
    /// Retained for the given number of seconds.
    Timed(f32),
}

impl EffectDuration {
    /// Content convention: `0` = instant, negative = infinite, positive = timed.
    pub fn from_seconds(seconds: f32) -> Self {
        if seconds == 0.0 {
            Self::Instant
        } else if seconds < 0.0 {
            Self::Infinite
        } else {
            Self::Timed(seconds)
        }
    }

    pub fn as_seconds(&self) -> f32 {
        match self {
            Self::Instant => 0.0,
            Self::Infinite => -1.0,
            Self::Timed(seconds) => *seconds,
        }
    }

    pub fn is_instant(&self) -> bool {
        matches!(self, Self::Instant)
    }
}

/// Static description of an effect.
///
/// Definitions are shared via `Arc` and never mutated once built; every
/// application creates (or refreshes) an [`ActiveEffect`](super::ActiveEffect)
/// on the target.
#[derive(Clone, Debug)]
pub struct EffectDef {
    pub name: String,
    pub duration: EffectDuration,
    pub modifiers: Vec<Modifier>,
    /// Granted on application, revoked on removal.
    pub grant_tags: Vec<TagId>,
    /// Removed from the target on application.
    pub remove_tags: Vec<TagId>,
    /// Target must match for the effect to apply.
    pub require_tags: TagQuery,
    /// Target must not match (an empty query never blocks).
    pub block_tags: TagQuery,
    pub can_stack: bool,
    pub max_stacks: u32,
    /// Seconds between periodic executions; `None` for non-periodic effects.
    pub period: Option<f32>,
}

impl EffectDef {
    pub fn new(name: impl Into<String>, duration: EffectDuration) -> Self {
        Self {
            name: name.into(),
            duration,
            modifiers: Vec::new(),
            grant_tags: Vec::new(),
            remove_tags: Vec::new(),
            require_tags: TagQuery::empty(),
            block_tags: TagQuery::empty(),
            can_stack: false,
            max_stacks: EngineConfig::DEFAULT_MAX_STACKS,
            period: None,
        }
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn granting(mut self, tag: TagId) -> Self {
        self.grant_tags.push(tag);
        self
    }

    #[must_use]
    pub fn removing(mut self, tag: TagId) -> Self {
        self.remove_tags.push(tag);
        self
    }

    #[must_use]
    pub fn requiring(mut self, query: TagQuery) -> Self {
        self.require_tags = query;
        self
    }

    #[must_use]
    pub fn blocked_by(mut self, query: TagQuery) -> Self {
        self.block_tags = query;
        self
    }

    #[must_use]
    pub fn stacking(mut self, max_stacks: u32) -> Self {
        self.can_stack = true;
        self.max_stacks = max_stacks.max(1);
        self
    }

    /// Makes the effect periodic. Non-positive periods leave it non-periodic.
    #[must_use]
    pub fn periodic(mut self, period: f32) -> Self {
        self.period = (period > 0.0).then_some(period);
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn is_periodic(&self) -> bool {
        self.period.is_some()
    }

    /// Stack cap after applying the engine-wide ceiling.
    pub fn stack_limit(&self, config: &EngineConfig) -> u32 {
        if self.can_stack {
            self.max_stacks.clamp(1, config.stack_ceiling.max(1))
        } else {
            1
        }
    }

    /// Modifiers that target `attribute`, in declaration order.
    pub fn modifiers_for<'a>(
        &'a self,
        attribute: &'a AttributeDef,
    ) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.modifiers
            .iter()
            .filter(move |m| *m.attribute == *attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn duration_sign_convention() {
        assert_eq!(EffectDuration::from_seconds(0.0), EffectDuration::Instant);
        assert_eq!(EffectDuration::from_seconds(-1.0), EffectDuration::Infinite);
        assert_eq!(EffectDuration::from_seconds(2.5), EffectDuration::Timed(2.5));
        assert_eq!(EffectDuration::Timed(2.5).as_seconds(), 2.5);
    }

    #[test]
    fn modifier_op_parses_case_insensitively() {
        assert_eq!(ModifierOp::from_str("MULTIPLY").unwrap(), ModifierOp::Multiply);
        assert_eq!(ModifierOp::Override.as_ref(), "override");
    }

    #[test]
    fn stack_limit_respects_ceiling() {
        let config = EngineConfig {
            stack_ceiling: 5,
            ..EngineConfig::default()
        };
        let capped = EffectDef::new("Bleed", EffectDuration::Timed(4.0)).stacking(20);
        let single = EffectDef::new("Haste", EffectDuration::Timed(4.0));

        assert_eq!(capped.stack_limit(&config), 5);
        assert_eq!(single.stack_limit(&config), 1);
    }

    #[test]
    fn non_positive_period_is_not_periodic() {
        let def = EffectDef::new("Regen", EffectDuration::Infinite).periodic(0.0);
        assert!(!def.is_periodic());
        assert!(EffectDef::new("Regen", EffectDuration::Infinite)
            .periodic(1.0)
            .is_periodic());
    }
}
