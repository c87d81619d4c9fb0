//! The owner aggregate: one gameplay participant's tags, attributes, active
//! effects, abilities and deferred timers.
//!
//! Every mutation goes through [`OwnerState`] so that tag grants, attribute
//! writes and effect lifecycles stay consistent and observable through the
//! event queue. Ordering within [`OwnerState::step`] is fixed:
//!
//! 1. active effects (duration, periodic execution, expiry removal)
//! 2. deferred timers (cooldown tag removal)
//! 3. active abilities (behavior tick, timed end)

mod abilities;
mod effects;
pub mod timers;

use std::sync::Arc;

use crate::abilities::{AbilityInstance, AbilitySummary};
use crate::attributes::{AttributeDef, AttributeProfile, AttributeStore};
use crate::config::EngineConfig;
use crate::effects::{ActiveEffect, EffectSummary};
use crate::events::GameplayEvent;
use crate::tags::{TagId, TagRegistry, TagSet};

pub use timers::{DeferredAction, DeferredTimers, TimerId};

/// Host-assigned identity of a gameplay participant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct OwnerState {
    id: EntityId,
    config: EngineConfig,
    tags: TagSet,
    attributes: AttributeStore,
    effects: Vec<ActiveEffect>,
    abilities: Vec<AbilityInstance>,
    timers: DeferredTimers,
    events: Vec<GameplayEvent>,
    next_effect_id: u64,
}

impl OwnerState {
    pub fn new(id: EntityId) -> Self {
        Self::with_config(id, EngineConfig::default())
    }

    pub fn with_config(id: EntityId, config: EngineConfig) -> Self {
        Self {
            id,
            config,
            tags: TagSet::new(),
            attributes: AttributeStore::with_config(config),
            effects: Vec::new(),
            abilities: Vec::new(),
            timers: DeferredTimers::new(),
            events: Vec::new(),
            next_effect_id: 0,
        }
    }

    /// Creates an owner seeded from a profile.
    pub fn from_profile(id: EntityId, profile: &AttributeProfile, config: EngineConfig) -> Self {
        let mut owner = Self::with_config(id, config);
        profile.seed(&mut owner.attributes);
        // Seeding is setup, not gameplay.
        owner.attributes.take_changes();
        owner
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Adds a loose tag. Returns `true` if it was not already present.
    pub fn add_tag(&mut self, tag: TagId) -> bool {
        let added = self.tags.add(tag);
        if added {
            self.events.push(GameplayEvent::TagAdded {
                entity: self.id,
                tag,
            });
        }
        added
    }

    /// Removes a tag. Returns `true` if it was present.
    pub fn remove_tag(&mut self, tag: TagId) -> bool {
        let removed = self.tags.remove(tag);
        if removed {
            self.events.push(GameplayEvent::TagRemoved {
                entity: self.id,
                tag,
            });
        }
        removed
    }

    /// Whether `tag` is still held up by a remaining effect's grant or by the
    /// active tags of an active ability other than `ending`.
    fn tag_still_granted(&self, tag: TagId, ending: Option<usize>) -> bool {
        self.effects
            .iter()
            .any(|effect| effect.definition().grant_tags.contains(&tag))
            || self.abilities.iter().enumerate().any(|(idx, ability)| {
                Some(idx) != ending
                    && ability.is_active()
                    && ability.definition().active_tags.contains(&tag)
            })
    }

    /// Removes `tag` unless another grant still holds it.
    fn release_tag(&mut self, tag: TagId, ending: Option<usize>) -> bool {
        !self.tag_still_granted(tag, ending) && self.remove_tag(tag)
    }

    pub fn has_tag(&self, tag: TagId, registry: &TagRegistry) -> bool {
        self.tags.has(tag, registry)
    }

    pub fn has_tag_exact(&self, tag: TagId) -> bool {
        self.tags.has_exact(tag)
    }

    /// Paths of the owner's tags, sorted, for display.
    pub fn tag_paths<'r>(&self, registry: &'r TagRegistry) -> Vec<&'r str> {
        let mut paths: Vec<&str> = self
            .tags
            .iter()
            .filter_map(|id| registry.path_of(id))
            .collect();
        paths.sort_unstable();
        paths
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Direct store access. Changes are surfaced as events on the next owner call
    /// or [`drain_events`](Self::drain_events).
    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    /// Stored current value with every active effect folded over it in
    /// application order. Not clamped. Periodic effects are skipped when
    /// [`EngineConfig::fold_periodic_modifiers`] is off.
    pub fn final_value(&self, attribute: &AttributeDef) -> f32 {
        let fold_periodic = self.config.fold_periodic_modifiers;
        self.effects
            .iter()
            .filter(|effect| {
                !effect.is_expired() && (fold_periodic || !effect.definition().is_periodic())
            })
            .fold(self.attributes.get(attribute), |running, effect| {
                effect.modified_value(attribute, running)
            })
    }

    /// [`final_value`](Self::final_value) by id or display name; `0.0` when the
    /// attribute is unknown to this owner.
    pub fn final_value_named(&self, name: &str) -> f32 {
        match self.attributes.find(name) {
            Some(def) => self.final_value(def),
            None => 0.0,
        }
    }

    // ========================================================================
    // Step and events
    // ========================================================================

    /// Advances the owner by `dt` seconds.
    pub fn step(&mut self, dt: f32, registry: &TagRegistry) {
        self.tick_effects(dt);
        self.tick_timers(dt);
        self.tick_abilities(dt, registry);
        self.flush_attribute_changes();
    }

    fn tick_timers(&mut self, dt: f32) {
        for action in self.timers.advance(dt) {
            match action {
                DeferredAction::RemoveTag(tag) => {
                    self.remove_tag(tag);
                }
            }
        }
    }

    /// Moves pending store notifications into the event queue.
    fn flush_attribute_changes(&mut self) {
        for change in self.attributes.take_changes() {
            self.events.push(GameplayEvent::AttributeChanged {
                entity: self.id,
                change,
            });
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameplayEvent> {
        self.flush_attribute_changes();
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn effect_summaries(&self) -> Vec<EffectSummary> {
        self.effects.iter().map(ActiveEffect::summary).collect()
    }

    pub fn abilities(&self) -> &[AbilityInstance] {
        &self.abilities
    }

    pub fn ability_summaries(&self) -> Vec<AbilitySummary> {
        self.abilities
            .iter()
            .map(|ability| {
                let cooldown = ability
                    .cooldown_timer()
                    .and_then(|timer| self.timers.remaining(timer));
                ability.summary(cooldown)
            })
            .collect()
    }

    pub(crate) fn next_effect_id(&mut self) -> crate::effects::ActiveEffectId {
        let id = crate::effects::ActiveEffectId(self.next_effect_id);
        self.next_effect_id += 1;
        id
    }

    /// Looks up a stored attribute definition for cost checks and similar.
    pub fn attribute(&self, name: &str) -> Option<&Arc<AttributeDef>> {
        self.attributes.find(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectDef, EffectDuration, Modifier};

    #[test]
    fn loose_tags_emit_events_only_on_change() {
        let registry = TagRegistry::from_paths(["State.Stunned"]).unwrap();
        let stunned = registry.id_of("State.Stunned").unwrap();
        let state = registry.id_of("State").unwrap();
        let mut owner = OwnerState::new(EntityId(1));

        assert!(owner.add_tag(stunned));
        assert!(!owner.add_tag(stunned));
        assert!(owner.has_tag(state, &registry));
        assert!(!owner.has_tag_exact(state));
        assert_eq!(owner.tag_paths(&registry), vec!["State.Stunned"]);

        assert!(owner.remove_tag(stunned));
        assert!(!owner.remove_tag(stunned));

        let events = owner.drain_events();
        assert_eq!(
            events,
            vec![
                GameplayEvent::TagAdded {
                    entity: EntityId(1),
                    tag: stunned
                },
                GameplayEvent::TagRemoved {
                    entity: EntityId(1),
                    tag: stunned
                },
            ]
        );
        assert!(owner.drain_events().is_empty());
    }

    #[test]
    fn profile_seeding_is_silent() {
        let health = AttributeDef::new("Health").with_default(10.0).build();
        let profile = AttributeProfile::new("Grunt").with_value(Arc::clone(&health), 40.0);
        let mut owner = OwnerState::from_profile(EntityId(2), &profile, EngineConfig::default());

        assert_eq!(owner.final_value(&health), 40.0);
        assert_eq!(owner.final_value_named("health"), 40.0);
        assert_eq!(owner.final_value_named("Mana"), 0.0);
        assert!(owner.drain_events().is_empty());
    }

    fn mana_well(config: EngineConfig) -> (OwnerState, Arc<AttributeDef>) {
        let registry = TagRegistry::new();
        let mana = AttributeDef::new("Mana").with_default(5.0).build();
        let well = EffectDef::new("ManaWell", EffectDuration::Infinite)
            .with_modifier(Modifier::add(Arc::clone(&mana), 3.0))
            .periodic(10.0)
            .build();
        let mut owner = OwnerState::with_config(EntityId(3), config);
        owner.apply_effect(&well, EntityId(3), &registry);
        (owner, mana)
    }

    #[test]
    fn periodic_modifiers_fold_into_final_value() {
        let (owner, mana) = mana_well(EngineConfig::default());

        assert_eq!(owner.attributes().get(&mana), 5.0);
        assert_eq!(owner.final_value(&mana), 8.0);
    }

    #[test]
    fn periodic_modifiers_can_be_left_out_of_final_value() {
        let config = EngineConfig {
            fold_periodic_modifiers: false,
            ..EngineConfig::default()
        };
        let (mut owner, mana) = mana_well(config);

        assert_eq!(owner.final_value(&mana), 5.0);
        owner.step(10.0, &TagRegistry::new());
        assert_eq!(owner.attributes().get(&mana), 8.0);
        assert_eq!(owner.final_value(&mana), 8.0);
    }
}
