//! Multi-owner simulation.
//!
//! [`Simulation`] owns every [`OwnerState`], resolves content names, routes
//! cross-entity effect application and steps all owners in entity order. After
//! every mutating call, owner events are drained, movement requests are handed
//! to the [`MovementHost`], and every event is published on the [`EventBus`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use gameplay_content::ContentDatabase;
use gameplay_core::{
    AbilityKey, AbilitySummary, AppliedEffect, EffectSummary, EntityId, GameplayEvent, GrantError,
    OwnerState, TagRegistry,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::behaviors::BehaviorRegistry;
use crate::config::SimulationConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, EventListener, Topic};
use crate::movement::MovementHost;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSnapshot {
    pub id: String,
    pub base: f32,
    pub current: f32,
    /// Current value with active effect modifiers folded in.
    pub final_value: f32,
}

/// Presentation view of one owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSnapshot {
    pub entity: EntityId,
    pub tags: Vec<String>,
    pub attributes: Vec<AttributeSnapshot>,
    pub effects: Vec<EffectSummary>,
    pub abilities: Vec<AbilitySummary>,
}

/// Builder for [`Simulation`].
pub struct SimulationBuilder {
    content: Arc<ContentDatabase>,
    config: SimulationConfig,
    behaviors: BehaviorRegistry,
    movement: Option<Box<dyn MovementHost>>,
}

impl SimulationBuilder {
    pub fn new(content: Arc<ContentDatabase>) -> Self {
        Self {
            content,
            config: SimulationConfig::default(),
            behaviors: BehaviorRegistry::default_behaviors(),
            movement: None,
        }
    }

    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn behaviors(mut self, behaviors: BehaviorRegistry) -> Self {
        self.behaviors = behaviors;
        self
    }

    pub fn movement_host(mut self, host: impl MovementHost + 'static) -> Self {
        self.movement = Some(Box::new(host));
        self
    }

    pub fn build(self) -> Simulation {
        for (ability, behavior) in self.content.custom_behaviors() {
            if !self.behaviors.contains(behavior) {
                warn!(
                    target: "runtime::simulation",
                    ability,
                    behavior,
                    "custom behavior not registered; granting this ability will fail"
                );
            }
        }

        Simulation {
            config: self.config,
            content: self.content,
            behaviors: self.behaviors,
            owners: BTreeMap::new(),
            next_entity: 1,
            elapsed: 0.0,
            bus: EventBus::new(),
            movement: self.movement,
            log: VecDeque::new(),
        }
    }
}

pub struct Simulation {
    config: SimulationConfig,
    content: Arc<ContentDatabase>,
    behaviors: BehaviorRegistry,
    owners: BTreeMap<EntityId, OwnerState>,
    next_entity: u32,
    elapsed: f32,
    bus: EventBus,
    movement: Option<Box<dyn MovementHost>>,
    log: VecDeque<GameplayEvent>,
}

impl Simulation {
    pub fn builder(content: Arc<ContentDatabase>) -> SimulationBuilder {
        SimulationBuilder::new(content)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentDatabase {
        &self.content
    }

    pub fn registry(&self) -> &TagRegistry {
        self.content.registry()
    }

    pub fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    /// Simulated seconds since construction.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Spawns an owner seeded from a content profile.
    pub fn spawn(&mut self, profile: &str) -> Result<EntityId> {
        let content = Arc::clone(&self.content);
        let profile = content
            .profile(profile)
            .ok_or_else(|| RuntimeError::UnknownProfile(profile.to_string()))?;
        let entity = self.allocate_entity();
        let owner = OwnerState::from_profile(entity, profile, self.config.engine);
        self.owners.insert(entity, owner);
        debug!(
            target: "runtime::simulation",
            %entity,
            profile = profile.name(),
            "owner spawned"
        );
        Ok(entity)
    }

    /// Spawns an owner with no attributes set.
    pub fn spawn_bare(&mut self) -> EntityId {
        let entity = self.allocate_entity();
        self.owners
            .insert(entity, OwnerState::with_config(entity, self.config.engine));
        entity
    }

    /// Removes an owner and returns its final state. Pending events are flushed first.
    pub fn despawn(&mut self, entity: EntityId) -> Result<OwnerState> {
        self.flush();
        self.owners
            .remove(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    fn allocate_entity(&mut self) -> EntityId {
        let entity = EntityId(self.next_entity);
        self.next_entity += 1;
        entity
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.owners.keys().copied()
    }

    pub fn owner(&self, entity: EntityId) -> Result<&OwnerState> {
        self.owners
            .get(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    /// Direct owner access. Events it produces are published on the next
    /// simulation call.
    pub fn owner_mut(&mut self, entity: EntityId) -> Result<&mut OwnerState> {
        self.owners
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub fn add_tag(&mut self, entity: EntityId, path: &str) -> Result<bool> {
        let tag = self.tag(path)?;
        let added = self.owner_mut(entity)?.add_tag(tag);
        self.flush();
        Ok(added)
    }

    pub fn remove_tag(&mut self, entity: EntityId, path: &str) -> Result<bool> {
        let tag = self.tag(path)?;
        let removed = self.owner_mut(entity)?.remove_tag(tag);
        self.flush();
        Ok(removed)
    }

    /// Hierarchical tag check by path.
    pub fn has_tag(&self, entity: EntityId, path: &str) -> Result<bool> {
        let tag = self.tag(path)?;
        Ok(self.owner(entity)?.has_tag(tag, self.registry()))
    }

    fn tag(&self, path: &str) -> Result<gameplay_core::TagId> {
        self.content
            .tag(path)
            .ok_or_else(|| RuntimeError::UnknownTag(path.to_string()))
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Applies a named effect from `source` to `target`.
    ///
    /// `source` is recorded on the active effect and need not be a live owner.
    /// `Ok(None)` means the target's tags rejected the effect.
    pub fn apply_effect(
        &mut self,
        source: EntityId,
        target: EntityId,
        effect: &str,
    ) -> Result<Option<AppliedEffect>> {
        let def = self
            .content
            .effect(effect)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownEffect(effect.to_string()))?;
        let owner = self
            .owners
            .get_mut(&target)
            .ok_or(RuntimeError::UnknownEntity(target))?;
        let outcome = owner.apply_effect(&def, source, self.content.registry());
        self.flush();
        Ok(outcome)
    }

    pub fn remove_effects_named(&mut self, entity: EntityId, effect: &str) -> Result<usize> {
        let removed = self.owner_mut(entity)?.remove_effects_named(effect);
        self.flush();
        Ok(removed)
    }

    /// Final value of an attribute (by id or display name) on `entity`.
    pub fn final_value(&self, entity: EntityId, attribute: &str) -> Result<f32> {
        let def = self
            .content
            .attribute(attribute)
            .ok_or_else(|| RuntimeError::UnknownAttribute(attribute.to_string()))?;
        Ok(self.owner(entity)?.final_value(def))
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    /// Grants a named ability, resolving `Custom` kinds through the behavior registry.
    pub fn grant_ability(&mut self, entity: EntityId, ability: &str) -> Result<()> {
        let def = self.ability_def(ability)?;
        let behavior =
            self.behaviors
                .instantiate(&def)
                .ok_or_else(|| GrantError::MissingBehavior {
                    ability: def.name.clone(),
                    behavior: def.kind.custom_name().unwrap_or_default().to_string(),
                })?;
        self.owner_mut(entity)?.grant_ability_with(def, behavior);
        Ok(())
    }

    pub fn revoke_ability(&mut self, entity: EntityId, ability: &str) -> Result<bool> {
        let key = self.ability_key(ability)?;
        let owner = self
            .owners
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))?;
        let revoked = owner.revoke_ability(&key, self.content.registry());
        self.flush();
        Ok(revoked)
    }

    /// Attempts to activate a named ability.
    ///
    /// Policy failures (cooldown, cost, tags) come back as
    /// [`RuntimeError::Activation`] and leave the owner untouched.
    pub fn activate(&mut self, entity: EntityId, ability: &str) -> Result<()> {
        let key = self.ability_key(ability)?;
        let owner = self
            .owners
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))?;
        let result = owner.try_activate(&key, self.content.registry());
        self.flush();
        result.map_err(RuntimeError::from)
    }

    pub fn cancel(&mut self, entity: EntityId, ability: &str) -> Result<()> {
        let key = self.ability_key(ability)?;
        let owner = self
            .owners
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))?;
        let result = owner.cancel_ability(&key, self.content.registry());
        self.flush();
        result.map_err(RuntimeError::from)
    }

    fn ability_def(&self, ability: &str) -> Result<Arc<gameplay_core::AbilityDef>> {
        self.content
            .ability(ability)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownAbility(ability.to_string()))
    }

    fn ability_key(&self, ability: &str) -> Result<AbilityKey> {
        Ok(self.ability_def(ability)?.key())
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advances every owner by `dt` seconds (clamped to `max_step`), in entity order.
    pub fn step(&mut self, dt: f32) {
        let dt = self.config.clamp_step(dt);
        let registry = self.content.registry();
        for owner in self.owners.values_mut() {
            owner.step(dt, registry);
        }
        self.elapsed += dt;
        trace!(
            target: "runtime::simulation",
            dt,
            elapsed = self.elapsed,
            owners = self.owners.len(),
            "step"
        );
        self.flush();
    }

    /// Steps repeatedly until `seconds` have elapsed, in increments of at most `max_step`.
    pub fn advance(&mut self, seconds: f32) {
        let step = self.config.max_step;
        if step <= 0.0 {
            return;
        }
        let mut remaining = seconds;
        while remaining > 0.0 {
            let dt = remaining.min(step);
            self.step(dt);
            remaining -= dt;
        }
    }

    // ========================================================================
    // Events & presentation
    // ========================================================================

    pub fn subscribe(&mut self, topic: Topic, listener: impl EventListener + 'static) {
        self.bus.subscribe(topic, listener);
    }

    /// Takes the recent event log, oldest first.
    pub fn take_events(&mut self) -> Vec<GameplayEvent> {
        self.flush();
        self.log.drain(..).collect()
    }

    fn flush(&mut self) {
        let mut drained = Vec::new();
        for owner in self.owners.values_mut() {
            drained.extend(owner.drain_events());
        }
        for event in drained {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: GameplayEvent) {
        if let GameplayEvent::MovementRequested {
            entity,
            ability,
            request,
        } = &event
        {
            match self.movement.as_mut() {
                Some(host) => host.apply(*entity, ability, *request),
                None => debug!(
                    target: "runtime::simulation",
                    %entity,
                    ability = %ability,
                    ?request,
                    "movement request dropped, no host"
                ),
            }
        }

        self.bus.publish(&event);

        let capacity = self.config.event_log_capacity;
        if capacity == 0 {
            return;
        }
        if self.log.len() == capacity {
            self.log.pop_front();
        }
        self.log.push_back(event);
    }

    pub fn snapshot(&self, entity: EntityId) -> Result<OwnerSnapshot> {
        let owner = self.owner(entity)?;
        let registry = self.registry();
        Ok(OwnerSnapshot {
            entity,
            tags: owner
                .tag_paths(registry)
                .into_iter()
                .map(str::to_string)
                .collect(),
            attributes: owner
                .attributes()
                .iter()
                .map(|value| AttributeSnapshot {
                    id: value.definition.id().to_string(),
                    base: value.base,
                    current: value.current,
                    final_value: owner.final_value(value.definition),
                })
                .collect(),
            effects: owner.effect_summaries(),
            abilities: owner.ability_summaries(),
        })
    }

    /// Snapshot rendered as pretty JSON.
    pub fn snapshot_json(&self, entity: EntityId) -> Result<String> {
        let snapshot = self.snapshot(entity)?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("owners", &self.owners.len())
            .field("elapsed", &self.elapsed)
            .field("behaviors", &self.behaviors)
            .field("bus", &self.bus)
            .finish()
    }
}
