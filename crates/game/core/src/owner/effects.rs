//! Effect application, periodic execution and removal.

use std::sync::Arc;

use super::{EntityId, OwnerState};
use crate::effects::{ActiveEffect, ActiveEffectId, AppliedEffect, EffectDef, ModifierOp};
use crate::events::GameplayEvent;
use crate::tags::{TagId, TagRegistry};

impl OwnerState {
    /// Whether `effect` would currently be accepted by this owner.
    pub fn can_apply_effect(&self, effect: &EffectDef, registry: &TagRegistry) -> bool {
        effect.require_tags.evaluate(&self.tags, registry)
            && !effect.block_tags.blocks(&self.tags, registry)
    }

    /// Applies `effect` from `source` to this owner.
    ///
    /// Returns `None` when the tag requirements reject it. Instant effects are
    /// folded into stored values; retained effects either refresh (and maybe
    /// stack) an existing instance of the same definition or start a new one.
    pub fn apply_effect(
        &mut self,
        effect: &Arc<EffectDef>,
        source: EntityId,
        registry: &TagRegistry,
    ) -> Option<AppliedEffect> {
        if !self.can_apply_effect(effect, registry) {
            tracing::debug!(
                target: "gameplay::effects",
                entity = %self.id,
                effect = %effect.name,
                "effect rejected by tag requirements"
            );
            self.events.push(GameplayEvent::EffectRejected {
                entity: self.id,
                effect: effect.name.clone(),
            });
            self.flush_attribute_changes();
            return None;
        }

        let outcome = if effect.duration.is_instant() {
            self.execute(effect, 1);
            self.apply_tag_changes(effect);
            self.events.push(GameplayEvent::EffectExecuted {
                entity: self.id,
                effect: effect.name.clone(),
                source,
            });
            AppliedEffect::Executed
        } else {
            self.retain(effect, source)
        };

        tracing::debug!(
            target: "gameplay::effects",
            entity = %self.id,
            effect = %effect.name,
            ?outcome,
            "effect applied"
        );
        self.flush_attribute_changes();
        Some(outcome)
    }

    fn retain(&mut self, effect: &Arc<EffectDef>, source: EntityId) -> AppliedEffect {
        let limit = effect.stack_limit(&self.config);

        if let Some(existing) = self
            .effects
            .iter_mut()
            .find(|active| !active.is_expired() && active.name() == effect.name)
        {
            let stacked = effect.can_stack && existing.add_stack(limit);
            existing.refresh();
            let id = existing.id();
            let stacks = existing.stacks();
            self.events.push(GameplayEvent::EffectRefreshed {
                entity: self.id,
                id,
                stacks,
            });
            self.apply_tag_changes(effect);
            return if stacked {
                AppliedEffect::Stacked { id, stacks }
            } else {
                AppliedEffect::Refreshed(id)
            };
        }

        let id = self.next_effect_id();
        self.effects
            .push(ActiveEffect::new(id, Arc::clone(effect), source, self.id));
        self.apply_tag_changes(effect);
        self.events.push(GameplayEvent::EffectApplied {
            entity: self.id,
            id,
            effect: effect.name.clone(),
            source,
        });
        AppliedEffect::Added(id)
    }

    fn apply_tag_changes(&mut self, effect: &EffectDef) {
        for &tag in &effect.grant_tags {
            self.add_tag(tag);
        }
        for &tag in &effect.remove_tags {
            self.remove_tag(tag);
        }
    }

    /// Writes an effect's modifiers into stored values.
    ///
    /// Used for instant effects and for each periodic execution. `Add` scales
    /// with stacks; `Multiply` rebases on the final value; `Override` sets base.
    fn execute(&mut self, effect: &EffectDef, stacks: u32) {
        for modifier in &effect.modifiers {
            match modifier.op {
                ModifierOp::Add => {
                    self.attributes
                        .modify(&modifier.attribute, modifier.value * stacks as f32);
                }
                ModifierOp::Multiply => {
                    let value = self.final_value(&modifier.attribute) * modifier.value;
                    self.attributes.set_base(&modifier.attribute, value);
                }
                ModifierOp::Override => {
                    self.attributes.set_base(&modifier.attribute, modifier.value);
                }
            }
        }
    }

    /// Advances active effects, runs periodic executions and removes expired ones.
    pub(super) fn tick_effects(&mut self, dt: f32) {
        let ids: Vec<ActiveEffectId> = self.effects.iter().map(ActiveEffect::id).collect();
        let mut finished = Vec::new();

        for id in ids {
            let Some(pos) = self.effect_position(id) else {
                continue;
            };
            let tick = self.effects[pos].tick(dt);
            if tick.periodic {
                let definition = Arc::clone(self.effects[pos].definition());
                let stacks = self.effects[pos].stacks();
                self.execute(&definition, stacks);
                self.events.push(GameplayEvent::EffectPeriodic {
                    entity: self.id,
                    id,
                });
            }
            if self.effects[pos].is_expired() {
                finished.push(id);
            }
        }

        for id in finished {
            self.detach(id, true);
        }
    }

    fn effect_position(&self, id: ActiveEffectId) -> Option<usize> {
        self.effects.iter().position(|effect| effect.id() == id)
    }

    /// Removes an active effect and revokes its granted tags.
    ///
    /// A tag still granted by another remaining effect or active ability stays
    /// on the owner.
    fn detach(&mut self, id: ActiveEffectId, expired: bool) -> bool {
        let Some(pos) = self.effect_position(id) else {
            return false;
        };
        let effect = self.effects.remove(pos);

        for &tag in &effect.definition().grant_tags {
            self.release_tag(tag, None);
        }

        tracing::debug!(
            target: "gameplay::effects",
            entity = %self.id,
            effect = effect.name(),
            expired,
            "effect removed"
        );
        self.events.push(GameplayEvent::EffectRemoved {
            entity: self.id,
            id,
            effect: effect.name().to_string(),
            expired,
        });
        true
    }

    /// Removes an active effect by handle. Returns `false` if it is not present.
    pub fn remove_effect(&mut self, id: ActiveEffectId) -> bool {
        let removed = self.detach(id, false);
        self.flush_attribute_changes();
        removed
    }

    /// Ends an effect now as if its duration ran out. Works for infinite effects.
    pub fn expire_effect(&mut self, id: ActiveEffectId) -> bool {
        let Some(pos) = self.effect_position(id) else {
            return false;
        };
        self.effects[pos].force_expire();
        self.detach(id, true)
    }

    /// Removes every active effect with the given definition name.
    pub fn remove_effects_named(&mut self, name: &str) -> usize {
        let ids: Vec<_> = self
            .effects
            .iter()
            .filter(|effect| effect.name() == name)
            .map(ActiveEffect::id)
            .collect();
        self.detach_all(ids)
    }

    /// Removes every active effect that grants `tag` or one of its descendants.
    pub fn remove_effects_granting(&mut self, tag: TagId, registry: &TagRegistry) -> usize {
        let ids: Vec<_> = self
            .effects
            .iter()
            .filter(|effect| {
                effect
                    .definition()
                    .grant_tags
                    .iter()
                    .any(|&granted| granted == tag || registry.is_descendant(granted, tag))
            })
            .map(ActiveEffect::id)
            .collect();
        self.detach_all(ids)
    }

    fn detach_all(&mut self, ids: Vec<ActiveEffectId>) -> usize {
        let removed = ids.into_iter().filter(|&id| self.detach(id, false)).count();
        self.flush_attribute_changes();
        removed
    }

    pub fn effect(&self, id: ActiveEffectId) -> Option<&ActiveEffect> {
        self.effects.iter().find(|effect| effect.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeDef;
    use crate::effects::{EffectDuration, Modifier};
    use crate::tags::TagQuery;

    fn registry() -> TagRegistry {
        TagRegistry::from_paths(["State.Stunned", "State.Slowed", "State.Immune"]).unwrap()
    }

    #[test]
    fn instant_add_changes_stored_value() {
        let registry = registry();
        let health = AttributeDef::new("Health").with_default(100.0).build();
        let damage = EffectDef::new("Hit", EffectDuration::Instant)
            .with_modifier(Modifier::add(Arc::clone(&health), -30.0))
            .build();
        let mut owner = OwnerState::new(EntityId(1));

        let outcome = owner.apply_effect(&damage, EntityId(9), &registry);

        assert_eq!(outcome, Some(AppliedEffect::Executed));
        assert_eq!(owner.attributes().get(&health), 70.0);
        assert!(owner.active_effects().is_empty());
    }

    #[test]
    fn instant_multiply_rebases_on_final_value() {
        let registry = registry();
        let speed = AttributeDef::new("Speed").with_default(10.0).build();
        let haste = EffectDef::new("Haste", EffectDuration::Timed(5.0))
            .with_modifier(Modifier::add(Arc::clone(&speed), 2.0))
            .build();
        let boost = EffectDef::new("Boost", EffectDuration::Instant)
            .with_modifier(Modifier::multiply(Arc::clone(&speed), 2.0))
            .build();
        let mut owner = OwnerState::new(EntityId(1));

        owner.apply_effect(&haste, EntityId(1), &registry);
        owner.apply_effect(&boost, EntityId(1), &registry);

        // (10 + 2) * 2 stored, plus the still-active +2.
        assert_eq!(owner.attributes().get_base(&speed), 24.0);
        assert_eq!(owner.final_value(&speed), 26.0);
    }

    #[test]
    fn blocked_effect_is_rejected() {
        let registry = registry();
        let immune = registry.id_of("State.Immune").unwrap();
        let stunned = registry.id_of("State.Stunned").unwrap();
        let stun = EffectDef::new("Stun", EffectDuration::Timed(2.0))
            .granting(stunned)
            .blocked_by(TagQuery::require_any(&[immune]))
            .build();
        let mut owner = OwnerState::new(EntityId(1));
        owner.add_tag(immune);

        assert_eq!(owner.apply_effect(&stun, EntityId(2), &registry), None);
        assert!(!owner.has_tag_exact(stunned));
    }

    #[test]
    fn shared_grant_survives_until_last_effect_leaves() {
        let registry = registry();
        let slowed = registry.id_of("State.Slowed").unwrap();
        let frost = EffectDef::new("Frost", EffectDuration::Timed(1.0))
            .granting(slowed)
            .build();
        let mud = EffectDef::new("Mud", EffectDuration::Timed(3.0))
            .granting(slowed)
            .build();
        let mut owner = OwnerState::new(EntityId(1));

        owner.apply_effect(&frost, EntityId(1), &registry);
        owner.apply_effect(&mud, EntityId(1), &registry);
        owner.step(1.0, &registry);
        assert!(owner.has_tag_exact(slowed));

        owner.step(2.0, &registry);
        assert!(!owner.has_tag_exact(slowed));
    }

    #[test]
    fn removal_by_name_and_by_granted_tag() {
        let registry = registry();
        let state = registry.id_of("State").unwrap();
        let stunned = registry.id_of("State.Stunned").unwrap();
        let aura = EffectDef::new("Aura", EffectDuration::Infinite).build();
        let stun = EffectDef::new("Stun", EffectDuration::Infinite)
            .granting(stunned)
            .build();
        let mut owner = OwnerState::new(EntityId(1));

        owner.apply_effect(&aura, EntityId(1), &registry);
        owner.apply_effect(&stun, EntityId(1), &registry);

        assert_eq!(owner.remove_effects_granting(state, &registry), 1);
        assert!(!owner.has_tag_exact(stunned));
        assert_eq!(owner.remove_effects_named("Aura"), 1);
        assert_eq!(owner.remove_effects_named("Aura"), 0);
        assert!(owner.active_effects().is_empty());
    }

    #[test]
    fn remove_by_handle_revokes_grants_once() {
        let registry = registry();
        let slowed = registry.id_of("State.Slowed").unwrap();
        let frost = EffectDef::new("Frost", EffectDuration::Timed(4.0))
            .granting(slowed)
            .build();
        let mut owner = OwnerState::new(EntityId(1));
        let id = owner
            .apply_effect(&frost, EntityId(2), &registry)
            .and_then(|outcome| outcome.id())
            .unwrap();
        owner.drain_events();

        assert!(owner.remove_effect(id));
        assert!(!owner.has_tag_exact(slowed));
        assert!(owner.effect(id).is_none());
        assert!(owner.drain_events().iter().any(|event| matches!(
            event,
            GameplayEvent::EffectRemoved { expired: false, .. }
        )));

        assert!(!owner.remove_effect(id));
        assert!(owner.drain_events().is_empty());
    }

    #[test]
    fn expire_ends_infinite_effect() {
        let registry = registry();
        let aura = EffectDef::new("Aura", EffectDuration::Infinite).build();
        let mut owner = OwnerState::new(EntityId(1));
        let id = owner
            .apply_effect(&aura, EntityId(1), &registry)
            .and_then(|outcome| outcome.id())
            .unwrap();

        assert!(owner.expire_effect(id));
        assert!(!owner.expire_effect(id));
        assert!(owner.drain_events().iter().any(|event| matches!(
            event,
            GameplayEvent::EffectRemoved { expired: true, .. }
        )));
    }
}
