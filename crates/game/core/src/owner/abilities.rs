//! Ability granting, activation lifecycle and cooldowns.

use std::sync::Arc;

use super::{DeferredAction, OwnerState};
use crate::abilities::{
    AbilityBehavior, AbilityContext, AbilityDef, AbilityDuration, AbilityInstance, AbilityKey,
    ActivationError, GrantError,
};
use crate::events::GameplayEvent;
use crate::tags::TagRegistry;

impl OwnerState {
    // ========================================================================
    // Granting
    // ========================================================================

    /// Grants an ability with its built-in behavior.
    ///
    /// Granting an already granted key returns the existing instance unchanged.
    /// `Custom` kinds must go through [`grant_ability_with`](Self::grant_ability_with).
    pub fn grant_ability(
        &mut self,
        definition: Arc<AbilityDef>,
    ) -> Result<&mut AbilityInstance, GrantError> {
        if let Some(idx) = self.ability_index(&definition.key()) {
            return Ok(&mut self.abilities[idx]);
        }
        let behavior =
            definition
                .kind
                .builtin_behavior()
                .ok_or_else(|| GrantError::MissingBehavior {
                    ability: definition.name.clone(),
                    behavior: definition.kind.custom_name().unwrap_or_default().to_string(),
                })?;
        Ok(self.grant_ability_with(definition, behavior))
    }

    /// Grants an ability with a host-supplied behavior.
    pub fn grant_ability_with(
        &mut self,
        definition: Arc<AbilityDef>,
        behavior: Box<dyn AbilityBehavior>,
    ) -> &mut AbilityInstance {
        let idx = match self.ability_index(&definition.key()) {
            Some(idx) => idx,
            None => {
                tracing::debug!(
                    target: "gameplay::abilities",
                    entity = %self.id,
                    ability = %definition.name,
                    "ability granted"
                );
                self.abilities
                    .push(AbilityInstance::new(definition, behavior));
                self.abilities.len() - 1
            }
        };
        &mut self.abilities[idx]
    }

    /// Removes a granted ability, cancelling it first if active.
    ///
    /// A running cooldown keeps counting and still removes its tag.
    pub fn revoke_ability(&mut self, key: &AbilityKey, registry: &TagRegistry) -> bool {
        let Some(idx) = self.ability_index(key) else {
            return false;
        };
        self.end_ability(idx, true, registry);
        self.abilities.remove(idx);
        self.flush_attribute_changes();
        true
    }

    pub fn ability(&self, key: &AbilityKey) -> Option<&AbilityInstance> {
        self.ability_index(key).map(|idx| &self.abilities[idx])
    }

    fn ability_index(&self, key: &AbilityKey) -> Option<usize> {
        self.abilities
            .iter()
            .position(|ability| ability.definition().matches(key))
    }

    // ========================================================================
    // Activation
    // ========================================================================

    /// Checks activation policy without changing anything.
    ///
    /// Checks run in a fixed order: granted, not active, cooldown, cost,
    /// required tags, blocking tags.
    pub fn can_activate(
        &self,
        key: &AbilityKey,
        registry: &TagRegistry,
    ) -> Result<(), ActivationError> {
        let idx = self
            .ability_index(key)
            .ok_or_else(|| ActivationError::NotGranted(key.clone()))?;
        let instance = &self.abilities[idx];
        let def = instance.definition();

        if instance.is_active() {
            return Err(ActivationError::AlreadyActive(def.name.clone()));
        }

        if let Some(cooldown) = &def.cooldown {
            if self.tags.has_exact(cooldown.tag) {
                return Err(ActivationError::OnCooldown {
                    ability: def.name.clone(),
                    remaining: instance
                        .cooldown_timer()
                        .and_then(|timer| self.timers.remaining(timer)),
                });
            }
        }

        if let Some(cost) = &def.cost {
            let available = self.attributes.get(&cost.attribute);
            if available < cost.amount {
                return Err(ActivationError::InsufficientCost {
                    ability: def.name.clone(),
                    attribute: cost.attribute.id().to_string(),
                    required: cost.amount,
                    available,
                });
            }
        }

        if !def.require_tags.evaluate(&self.tags, registry) {
            return Err(ActivationError::RequirementsNotMet(def.name.clone()));
        }

        if def.blocked_by_tags.blocks(&self.tags, registry) {
            return Err(ActivationError::Blocked(def.name.clone()));
        }

        Ok(())
    }

    /// Activates a granted ability.
    ///
    /// On success: cost is paid, the cooldown tag is added and its removal
    /// scheduled, active tags are granted, on-activate effects are applied to
    /// this owner, then the behavior decides the duration. Instant activations
    /// end before this returns.
    pub fn try_activate(
        &mut self,
        key: &AbilityKey,
        registry: &TagRegistry,
    ) -> Result<(), ActivationError> {
        if let Err(err) = self.can_activate(key, registry) {
            tracing::debug!(
                target: "gameplay::abilities",
                entity = %self.id,
                %key,
                error = %err,
                "activation refused"
            );
            return Err(err);
        }
        let idx = self
            .ability_index(key)
            .ok_or_else(|| ActivationError::NotGranted(key.clone()))?;
        let def = Arc::clone(self.abilities[idx].definition());

        if let Some(cost) = &def.cost {
            self.attributes.modify(&cost.attribute, -cost.amount);
        }

        if let Some(cooldown) = def.cooldown.filter(|c| c.seconds > 0.0) {
            self.add_tag(cooldown.tag);
            if let Some(previous) = self.abilities[idx].cooldown_timer() {
                self.timers.cancel(previous);
            }
            let timer = self
                .timers
                .schedule(cooldown.seconds, DeferredAction::RemoveTag(cooldown.tag));
            self.abilities[idx].set_cooldown_timer(Some(timer));
            self.events.push(GameplayEvent::CooldownStarted {
                entity: self.id,
                ability: def.name.clone(),
                seconds: cooldown.seconds,
            });
        }

        for &tag in &def.active_tags {
            self.add_tag(tag);
        }

        for effect in &def.on_activate_effects {
            self.apply_effect(effect, self.id, registry);
        }

        let instance = &mut self.abilities[idx];
        let mut ctx = AbilityContext::new(
            self.id,
            &def.name,
            0.0,
            &mut self.attributes,
            &self.tags,
            &mut self.events,
        );
        let duration = instance.behavior_mut().on_activate(&mut ctx);
        instance.begin(duration);

        tracing::debug!(
            target: "gameplay::abilities",
            entity = %self.id,
            ability = %def.name,
            ?duration,
            "ability activated"
        );
        self.events.push(GameplayEvent::AbilityActivated {
            entity: self.id,
            ability: def.name.clone(),
        });

        if duration == AbilityDuration::Instant {
            self.end_ability(idx, false, registry);
        }
        self.flush_attribute_changes();
        Ok(())
    }

    /// Cancels an active ability. Idle abilities are left alone.
    pub fn cancel_ability(
        &mut self,
        key: &AbilityKey,
        registry: &TagRegistry,
    ) -> Result<(), ActivationError> {
        let idx = self
            .ability_index(key)
            .ok_or_else(|| ActivationError::NotGranted(key.clone()))?;
        self.end_ability(idx, true, registry);
        self.flush_attribute_changes();
        Ok(())
    }

    /// Ends an active ability without marking it cancelled.
    pub fn end_ability_now(
        &mut self,
        key: &AbilityKey,
        registry: &TagRegistry,
    ) -> Result<(), ActivationError> {
        let idx = self
            .ability_index(key)
            .ok_or_else(|| ActivationError::NotGranted(key.clone()))?;
        self.end_ability(idx, false, registry);
        self.flush_attribute_changes();
        Ok(())
    }

    /// Cancels every active ability. Returns how many were cancelled.
    pub fn cancel_all_abilities(&mut self, registry: &TagRegistry) -> usize {
        let mut cancelled = 0;
        for idx in 0..self.abilities.len() {
            if self.abilities[idx].is_active() {
                self.end_ability(idx, true, registry);
                cancelled += 1;
            }
        }
        self.flush_attribute_changes();
        cancelled
    }

    /// Drops a pending cooldown: the timer is cancelled and the tag removed.
    pub fn reset_cooldown(&mut self, key: &AbilityKey) -> bool {
        let Some(idx) = self.ability_index(key) else {
            return false;
        };
        let Some(cooldown) = self.abilities[idx].definition().cooldown else {
            return false;
        };
        if let Some(timer) = self.abilities[idx].cooldown_timer() {
            self.timers.cancel(timer);
        }
        self.abilities[idx].set_cooldown_timer(None);
        self.remove_tag(cooldown.tag)
    }

    /// Seconds until the ability's cooldown tag is removed.
    pub fn cooldown_remaining(&self, key: &AbilityKey) -> Option<f32> {
        let idx = self.ability_index(key)?;
        let timer = self.abilities[idx].cooldown_timer()?;
        self.timers.remaining(timer)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub(super) fn tick_abilities(&mut self, dt: f32, registry: &TagRegistry) {
        for idx in 0..self.abilities.len() {
            if !self.abilities[idx].is_active() {
                continue;
            }

            let timed_out = self.abilities[idx].advance(dt);
            let instance = &mut self.abilities[idx];
            let def = Arc::clone(instance.definition());
            let mut ctx = AbilityContext::new(
                self.id,
                &def.name,
                instance.active_time(),
                &mut self.attributes,
                &self.tags,
                &mut self.events,
            );
            instance.behavior_mut().on_tick(&mut ctx, dt);

            if timed_out {
                self.end_ability(idx, false, registry);
            }
        }
    }

    /// Revokes active tags no other grant holds, applies on-end effects, runs the end hook and
    /// returns the instance to `Idle`. No-op when not active.
    fn end_ability(&mut self, idx: usize, cancelled: bool, registry: &TagRegistry) {
        if !self.abilities[idx].is_active() {
            return;
        }
        let def = Arc::clone(self.abilities[idx].definition());

        for &tag in &def.active_tags {
            self.release_tag(tag, Some(idx));
        }

        for effect in &def.on_end_effects {
            self.apply_effect(effect, self.id, registry);
        }

        let instance = &mut self.abilities[idx];
        let mut ctx = AbilityContext::new(
            self.id,
            &def.name,
            instance.active_time(),
            &mut self.attributes,
            &self.tags,
            &mut self.events,
        );
        instance.behavior_mut().on_end(&mut ctx, cancelled);
        instance.finish();

        tracing::debug!(
            target: "gameplay::abilities",
            entity = %self.id,
            ability = %def.name,
            cancelled,
            "ability ended"
        );
        self.events.push(GameplayEvent::AbilityEnded {
            entity: self.id,
            ability: def.name.clone(),
            cancelled,
        });
    }
}
