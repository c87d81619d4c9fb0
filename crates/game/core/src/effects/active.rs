//! Runtime instances of retained (timed or infinite) effects.

use std::sync::Arc;

use super::definition::{EffectDef, EffectDuration, ModifierOp};
use crate::attributes::AttributeDef;
use crate::config::EngineConfig;
use crate::owner::EntityId;

/// Handle to an active effect, unique per owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffectId(pub u64);

/// What happened during one [`ActiveEffect::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectTick {
    /// The duration crossed zero on this tick (reported exactly once).
    pub expired: bool,
    /// The periodic counter crossed zero on this tick.
    pub periodic: bool,
}

/// Read-only snapshot for UI and logs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSummary {
    pub id: ActiveEffectId,
    pub name: String,
    /// `None` for infinite effects.
    pub remaining: Option<f32>,
    pub stacks: u32,
    pub source: EntityId,
}

/// A retained effect on a target.
///
/// Duration and periodic countdowns are independent counters, both advanced
/// on every tick: duration first, then periodic.
#[derive(Clone, Debug)]
pub struct ActiveEffect {
    id: ActiveEffectId,
    definition: Arc<EffectDef>,
    source: EntityId,
    target: EntityId,
    time_remaining: f32,
    stacks: u32,
    next_periodic: f32,
    expired: bool,
}

impl ActiveEffect {
    pub fn new(
        id: ActiveEffectId,
        definition: Arc<EffectDef>,
        source: EntityId,
        target: EntityId,
    ) -> Self {
        let time_remaining = match definition.duration {
            EffectDuration::Timed(seconds) => seconds,
            EffectDuration::Instant | EffectDuration::Infinite => 0.0,
        };
        let next_periodic = definition.period.unwrap_or(0.0);
        Self {
            id,
            definition,
            source,
            target,
            time_remaining,
            stacks: 1,
            next_periodic,
            expired: false,
        }
    }

    pub fn id(&self) -> ActiveEffectId {
        self.id
    }

    pub fn definition(&self) -> &Arc<EffectDef> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn source(&self) -> EntityId {
        self.source
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    /// Seconds left for timed effects; `0.0` for infinite ones.
    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn next_periodic(&self) -> f32 {
        self.next_periodic
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.definition.duration, EffectDuration::Infinite)
    }

    /// Restarts the duration countdown. The periodic phase is kept.
    pub fn refresh(&mut self) {
        if let EffectDuration::Timed(seconds) = self.definition.duration {
            self.time_remaining = seconds;
        }
    }

    /// Adds one stack if below `limit`. Returns whether a stack was added.
    pub fn add_stack(&mut self, limit: u32) -> bool {
        if self.stacks >= limit {
            return false;
        }
        self.stacks += 1;
        true
    }

    /// Marks the effect expired; used to end infinite effects.
    pub fn force_expire(&mut self) {
        self.expired = true;
        self.time_remaining = 0.0;
    }

    /// Advances both countdowns by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> EffectTick {
        let mut outcome = EffectTick::default();
        if self.expired {
            return outcome;
        }

        if let EffectDuration::Timed(_) = self.definition.duration {
            self.time_remaining -= dt;
            if self.time_remaining <= EngineConfig::TIME_EPSILON {
                self.time_remaining = 0.0;
                self.expired = true;
                outcome.expired = true;
            }
        }

        if let Some(period) = self.definition.period {
            self.next_periodic -= dt;
            if self.next_periodic <= EngineConfig::TIME_EPSILON {
                self.next_periodic = period;
                outcome.periodic = true;
            }
        }

        outcome
    }

    /// Folds this effect's modifiers for `attribute` into `running`.
    ///
    /// The first matching `Override` replaces the value outright and ignores
    /// stacks. Otherwise:
    ///
    /// ```text
    /// additive       = Σ add.value × stacks
    /// multiplicative = Π (1 + (mul.value - 1) × stacks)
    /// result         = (running + additive) × multiplicative
    /// ```
    pub fn modified_value(&self, attribute: &AttributeDef, running: f32) -> f32 {
        let stacks = self.stacks as f32;
        let mut additive = 0.0;
        let mut multiplicative = 1.0;

        for modifier in self.definition.modifiers_for(attribute) {
            match modifier.op {
                ModifierOp::Override => return modifier.value,
                ModifierOp::Add => additive += modifier.value * stacks,
                ModifierOp::Multiply => multiplicative *= 1.0 + (modifier.value - 1.0) * stacks,
            }
        }

        (running + additive) * multiplicative
    }

    pub fn summary(&self) -> EffectSummary {
        EffectSummary {
            id: self.id,
            name: self.definition.name.clone(),
            remaining: (!self.is_infinite()).then_some(self.time_remaining),
            stacks: self.stacks,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::definition::Modifier;

    fn active(def: EffectDef) -> ActiveEffect {
        ActiveEffect::new(ActiveEffectId(1), def.build(), EntityId(0), EntityId(1))
    }

    #[test]
    fn periodic_fires_once_per_period_and_expires_with_the_last() {
        let mut effect = active(EffectDef::new("Poison", EffectDuration::Timed(5.0)).periodic(1.0));

        let mut fired = 0;
        let mut expired_at = None;
        for step in 1..=5 {
            let tick = effect.tick(1.0);
            if tick.periodic {
                fired += 1;
            }
            if tick.expired {
                expired_at = Some(step);
            }
        }

        assert_eq!(fired, 5);
        assert_eq!(expired_at, Some(5));
        assert!(effect.is_expired());
        assert_eq!(effect.tick(1.0), EffectTick::default());
    }

    #[test]
    fn tenth_second_steps_match_whole_second_steps() {
        let mut effect = active(EffectDef::new("Poison", EffectDuration::Timed(5.0)).periodic(1.0));

        let mut fired = Vec::new();
        let mut expired_at = None;
        for step in 1..=50 {
            let tick = effect.tick(0.1);
            if tick.periodic {
                fired.push(step);
            }
            if tick.expired {
                expired_at = Some(step);
            }
        }

        assert_eq!(fired, vec![10, 20, 30, 40, 50]);
        assert_eq!(expired_at, Some(50));
    }

    #[test]
    fn expiry_is_reported_once_and_clamped() {
        let mut effect = active(EffectDef::new("Stun", EffectDuration::Timed(1.5)));
        assert!(!effect.tick(1.0).expired);
        assert!(effect.tick(1.0).expired);
        assert_eq!(effect.time_remaining(), 0.0);
        assert!(!effect.tick(1.0).expired);
    }

    #[test]
    fn infinite_effects_never_expire_on_their_own() {
        let mut effect = active(EffectDef::new("Aura", EffectDuration::Infinite));
        for _ in 0..100 {
            assert!(!effect.tick(10.0).expired);
        }
        effect.force_expire();
        assert!(effect.is_expired());
        assert_eq!(effect.summary().remaining, None);
    }

    #[test]
    fn refresh_restores_full_duration() {
        let mut effect = active(EffectDef::new("Haste", EffectDuration::Timed(3.0)));
        effect.tick(2.0);
        effect.refresh();
        assert_eq!(effect.time_remaining(), 3.0);
    }

    #[test]
    fn composition_add_then_multiply_scaled_by_stacks() {
        let strength = AttributeDef::new("Strength").build();
        let mut effect = active(
            EffectDef::new("Rage", EffectDuration::Timed(10.0))
                .with_modifier(Modifier::add(Arc::clone(&strength), 5.0))
                .with_modifier(Modifier::multiply(Arc::clone(&strength), 1.5))
                .stacking(3),
        );

        assert_eq!(effect.modified_value(&strength, 10.0), (10.0 + 5.0) * 1.5);

        effect.add_stack(3);
        // additive 10, multiplicative 1 + 0.5 * 2 = 2
        assert_eq!(effect.modified_value(&strength, 10.0), 40.0);
    }

    #[test]
    fn override_wins_and_ignores_stacks() {
        let speed = AttributeDef::new("Speed").build();
        let mut effect = active(
            EffectDef::new("Root", EffectDuration::Timed(2.0))
                .with_modifier(Modifier::add(Arc::clone(&speed), 3.0))
                .with_modifier(Modifier::override_with(Arc::clone(&speed), 0.0))
                .with_modifier(Modifier::override_with(Arc::clone(&speed), 9.0))
                .stacking(4),
        );
        effect.add_stack(4);

        assert_eq!(effect.modified_value(&speed, 7.0), 0.0);
    }

    #[test]
    fn unrelated_attribute_passes_through() {
        let speed = AttributeDef::new("Speed").build();
        let armor = AttributeDef::new("Armor").build();
        let effect = active(
            EffectDef::new("Slow", EffectDuration::Timed(2.0))
                .with_modifier(Modifier::multiply(Arc::clone(&speed), 0.5)),
        );
        assert_eq!(effect.modified_value(&armor, 12.0), 12.0);
    }

    #[test]
    fn add_stack_stops_at_limit() {
        let mut effect = active(EffectDef::new("Bleed", EffectDuration::Timed(3.0)).stacking(2));
        assert!(effect.add_stack(2));
        assert!(!effect.add_stack(2));
        assert_eq!(effect.stacks(), 2);
    }
}
