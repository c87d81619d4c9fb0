//! Per-owner ability instances.

use std::sync::Arc;

use super::behavior::{AbilityBehavior, AbilityDuration};
use super::definition::AbilityDef;
use crate::config::EngineConfig;
use crate::owner::TimerId;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityState {
    #[default]
    Idle,
    Active,
}

/// Read-only snapshot for UI and logs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySummary {
    pub name: String,
    pub state: AbilityState,
    pub active_time: f32,
    /// Seconds left for timed activations.
    pub remaining: Option<f32>,
    /// Seconds until the cooldown tag is removed, if one is pending.
    pub cooldown: Option<f32>,
    pub activations: u32,
}

/// A granted ability: definition, behavior object and activation state.
#[derive(Debug)]
pub struct AbilityInstance {
    definition: Arc<AbilityDef>,
    behavior: Box<dyn AbilityBehavior>,
    state: AbilityState,
    duration: AbilityDuration,
    active_time: f32,
    remaining_time: f32,
    cooldown_timer: Option<TimerId>,
    activations: u32,
}

impl AbilityInstance {
    pub fn new(definition: Arc<AbilityDef>, behavior: Box<dyn AbilityBehavior>) -> Self {
        Self {
            definition,
            behavior,
            state: AbilityState::Idle,
            duration: AbilityDuration::Instant,
            active_time: 0.0,
            remaining_time: 0.0,
            cooldown_timer: None,
            activations: 0,
        }
    }

    pub fn definition(&self) -> &Arc<AbilityDef> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn state(&self) -> AbilityState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AbilityState::Active
    }

    pub fn active_time(&self) -> f32 {
        self.active_time
    }

    /// Seconds left for a timed activation; `None` otherwise.
    pub fn remaining_time(&self) -> Option<f32> {
        match (self.state, self.duration) {
            (AbilityState::Active, AbilityDuration::Timed(_)) => Some(self.remaining_time),
            _ => None,
        }
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn AbilityBehavior {
        self.behavior.as_mut()
    }

    pub(crate) fn cooldown_timer(&self) -> Option<TimerId> {
        self.cooldown_timer
    }

    pub(crate) fn set_cooldown_timer(&mut self, timer: Option<TimerId>) {
        self.cooldown_timer = timer;
    }

    /// Enters `Active` with the duration chosen by the behavior.
    pub(crate) fn begin(&mut self, duration: AbilityDuration) {
        self.state = AbilityState::Active;
        self.duration = duration;
        self.active_time = 0.0;
        self.remaining_time = match duration {
            AbilityDuration::Timed(seconds) => seconds,
            AbilityDuration::Instant | AbilityDuration::Indefinite => 0.0,
        };
        self.activations += 1;
    }

    /// Advances timers. Returns `true` when a timed activation has run out.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.active_time += dt;
        if matches!(self.duration, AbilityDuration::Timed(_)) && self.remaining_time > 0.0 {
            self.remaining_time -= dt;
            if self.remaining_time <= EngineConfig::TIME_EPSILON {
                self.remaining_time = 0.0;
                return true;
            }
        }
        false
    }

    pub(crate) fn finish(&mut self) {
        self.state = AbilityState::Idle;
        self.remaining_time = 0.0;
    }

    pub fn summary(&self, cooldown: Option<f32>) -> AbilitySummary {
        AbilitySummary {
            name: self.definition.name.clone(),
            state: self.state,
            active_time: self.active_time,
            remaining: self.remaining_time(),
            cooldown,
            activations: self.activations,
        }
    }
}
