//! Gameplay events emitted by owners.
//!
//! Owners queue events as state changes; hosts drain them after each call via
//! [`OwnerState::drain_events`](crate::owner::OwnerState::drain_events).

use crate::attributes::AttributeChange;
use crate::effects::ActiveEffectId;
use crate::owner::EntityId;
use crate::tags::TagId;

/// Movement the host should perform on behalf of an ability.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementRequest {
    /// Dash along the owner's facing (host-defined) at `speed`.
    Dash { speed: f32 },
    /// Set a velocity in world space.
    SetVelocity { velocity: [f32; 3] },
    /// Instantaneous displacement.
    Teleport { offset: [f32; 3] },
    /// Stop any ability-driven movement.
    Stop,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameplayEvent {
    TagAdded {
        entity: EntityId,
        tag: TagId,
    },
    TagRemoved {
        entity: EntityId,
        tag: TagId,
    },
    AttributeChanged {
        entity: EntityId,
        change: AttributeChange,
    },
    EffectExecuted {
        entity: EntityId,
        effect: String,
        source: EntityId,
    },
    EffectApplied {
        entity: EntityId,
        id: ActiveEffectId,
        effect: String,
        source: EntityId,
    },
    EffectRefreshed {
        entity: EntityId,
        id: ActiveEffectId,
        stacks: u32,
    },
    EffectPeriodic {
        entity: EntityId,
        id: ActiveEffectId,
    },
    EffectRemoved {
        entity: EntityId,
        id: ActiveEffectId,
        effect: String,
        expired: bool,
    },
    EffectRejected {
        entity: EntityId,
        effect: String,
    },
    AbilityActivated {
        entity: EntityId,
        ability: String,
    },
    AbilityEnded {
        entity: EntityId,
        ability: String,
        cancelled: bool,
    },
    CooldownStarted {
        entity: EntityId,
        ability: String,
        seconds: f32,
    },
    MovementRequested {
        entity: EntityId,
        ability: String,
        request: MovementRequest,
    },
}

impl GameplayEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::TagAdded { entity, .. }
            | Self::TagRemoved { entity, .. }
            | Self::AttributeChanged { entity, .. }
            | Self::EffectExecuted { entity, .. }
            | Self::EffectApplied { entity, .. }
            | Self::EffectRefreshed { entity, .. }
            | Self::EffectPeriodic { entity, .. }
            | Self::EffectRemoved { entity, .. }
            | Self::EffectRejected { entity, .. }
            | Self::AbilityActivated { entity, .. }
            | Self::AbilityEnded { entity, .. }
            | Self::CooldownStarted { entity, .. }
            | Self::MovementRequested { entity, .. } => *entity,
        }
    }
}
