//! Per-ability-kind behavior hooks.
//!
//! Each granted ability owns one boxed [`AbilityBehavior`]. The built-in kinds
//! are provided here; `Custom` kinds are resolved by name by the host (see the
//! runtime's behavior registry) and handed to
//! [`OwnerState::grant_ability_with`](crate::owner::OwnerState::grant_ability_with).

use std::fmt::Debug;

use crate::attributes::AttributeStore;
use crate::events::{GameplayEvent, MovementRequest};
use crate::owner::EntityId;
use crate::tags::TagSet;

/// How long an ability stays active after `on_activate`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityDuration {
    /// Ends in the same call that activated it.
    Instant,
    /// Ends automatically after the given seconds.
    Timed(f32),
    /// Stays active until cancelled or ended by its behavior's owner.
    Indefinite,
}

impl AbilityDuration {
    /// Content convention: `0` = instant, negative = indefinite, positive = timed.
    pub fn from_seconds(seconds: f32) -> Self {
        if seconds == 0.0 {
            Self::Instant
        } else if seconds < 0.0 {
            Self::Indefinite
        } else {
            Self::Timed(seconds)
        }
    }
}

/// Built-in ability kinds, selectable from content.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKind {
    Instant,
    Timed { duration: f32 },
    /// Active until cancelled.
    Channel,
    /// Asks the host to move the owner at `speed` for `duration` seconds.
    Dash { speed: f32, duration: f32 },
    /// Behavior supplied by the host under `behavior`.
    Custom { behavior: String },
}

impl AbilityKind {
    /// Behavior for built-in kinds; `None` for `Custom`.
    pub fn builtin_behavior(&self) -> Option<Box<dyn AbilityBehavior>> {
        match self {
            Self::Instant => Some(Box::new(InstantBehavior)),
            Self::Timed { duration } => Some(Box::new(TimedBehavior {
                duration: *duration,
            })),
            Self::Channel => Some(Box::new(ChannelBehavior)),
            Self::Dash { speed, duration } => Some(Box::new(DashBehavior {
                speed: *speed,
                duration: *duration,
            })),
            Self::Custom { .. } => None,
        }
    }

    pub fn custom_name(&self) -> Option<&str> {
        match self {
            Self::Custom { behavior } => Some(behavior),
            _ => None,
        }
    }
}

/// View of the owner handed to behavior hooks.
///
/// Hooks can read and write attributes, read tags, and request movement from
/// the host through the event queue. Tags and effects stay under the owner's
/// control.
pub struct AbilityContext<'a> {
    entity: EntityId,
    ability: &'a str,
    active_time: f32,
    attributes: &'a mut AttributeStore,
    tags: &'a TagSet,
    events: &'a mut Vec<GameplayEvent>,
}

impl<'a> AbilityContext<'a> {
    pub fn new(
        entity: EntityId,
        ability: &'a str,
        active_time: f32,
        attributes: &'a mut AttributeStore,
        tags: &'a TagSet,
        events: &'a mut Vec<GameplayEvent>,
    ) -> Self {
        Self {
            entity,
            ability,
            active_time,
            attributes,
            tags,
            events,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn ability(&self) -> &str {
        self.ability
    }

    /// Seconds since activation, as of this hook call.
    pub fn active_time(&self) -> f32 {
        self.active_time
    }

    pub fn attributes(&self) -> &AttributeStore {
        self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        self.attributes
    }

    pub fn tags(&self) -> &TagSet {
        self.tags
    }

    pub fn request_movement(&mut self, request: MovementRequest) {
        self.events.push(GameplayEvent::MovementRequested {
            entity: self.entity,
            ability: self.ability.to_string(),
            request,
        });
    }
}

/// Kind-specific activation logic.
pub trait AbilityBehavior: Debug {
    /// Runs after cost, cooldown, active tags and on-activate effects are applied.
    fn on_activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityDuration;

    /// Runs every step while the ability is active.
    fn on_tick(&mut self, _ctx: &mut AbilityContext<'_>, _dt: f32) {}

    /// Runs once when the ability ends, after active tags are revoked and
    /// on-end effects are applied.
    fn on_end(&mut self, _ctx: &mut AbilityContext<'_>, _cancelled: bool) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstantBehavior;

impl AbilityBehavior for InstantBehavior {
    fn on_activate(&mut self, _ctx: &mut AbilityContext<'_>) -> AbilityDuration {
        AbilityDuration::Instant
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimedBehavior {
    pub duration: f32,
}

impl AbilityBehavior for TimedBehavior {
    fn on_activate(&mut self, _ctx: &mut AbilityContext<'_>) -> AbilityDuration {
        AbilityDuration::from_seconds(self.duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelBehavior;

impl AbilityBehavior for ChannelBehavior {
    fn on_activate(&mut self, _ctx: &mut AbilityContext<'_>) -> AbilityDuration {
        AbilityDuration::Indefinite
    }
}

/// Starts a dash on activation and stops it on end. Direction is the host's call.
#[derive(Debug, Clone, Copy)]
pub struct DashBehavior {
    pub speed: f32,
    pub duration: f32,
}

impl AbilityBehavior for DashBehavior {
    fn on_activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityDuration {
        ctx.request_movement(MovementRequest::Dash { speed: self.speed });
        if self.duration > 0.0 {
            AbilityDuration::Timed(self.duration)
        } else {
            AbilityDuration::Instant
        }
    }

    fn on_end(&mut self, ctx: &mut AbilityContext<'_>, _cancelled: bool) {
        ctx.request_movement(MovementRequest::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_sign_convention() {
        assert_eq!(AbilityDuration::from_seconds(0.0), AbilityDuration::Instant);
        assert_eq!(AbilityDuration::from_seconds(-2.0), AbilityDuration::Indefinite);
        assert_eq!(AbilityDuration::from_seconds(1.5), AbilityDuration::Timed(1.5));
    }

    #[test]
    fn custom_kinds_have_no_builtin() {
        let kind = AbilityKind::Custom {
            behavior: "grapple".into(),
        };
        assert!(kind.builtin_behavior().is_none());
        assert_eq!(kind.custom_name(), Some("grapple"));
        assert!(AbilityKind::Channel.builtin_behavior().is_some());
    }

    #[test]
    fn dash_requests_start_and_stop() {
        let mut attributes = AttributeStore::new();
        let tags = TagSet::new();
        let mut events = Vec::new();
        let mut dash = DashBehavior {
            speed: 12.0,
            duration: 0.25,
        };

        let mut ctx = AbilityContext::new(
            EntityId(3),
            "Dash",
            0.0,
            &mut attributes,
            &tags,
            &mut events,
        );
        assert_eq!(dash.on_activate(&mut ctx), AbilityDuration::Timed(0.25));
        dash.on_end(&mut ctx, false);

        let requests: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                GameplayEvent::MovementRequested { request, .. } => Some(*request),
                _ => None,
            })
            .collect();
        assert_eq!(
            requests,
            vec![MovementRequest::Dash { speed: 12.0 }, MovementRequest::Stop]
        );
    }
}
