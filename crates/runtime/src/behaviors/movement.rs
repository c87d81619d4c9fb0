//! Movement-driven custom behaviors.

use gameplay_core::{
    AbilityBehavior, AbilityContext, AbilityDef, AbilityDuration, MovementRequest,
};

use super::BehaviorFactory;

/// Instant forward teleport. The offset is in the owner's local frame (+z forward).
#[derive(Debug, Clone, Copy)]
pub struct BlinkBehavior {
    pub distance: f32,
}

impl AbilityBehavior for BlinkBehavior {
    fn on_activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityDuration {
        ctx.request_movement(MovementRequest::Teleport {
            offset: [0.0, 0.0, self.distance],
        });
        AbilityDuration::Instant
    }
}

pub struct BlinkFactory {
    pub distance: f32,
}

impl Default for BlinkFactory {
    fn default() -> Self {
        Self { distance: 8.0 }
    }
}

impl BehaviorFactory for BlinkFactory {
    fn name(&self) -> &'static str {
        "blink"
    }

    fn create(&self, _ability: &AbilityDef) -> Box<dyn AbilityBehavior> {
        Box::new(BlinkBehavior {
            distance: self.distance,
        })
    }
}

/// Pulls the owner forward for a fixed time, then stops.
#[derive(Debug, Clone, Copy)]
pub struct GrappleBehavior {
    pub pull_speed: f32,
    pub max_time: f32,
}

impl AbilityBehavior for GrappleBehavior {
    fn on_activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityDuration {
        ctx.request_movement(MovementRequest::SetVelocity {
            velocity: [0.0, 0.0, self.pull_speed],
        });
        AbilityDuration::Timed(self.max_time)
    }

    fn on_end(&mut self, ctx: &mut AbilityContext<'_>, _cancelled: bool) {
        ctx.request_movement(MovementRequest::Stop);
    }
}

pub struct GrappleFactory {
    pub pull_speed: f32,
    pub max_time: f32,
}

impl Default for GrappleFactory {
    fn default() -> Self {
        Self {
            pull_speed: 15.0,
            max_time: 0.6,
        }
    }
}

impl BehaviorFactory for GrappleFactory {
    fn name(&self) -> &'static str {
        "grapple"
    }

    fn create(&self, _ability: &AbilityDef) -> Box<dyn AbilityBehavior> {
        Box::new(GrappleBehavior {
            pull_speed: self.pull_speed,
            max_time: self.max_time,
        })
    }
}
