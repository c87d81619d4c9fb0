//! Host-side behaviors for `Custom` ability kinds.
//!
//! Content names a behavior (`Custom(behavior: "grapple")`); the
//! [`BehaviorRegistry`] maps that name to a [`BehaviorFactory`] which builds a
//! fresh behavior object for every grant. Built-in kinds never reach the
//! registry.

mod movement;
mod registry;

pub use movement::{BlinkBehavior, BlinkFactory, GrappleBehavior, GrappleFactory};
pub use registry::BehaviorRegistry;

use gameplay_core::{AbilityBehavior, AbilityDef};

/// Builds behavior objects for one custom behavior name.
pub trait BehaviorFactory: Send + Sync {
    /// Name referenced from content.
    fn name(&self) -> &'static str;

    /// Creates the behavior for a newly granted ability.
    fn create(&self, ability: &AbilityDef) -> Box<dyn AbilityBehavior>;
}

/// Adapts a plain function into a [`BehaviorFactory`].
pub struct FnFactory {
    name: &'static str,
    create: fn(&AbilityDef) -> Box<dyn AbilityBehavior>,
}

impl FnFactory {
    pub fn new(name: &'static str, create: fn(&AbilityDef) -> Box<dyn AbilityBehavior>) -> Self {
        Self { name, create }
    }
}

impl BehaviorFactory for FnFactory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn create(&self, ability: &AbilityDef) -> Box<dyn AbilityBehavior> {
        (self.create)(ability)
    }
}
