//! Ability system.
//!
//! An [`AbilityDef`] describes costs, cooldown, gating and effects; the
//! [`AbilityBehavior`] chosen by its [`AbilityKind`] supplies kind-specific
//! logic. Owners hold one [`AbilityInstance`] per granted ability and drive the
//! Idle → Active → Idle lifecycle.

pub mod behavior;
pub mod definition;
pub mod error;
pub mod instance;

pub use behavior::{
    AbilityBehavior, AbilityContext, AbilityDuration, AbilityKind, ChannelBehavior, DashBehavior,
    InstantBehavior, TimedBehavior,
};
pub use definition::{AbilityCooldown, AbilityCost, AbilityDef, AbilityKey};
pub use error::{ActivationError, GrantError};
pub use instance::{AbilityInstance, AbilityState, AbilitySummary};
