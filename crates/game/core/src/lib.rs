//! Data-driven gameplay primitives: hierarchical tags, bounded attributes,
//! timed effects and cooldown-gated abilities.
//!
//! `gameplay-core` holds the deterministic rules and no I/O. Content loading
//! lives in `gameplay-content`; multi-entity orchestration and host hooks live
//! in `gameplay-runtime`. All per-entity mutation flows through
//! [`owner::OwnerState`], and supporting crates depend on the types
//! re-exported here.
pub mod abilities;
pub mod attributes;
pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod owner;
pub mod tags;

pub use abilities::{
    AbilityBehavior, AbilityContext, AbilityCooldown, AbilityCost, AbilityDef, AbilityDuration,
    AbilityInstance, AbilityKey, AbilityKind, AbilityState, AbilitySummary, ActivationError,
    GrantError,
};
pub use attributes::{
    AttributeChange, AttributeDef, AttributeProfile, AttributeStore, AttributeValue, ProfileEntry,
};
pub use config::EngineConfig;
pub use effects::{
    ActiveEffect, ActiveEffectId, AppliedEffect, EffectDef, EffectDuration, EffectSummary,
    EffectTick, Modifier, ModifierOp,
};
pub use error::{ErrorSeverity, GameError};
pub use events::{GameplayEvent, MovementRequest};
pub use owner::{EntityId, OwnerState, TimerId};
pub use tags::{TagEntry, TagError, TagId, TagQuery, TagQueryExpr, TagQueryNode, TagRegistry, TagSet};
