//! Effect system.
//!
//! - [`EffectDef`]: shared static description (duration, modifiers, tag changes,
//!   gating queries, stacking and periodic policy)
//! - [`ActiveEffect`]: a retained instance on one target with its own timers
//!
//! Application, stacking and removal are orchestrated by
//! [`OwnerState`](crate::owner::OwnerState), which owns the active list.

pub mod active;
pub mod definition;

pub use active::{ActiveEffect, ActiveEffectId, EffectSummary, EffectTick};
pub use definition::{EffectDef, EffectDuration, Modifier, ModifierOp};

/// Outcome of a successful effect application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppliedEffect {
    /// Instant effect folded into stored values; nothing retained.
    Executed,
    /// New active effect appended to the target.
    Added(ActiveEffectId),
    /// Existing instance had its duration restarted.
    Refreshed(ActiveEffectId),
    /// Existing instance gained a stack (and was refreshed).
    Stacked { id: ActiveEffectId, stacks: u32 },
}

impl AppliedEffect {
    /// The retained instance, if any.
    pub fn id(&self) -> Option<ActiveEffectId> {
        match self {
            Self::Executed => None,
            Self::Added(id) | Self::Refreshed(id) => Some(*id),
            Self::Stacked { id, .. } => Some(*id),
        }
    }
}
