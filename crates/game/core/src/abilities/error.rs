//! Ability activation and grant failures.

use thiserror::Error;

use super::definition::AbilityKey;
use crate::error::{ErrorSeverity, GameError};

/// Why an ability could not be activated.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ActivationError {
    #[error("ability {0} is not granted")]
    NotGranted(AbilityKey),

    #[error("ability {0} is already active")]
    AlreadyActive(String),

    #[error("ability {ability} is on cooldown")]
    OnCooldown { ability: String, remaining: Option<f32> },

    #[error("ability {ability} needs {required} {attribute}, only {available} available")]
    InsufficientCost {
        ability: String,
        attribute: String,
        required: f32,
        available: f32,
    },

    #[error("ability {0} requirements are not met")]
    RequirementsNotMet(String),

    #[error("ability {0} is blocked by owner tags")]
    Blocked(String),
}

impl GameError for ActivationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotGranted(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotGranted(_) => "ABILITY_NOT_GRANTED",
            Self::AlreadyActive(_) => "ABILITY_ALREADY_ACTIVE",
            Self::OnCooldown { .. } => "ABILITY_ON_COOLDOWN",
            Self::InsufficientCost { .. } => "ABILITY_INSUFFICIENT_COST",
            Self::RequirementsNotMet(_) => "ABILITY_REQUIREMENTS_NOT_MET",
            Self::Blocked(_) => "ABILITY_BLOCKED",
        }
    }
}

/// Why an ability could not be granted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GrantError {
    #[error("ability {ability} uses custom behavior '{behavior}' which has no implementation")]
    MissingBehavior { ability: String, behavior: String },
}

impl GameError for GrantError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingBehavior { .. } => "ABILITY_MISSING_BEHAVIOR",
        }
    }
}
