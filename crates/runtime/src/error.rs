//! Runtime errors.

use gameplay_core::{ActivationError, EntityId, ErrorSeverity, GameError, GrantError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("unknown effect '{0}'")]
    UnknownEffect(String),

    #[error("unknown ability '{0}'")]
    UnknownAbility(String),

    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error(transparent)]
    Grant(#[from] GrantError),

    #[error(transparent)]
    Activation(#[from] ActivationError),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RuntimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl RuntimeError {
    /// The activation failure, if this is one.
    pub fn as_activation(&self) -> Option<&ActivationError> {
        match self {
            Self::Activation(err) => Some(err),
            _ => None,
        }
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Activation(err) => err.severity(),
            Self::Grant(err) => err.severity(),
            Self::Serialization(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity(_) => "RUNTIME_UNKNOWN_ENTITY",
            Self::UnknownProfile(_) => "RUNTIME_UNKNOWN_PROFILE",
            Self::UnknownEffect(_) => "RUNTIME_UNKNOWN_EFFECT",
            Self::UnknownAbility(_) => "RUNTIME_UNKNOWN_ABILITY",
            Self::UnknownAttribute(_) => "RUNTIME_UNKNOWN_ATTRIBUTE",
            Self::UnknownTag(_) => "RUNTIME_UNKNOWN_TAG",
            Self::Grant(err) => err.error_code(),
            Self::Activation(err) => err.error_code(),
            Self::Serialization(_) => "RUNTIME_SERIALIZATION",
        }
    }
}
