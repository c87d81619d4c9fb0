//! Common error infrastructure for gameplay-core.
//!
//! This module provides shared types and traits used across all error types in
//! gameplay-core. Domain-specific errors (e.g., `TagError`, `ActivationError`) are
//! defined in their respective modules alongside the operations they guard.
//!
//! # Error Taxonomy
//!
//! - **Not found**: unknown tag paths or attribute names resolve to sentinels
//!   (`None`, `0.0`, `false`) and never surface as errors
//! - **Policy rejection**: failed cost / cooldown / tag gates are expected,
//!   frequent outcomes and are classified as [`ErrorSeverity::Recoverable`]
//! - **Programmer misuse**: malformed paths, unknown ability keys, dangling
//!   content references fail fast with [`ErrorSeverity::Validation`] or worse

/// Severity level of an error, used for categorization and recovery strategies.
///
/// Errors are classified by their recoverability and expected handling:
/// - **Recoverable**: Policy rejections that may succeed on a later attempt
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors indicating corrupted engine state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the caller may try again on a later input.
    ///
    /// Examples: ability on cooldown, insufficient mana
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: ability not granted, malformed tag path
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - engine state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all gameplay-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
