//! Core error types for VERDICT.GATE.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Unknown decision name
    UnknownDecision {
        /// The name that failed to parse
        name: String,
    },

    /// Unknown effect name
    UnknownEffect {
        /// The name that failed to parse
        name: String,
    },

    /// Unknown combining algorithm name
    UnknownAlgorithm {
        /// The name that failed to parse
        name: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Why validation failed
        reason: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDecision { name } => write!(f, "Unknown decision: {}", name),
            Self::UnknownEffect { name } => write!(f, "Unknown effect: {}", name),
            Self::UnknownAlgorithm { name } => {
                write!(f, "Unknown combining algorithm: {}", name)
            }
            Self::Validation { field, reason } => {
                write!(f, "Validation failed for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for CoreError {}
