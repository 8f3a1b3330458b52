//! Decision, effect, and combining algorithm types.
//!
//! `Decision` is the four-valued outcome of evaluating a rule, policy, or
//! policy set. `Effect` is the two-valued outcome a rule declares; the other
//! two decision values are always computed, never declared.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four-valued authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// The request is allowed
    Permit,
    /// The request is refused
    Deny,
    /// No policy element applied to the request
    NotApplicable,
    /// No definitive decision could be rendered
    Indeterminate,
}

impl Decision {
    /// Whether this decision is Permit
    #[must_use]
    pub const fn is_permit(self) -> bool {
        matches!(self, Self::Permit)
    }

    /// Whether this decision is Deny
    #[must_use]
    pub const fn is_deny(self) -> bool {
        matches!(self, Self::Deny)
    }

    /// Whether this decision is anything other than NotApplicable
    #[must_use]
    pub const fn is_applicable(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permit => write!(f, "Permit"),
            Self::Deny => write!(f, "Deny"),
            Self::NotApplicable => write!(f, "NotApplicable"),
            Self::Indeterminate => write!(f, "Indeterminate"),
        }
    }
}

impl FromStr for Decision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Permit" => Ok(Self::Permit),
            "Deny" => Ok(Self::Deny),
            "NotApplicable" => Ok(Self::NotApplicable),
            "Indeterminate" => Ok(Self::Indeterminate),
            _ => Err(CoreError::UnknownDecision {
                name: s.to_string(),
            }),
        }
    }
}

/// The outcome a rule declares for when it applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// The rule grants the request when it applies
    Permit,
    /// The rule refuses the request when it applies
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permit => write!(f, "Permit"),
            Self::Deny => write!(f, "Deny"),
        }
    }
}

impl FromStr for Effect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Permit" => Ok(Self::Permit),
            "Deny" => Ok(Self::Deny),
            _ => Err(CoreError::UnknownEffect {
                name: s.to_string(),
            }),
        }
    }
}

impl From<Effect> for Decision {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Permit => Self::Permit,
            Effect::Deny => Self::Deny,
        }
    }
}

/// Algorithm for merging child decisions into one parent decision.
///
/// Policy documents are loaded from untrusted configuration, so an unknown
/// algorithm name deserializes to `Unrecognized` instead of failing the whole
/// document. Evaluation resolves `Unrecognized` to a configured fallback
/// decision and reports it as a configuration fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CombiningAlgorithm {
    /// Deny if any child denies, else Indeterminate, else Permit, else NotApplicable
    DenyOverrides,
    /// Permit if any child permits, else Indeterminate, else Deny, else NotApplicable
    PermitOverrides,
    /// Permit if any child permits, else Deny
    DenyUnlessPermit,
    /// Deny if any child denies, else Permit
    PermitUnlessDeny,
    /// The first child decision that is not NotApplicable
    FirstApplicable,
    /// The one applicable child decision; Indeterminate if several apply
    OnlyOneApplicable,
    /// Configuration fault marker for an unknown algorithm name
    Unrecognized,
}

// Hand-written so an unknown name maps to Unrecognized instead of rejecting
// the document it appears in.
impl<'de> Deserialize<'de> for CombiningAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or(Self::Unrecognized))
    }
}

impl CombiningAlgorithm {
    /// The six recognized algorithms, in documentation order
    pub const RECOGNIZED: [Self; 6] = [
        Self::DenyOverrides,
        Self::PermitOverrides,
        Self::DenyUnlessPermit,
        Self::PermitUnlessDeny,
        Self::FirstApplicable,
        Self::OnlyOneApplicable,
    ];

    /// Whether this is one of the six recognized algorithms
    #[must_use]
    pub const fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

impl fmt::Display for CombiningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DenyOverrides => write!(f, "DenyOverrides"),
            Self::PermitOverrides => write!(f, "PermitOverrides"),
            Self::DenyUnlessPermit => write!(f, "DenyUnlessPermit"),
            Self::PermitUnlessDeny => write!(f, "PermitUnlessDeny"),
            Self::FirstApplicable => write!(f, "FirstApplicable"),
            Self::OnlyOneApplicable => write!(f, "OnlyOneApplicable"),
            Self::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

impl FromStr for CombiningAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DenyOverrides" => Ok(Self::DenyOverrides),
            "PermitOverrides" => Ok(Self::PermitOverrides),
            "DenyUnlessPermit" => Ok(Self::DenyUnlessPermit),
            "PermitUnlessDeny" => Ok(Self::PermitUnlessDeny),
            "FirstApplicable" => Ok(Self::FirstApplicable),
            "OnlyOneApplicable" => Ok(Self::OnlyOneApplicable),
            _ => Err(CoreError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}
