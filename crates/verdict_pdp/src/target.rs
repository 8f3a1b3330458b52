//! Applicability targets.
//!
//! A target is a disjunction of conjunctions: it matches when at least one of
//! its groups has every match expression evaluate true. An empty target
//! always matches. The match algorithm itself lives in the engine, since it
//! needs the expression bridge and the request context.

use serde::{Deserialize, Serialize};

/// One conjunctive group of match expressions.
///
/// Serializes as a plain array of expression strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllOf {
    /// Match expressions, all of which must hold
    pub expressions: Vec<String>,
}

impl AllOf {
    /// Create an empty group
    #[must_use]
    pub fn new() -> Self {
        Self {
            expressions: Vec::new(),
        }
    }

    /// Append a match expression
    #[must_use]
    pub fn with_expression(mut self, expression: &str) -> Self {
        self.expressions.push(expression.to_string());
        self
    }
}

/// An ordered disjunction of [`AllOf`] groups.
///
/// Serializes as an array of arrays of expression strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target {
    /// Groups, at least one of which must match
    pub any_of: Vec<AllOf>,
}

impl Target {
    /// Create an empty target, which always matches
    #[must_use]
    pub fn new() -> Self {
        Self { any_of: Vec::new() }
    }

    /// Append a group
    #[must_use]
    pub fn with_group(mut self, group: AllOf) -> Self {
        self.any_of.push(group);
        self
    }

    /// Target with a single one-expression group
    #[must_use]
    pub fn matching(expression: &str) -> Self {
        Self::new().with_group(AllOf::new().with_expression(expression))
    }

    /// Whether the target has no groups
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.any_of.is_empty()
    }
}

/// Outcome of matching a target against a request context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMatch {
    /// At least one group matched
    Matched,
    /// No group matched
    NotMatched,
    /// Matching could not be decided
    Indeterminate,
}
