//! Rules, policies, and policy sets.
//!
//! These are loaded by the repository per request (or cached) and are
//! immutable for the duration of an evaluation; the engine never mutates
//! them. A policy set forms a tree; acyclicity is the repository's
//! responsibility and the engine assumes it.

use crate::target::Target;
use serde::{Deserialize, Serialize};
use verdict_core::{CombiningAlgorithm, Effect};

/// A single rule: the smallest element that can contribute a decision.
///
/// The declared effect is two-valued by construction; NotApplicable and
/// Indeterminate are computed outcomes only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier, chosen by the policy author
    pub id: String,
    /// Outcome the rule contributes when it applies
    pub effect: Effect,
    /// Applicability filter; absent means the rule always applies
    #[serde(default)]
    pub target: Option<Target>,
    /// Condition expression template; absent evaluates as true
    #[serde(default)]
    pub condition: Option<String>,
}

impl Rule {
    /// Create a rule with no target and no condition
    #[must_use]
    pub fn new(id: &str, effect: Effect) -> Self {
        Self {
            id: id.to_string(),
            effect,
            target: None,
            condition: None,
        }
    }

    /// Set the target
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the condition expression template
    #[must_use]
    pub fn with_condition(mut self, condition: &str) -> Self {
        self.condition = Some(condition.to_string());
        self
    }
}

/// An ordered collection of rules under one combining algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy identifier
    pub id: String,
    /// Algorithm merging the rules' decisions
    pub combining_algorithm: CombiningAlgorithm,
    /// Applicability filter; absent means the policy always applies
    #[serde(default)]
    pub target: Option<Target>,
    /// Rules in evaluation order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Policy {
    /// Create a policy with no target and no rules
    #[must_use]
    pub fn new(id: &str, combining_algorithm: CombiningAlgorithm) -> Self {
        Self {
            id: id.to_string(),
            combining_algorithm,
            target: None,
            rules: Vec::new(),
        }
    }

    /// Set the target
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Append a rule
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// An ordered collection of policies and nested policy sets under one
/// combining algorithm. Children evaluate policies first, then nested sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    /// Policy set identifier
    pub id: String,
    /// Algorithm merging the children's decisions
    pub combining_algorithm: CombiningAlgorithm,
    /// Applicability filter; absent means the set always applies
    #[serde(default)]
    pub target: Option<Target>,
    /// Member policies in evaluation order
    #[serde(default)]
    pub policies: Vec<Policy>,
    /// Nested policy sets, evaluated after the policies
    #[serde(default)]
    pub policy_sets: Vec<PolicySet>,
}

impl PolicySet {
    /// Create a policy set with no target and no children
    #[must_use]
    pub fn new(id: &str, combining_algorithm: CombiningAlgorithm) -> Self {
        Self {
            id: id.to_string(),
            combining_algorithm,
            target: None,
            policies: Vec::new(),
            policy_sets: Vec::new(),
        }
    }

    /// Set the target
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Append a member policy
    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Append a nested policy set
    #[must_use]
    pub fn with_policy_set(mut self, policy_set: PolicySet) -> Self {
        self.policy_sets.push(policy_set);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_builder() {
        let rule = Rule::new("r1", Effect::Permit)
            .with_target(Target::matching("true"))
            .with_condition("1 < 2");
        assert_eq!(rule.id, "r1");
        assert_eq!(rule.effect, Effect::Permit);
        assert!(rule.target.is_some());
        assert_eq!(rule.condition.as_deref(), Some("1 < 2"));
    }

    #[test]
    fn test_policy_builder() {
        let policy = Policy::new("p1", CombiningAlgorithm::DenyOverrides)
            .with_rule(Rule::new("r1", Effect::Deny))
            .with_rule(Rule::new("r2", Effect::Permit));
        assert_eq!(policy.rules.len(), 2);
        assert_eq!(policy.rules[0].id, "r1");
    }

    #[test]
    fn test_policy_set_nesting() {
        let set = PolicySet::new("ps1", CombiningAlgorithm::FirstApplicable)
            .with_policy(Policy::new("p1", CombiningAlgorithm::DenyOverrides))
            .with_policy_set(PolicySet::new("ps2", CombiningAlgorithm::PermitOverrides));
        assert_eq!(set.policies.len(), 1);
        assert_eq!(set.policy_sets.len(), 1);
    }

    #[test]
    fn test_policy_document_deserializes() {
        let json = r#"{
            "id": "records",
            "combining_algorithm": "DenyOverrides",
            "target": [["$resource.kind == \"record\""]],
            "rules": [
                {"id": "allow-doctors", "effect": "Permit",
                 "condition": "$subject.role == \"doctor\""},
                {"id": "deny-default", "effect": "Deny"}
            ]
        }"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.id, "records");
        assert_eq!(
            policy.combining_algorithm,
            CombiningAlgorithm::DenyOverrides
        );
        assert_eq!(policy.rules.len(), 2);
        assert_eq!(policy.rules[1].condition, None);
    }

    #[test]
    fn test_unknown_algorithm_still_loads() {
        let json = r#"{"id": "p", "combining_algorithm": "WeirdAlgorithm"}"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(
            policy.combining_algorithm,
            CombiningAlgorithm::Unrecognized
        );
    }

    #[test]
    fn test_policy_serde_roundtrip() {
        let set = PolicySet::new("root", CombiningAlgorithm::OnlyOneApplicable)
            .with_policy(
                Policy::new("p1", CombiningAlgorithm::PermitUnlessDeny)
                    .with_rule(Rule::new("r1", Effect::Deny).with_condition("false")),
            );
        let json = serde_json::to_string(&set).unwrap();
        let deserialized: PolicySet = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, set);
    }
}
