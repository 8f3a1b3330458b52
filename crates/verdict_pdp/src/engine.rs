//! The decision engine: target matching, rule evaluation, and orchestration.
//!
//! Evaluation is a pure, synchronous recursive tree walk. Each request owns
//! its context and diagnostics; the engine holds no per-request state, so one
//! engine value can serve concurrent requests over immutable policy trees.

use crate::bridge::{ExpressionBridge, SubstitutionError};
use crate::combine;
use crate::config::PdpConfig;
use crate::policy::{Policy, PolicySet, Rule};
use crate::repository::PolicyRepository;
use crate::target::{AllOf, Target, TargetMatch};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use verdict_core::{Decision, RequestContext, RequestId};

/// Identifier of the implicit root policy set wrapped around the
/// repository's results.
const ROOT_ID: &str = "root";

/// Status qualifying a rendered decision.
///
/// Distinguishes an Indeterminate caused by missing attributes from other
/// Indeterminate causes, so an enforcement point can refine its request and
/// resubmit. Definite decisions always carry `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionStatus {
    /// The decision was rendered without faults
    Ok,
    /// Indeterminate because one or more attributes were missing
    MissingAttribute,
    /// Indeterminate because an expression faulted
    EvaluationFault,
    /// The decision is the configured fallback for an unrecognized
    /// combining algorithm
    ConfigurationFault,
}

/// A rendered decision with diagnostic enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    /// Identifier of this evaluation, for log correlation
    pub request_id: RequestId,
    /// The decision
    pub decision: Decision,
    /// Qualifying status
    pub status: DecisionStatus,
    /// Designators that could not be resolved, as `category.id`
    pub missing_attributes: Vec<String>,
}

/// Per-evaluation fault bookkeeping. Owned by a single request; never
/// shared across evaluations.
#[derive(Debug, Default)]
struct Diagnostics {
    missing_attributes: Vec<String>,
    evaluation_faults: Vec<String>,
    configuration_faults: Vec<String>,
}

impl Diagnostics {
    fn record_missing(&mut self, attributes: Vec<String>) {
        for attribute in attributes {
            if !self.missing_attributes.contains(&attribute) {
                self.missing_attributes.push(attribute);
            }
        }
    }
}

/// Three-valued outcome of one expression or conjunctive group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tri {
    True,
    False,
    Indeterminate,
}

/// A policy set's child, policies before nested sets
enum Node<'a> {
    Policy(&'a Policy),
    Set(&'a PolicySet),
}

/// The policy decision point.
///
/// Stateless apart from its configuration: any instance, shared or not,
/// renders identical decisions for identical inputs.
#[derive(Debug, Clone)]
pub struct DecisionEngine<R, B> {
    repository: R,
    bridge: B,
    config: PdpConfig,
}

impl<R: PolicyRepository> DecisionEngine<R, crate::bridge::DesignatorBridge> {
    /// Engine over the given repository with the standard designator bridge
    /// and default configuration
    #[must_use]
    pub fn with_defaults(repository: R) -> Self {
        Self::new(
            repository,
            crate::bridge::DesignatorBridge::new(),
            PdpConfig::default(),
        )
    }
}

impl<R: PolicyRepository, B: ExpressionBridge> DecisionEngine<R, B> {
    /// Create an engine
    #[must_use]
    pub fn new(repository: R, bridge: B, config: PdpConfig) -> Self {
        Self {
            repository,
            bridge,
            config,
        }
    }

    /// The engine's configuration
    #[must_use]
    pub fn config(&self) -> &PdpConfig {
        &self.config
    }

    /// Render a decision for a request context.
    ///
    /// Fetches the applicable policies and policy sets, wraps them as the
    /// children of an implicit targetless root policy set under the
    /// configured root algorithm, and evaluates it. A single pass; always
    /// terminates with one of the four decisions.
    pub fn evaluate(&self, context: &RequestContext) -> DecisionResponse {
        let request_id = RequestId::new();
        let mut diagnostics = Diagnostics::default();

        let root = PolicySet {
            id: ROOT_ID.to_string(),
            combining_algorithm: self.config.root_algorithm,
            target: None,
            policies: self.repository.policies_for(context),
            policy_sets: self.repository.policy_sets_for(context),
        };
        if self.config.debug {
            debug!(
                request = %request_id,
                policies = root.policies.len(),
                policy_sets = root.policy_sets.len(),
                algorithm = %root.combining_algorithm,
                "evaluating decision request"
            );
        }

        let decision = self.policy_set_decision(&root, context, &mut diagnostics);
        let status = Self::status_of(decision, &diagnostics);
        if self.config.debug {
            debug!(
                request = %request_id,
                decision = %decision,
                status = ?status,
                "decision rendered"
            );
        }

        DecisionResponse {
            request_id,
            decision,
            status,
            missing_attributes: diagnostics.missing_attributes,
        }
    }

    /// Evaluate a single policy set against a context
    #[must_use]
    pub fn evaluate_policy_set(&self, set: &PolicySet, context: &RequestContext) -> Decision {
        self.policy_set_decision(set, context, &mut Diagnostics::default())
    }

    /// Evaluate a single policy against a context
    #[must_use]
    pub fn evaluate_policy(&self, policy: &Policy, context: &RequestContext) -> Decision {
        self.policy_decision(policy, context, &mut Diagnostics::default())
    }

    /// Evaluate a single rule against a context
    #[must_use]
    pub fn evaluate_rule(&self, rule: &Rule, context: &RequestContext) -> Decision {
        self.rule_decision(rule, context, &mut Diagnostics::default())
    }

    /// Match a target against a context. An absent or empty target matches.
    #[must_use]
    pub fn match_target(
        &self,
        target: Option<&Target>,
        context: &RequestContext,
    ) -> TargetMatch {
        self.target_match(target, context, &mut Diagnostics::default())
    }

    fn status_of(decision: Decision, diagnostics: &Diagnostics) -> DecisionStatus {
        if decision != Decision::Indeterminate {
            return DecisionStatus::Ok;
        }
        if !diagnostics.missing_attributes.is_empty() {
            DecisionStatus::MissingAttribute
        } else if !diagnostics.evaluation_faults.is_empty() {
            DecisionStatus::EvaluationFault
        } else if !diagnostics.configuration_faults.is_empty() {
            DecisionStatus::ConfigurationFault
        } else {
            DecisionStatus::Ok
        }
    }

    fn policy_set_decision(
        &self,
        set: &PolicySet,
        context: &RequestContext,
        diagnostics: &mut Diagnostics,
    ) -> Decision {
        let decision = match self.target_match(set.target.as_ref(), context, diagnostics) {
            TargetMatch::Indeterminate => Decision::Indeterminate,
            TargetMatch::NotMatched => Decision::NotApplicable,
            TargetMatch::Matched => {
                let children = set
                    .policies
                    .iter()
                    .map(Node::Policy)
                    .chain(set.policy_sets.iter().map(Node::Set));
                let decisions = children.map(|child| match child {
                    Node::Policy(policy) => self.policy_decision(policy, context, diagnostics),
                    Node::Set(nested) => self.policy_set_decision(nested, context, diagnostics),
                });
                match combine::combine(set.combining_algorithm, decisions) {
                    Some(decision) => decision,
                    None => self.configuration_fault(&set.id, diagnostics),
                }
            }
        };
        if self.config.debug {
            debug!(policy_set = %set.id, decision = %decision, "policy set evaluated");
        }
        decision
    }

    fn policy_decision(
        &self,
        policy: &Policy,
        context: &RequestContext,
        diagnostics: &mut Diagnostics,
    ) -> Decision {
        let decision = match self.target_match(policy.target.as_ref(), context, diagnostics) {
            TargetMatch::Indeterminate => Decision::Indeterminate,
            TargetMatch::NotMatched => Decision::NotApplicable,
            TargetMatch::Matched => {
                let decisions = policy
                    .rules
                    .iter()
                    .map(|rule| self.rule_decision(rule, context, diagnostics));
                match combine::combine(policy.combining_algorithm, decisions) {
                    Some(decision) => decision,
                    None => self.configuration_fault(&policy.id, diagnostics),
                }
            }
        };
        if self.config.debug {
            debug!(policy = %policy.id, decision = %decision, "policy evaluated");
        }
        decision
    }

    fn rule_decision(
        &self,
        rule: &Rule,
        context: &RequestContext,
        diagnostics: &mut Diagnostics,
    ) -> Decision {
        let decision = match self.target_match(rule.target.as_ref(), context, diagnostics) {
            TargetMatch::Indeterminate => Decision::Indeterminate,
            TargetMatch::NotMatched => Decision::NotApplicable,
            TargetMatch::Matched => match self.condition_outcome(rule, context, diagnostics) {
                Tri::True => rule.effect.into(),
                Tri::False => Decision::NotApplicable,
                Tri::Indeterminate => Decision::Indeterminate,
            },
        };
        if self.config.debug {
            debug!(rule = %rule.id, decision = %decision, "rule evaluated");
        }
        decision
    }

    /// No condition evaluates as true; otherwise the condition grounds and
    /// evaluates like any match expression.
    fn condition_outcome(
        &self,
        rule: &Rule,
        context: &RequestContext,
        diagnostics: &mut Diagnostics,
    ) -> Tri {
        match &rule.condition {
            None => Tri::True,
            Some(condition) => self.expression_outcome(condition, context, diagnostics),
        }
    }

    fn target_match(
        &self,
        target: Option<&Target>,
        context: &RequestContext,
        diagnostics: &mut Diagnostics,
    ) -> TargetMatch {
        let Some(target) = target else {
            return TargetMatch::Matched;
        };
        if target.is_empty() {
            return TargetMatch::Matched;
        }

        // Every group is evaluated, even once a match is already certain.
        let outcomes: Vec<Tri> = target
            .any_of
            .iter()
            .map(|group| self.all_of_outcome(group, context, diagnostics))
            .collect();

        // Only an all-false target fails outright; false does not dominate
        // a mix of false and Indeterminate groups.
        if outcomes.iter().all(|outcome| *outcome == Tri::False) {
            return TargetMatch::NotMatched;
        }

        if self.config.strict_target_match {
            if outcomes.contains(&Tri::True) {
                TargetMatch::Matched
            } else {
                TargetMatch::Indeterminate
            }
        } else {
            // Legacy fold: any true wins, otherwise the last group's outcome
            // stands, even when an earlier group was Indeterminate.
            let mut acc = Tri::Indeterminate;
            for outcome in outcomes {
                if acc == Tri::True || outcome == Tri::True {
                    acc = Tri::True;
                } else {
                    acc = outcome;
                }
            }
            match acc {
                Tri::True => TargetMatch::Matched,
                Tri::False => TargetMatch::NotMatched,
                Tri::Indeterminate => TargetMatch::Indeterminate,
            }
        }
    }

    /// A conjunctive group: left to right, stopping at the first expression
    /// that fails to hold or faults.
    fn all_of_outcome(
        &self,
        group: &AllOf,
        context: &RequestContext,
        diagnostics: &mut Diagnostics,
    ) -> Tri {
        let mut acc = Tri::True;
        for expression in &group.expressions {
            if acc != Tri::True {
                break;
            }
            acc = self.expression_outcome(expression, context, diagnostics);
        }
        acc
    }

    fn expression_outcome(
        &self,
        template: &str,
        context: &RequestContext,
        diagnostics: &mut Diagnostics,
    ) -> Tri {
        let ground = match self.bridge.substitute(template, context) {
            Ok(ground) => ground,
            Err(SubstitutionError::MissingAttribute { attributes }) => {
                if self.config.debug {
                    debug!(expression = template, missing = ?attributes, "substitution failed");
                }
                diagnostics.record_missing(attributes);
                return Tri::Indeterminate;
            }
            Err(fault @ SubstitutionError::MalformedDesignator { .. }) => {
                if self.config.debug {
                    debug!(expression = template, fault = %fault, "substitution failed");
                }
                diagnostics.evaluation_faults.push(fault.to_string());
                return Tri::Indeterminate;
            }
        };

        match verdict_expr::evaluate(&ground) {
            // Only a definite true or false comes out of a condition; any
            // other value is coerced to its truthiness.
            Ok(value) => {
                if value.is_truthy() {
                    Tri::True
                } else {
                    Tri::False
                }
            }
            Err(fault) => {
                if self.config.debug {
                    debug!(expression = template, ground = %ground, fault = %fault, "evaluation failed");
                }
                diagnostics.evaluation_faults.push(fault.to_string());
                Tri::Indeterminate
            }
        }
    }

    fn configuration_fault(&self, node_id: &str, diagnostics: &mut Diagnostics) -> Decision {
        warn!(
            node = node_id,
            fallback = %self.config.fallback_decision,
            "unrecognized combining algorithm; using fallback decision"
        );
        diagnostics.configuration_faults.push(node_id.to_string());
        self.config.fallback_decision
    }
}
