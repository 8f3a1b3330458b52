//! Policy retrieval.
//!
//! The repository supplies the engine its input trees. It is infallible by
//! contract: a backend that cannot resolve its store must surface an empty
//! result and report the fault out of band, never throw into the engine.

use crate::policy::{Policy, PolicySet};
use verdict_core::RequestContext;

/// Source of the policies and policy sets applicable to a request
pub trait PolicyRepository {
    /// Policies applicable to the given context, in evaluation order
    fn policies_for(&self, context: &RequestContext) -> Vec<Policy>;

    /// Policy sets applicable to the given context, in evaluation order
    fn policy_sets_for(&self, context: &RequestContext) -> Vec<PolicySet>;
}

/// A repository over fixed in-memory trees, returned for every request.
///
/// The unit-test vehicle, and sufficient for deployments that load their
/// whole policy store at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    policies: Vec<Policy>,
    policy_sets: Vec<PolicySet>,
}

impl InMemoryRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
            policy_sets: Vec::new(),
        }
    }

    /// Append a policy
    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Append a policy set
    #[must_use]
    pub fn with_policy_set(mut self, policy_set: PolicySet) -> Self {
        self.policy_sets.push(policy_set);
        self
    }
}

impl PolicyRepository for InMemoryRepository {
    fn policies_for(&self, _context: &RequestContext) -> Vec<Policy> {
        self.policies.clone()
    }

    fn policy_sets_for(&self, _context: &RequestContext) -> Vec<PolicySet> {
        self.policy_sets.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::CombiningAlgorithm;

    #[test]
    fn test_empty_repository() {
        let repo = InMemoryRepository::new();
        let ctx = RequestContext::new();
        assert!(repo.policies_for(&ctx).is_empty());
        assert!(repo.policy_sets_for(&ctx).is_empty());
    }

    #[test]
    fn test_repository_returns_in_insertion_order() {
        let repo = InMemoryRepository::new()
            .with_policy(Policy::new("p1", CombiningAlgorithm::DenyOverrides))
            .with_policy(Policy::new("p2", CombiningAlgorithm::FirstApplicable))
            .with_policy_set(PolicySet::new("ps1", CombiningAlgorithm::PermitOverrides));
        let ctx = RequestContext::new();
        let policies = repo.policies_for(&ctx);
        assert_eq!(policies.len(), 2);
        assert_eq!(policies[0].id, "p1");
        assert_eq!(policies[1].id, "p2");
        assert_eq!(repo.policy_sets_for(&ctx).len(), 1);
    }
}
