//! The six decision-combining algorithms.
//!
//! Each algorithm consumes an iterator of child decisions. Five of them drain
//! the iterator completely: every child is evaluated exactly once and the
//! observed set of decisions is then classified. `FirstApplicable` is the one
//! semantically lazy algorithm: it stops consuming at the first child whose
//! decision is not NotApplicable, so with a lazily-evaluating iterator the
//! remaining children are never evaluated at all.

use verdict_core::{CombiningAlgorithm, Decision};

/// Combine child decisions under the given algorithm.
///
/// Returns `None` for [`CombiningAlgorithm::Unrecognized`]; the caller
/// resolves that to its configured fallback decision and reports the
/// configuration fault.
#[must_use]
pub fn combine(
    algorithm: CombiningAlgorithm,
    children: impl IntoIterator<Item = Decision>,
) -> Option<Decision> {
    match algorithm {
        CombiningAlgorithm::DenyOverrides => Some(deny_overrides(children)),
        CombiningAlgorithm::PermitOverrides => Some(permit_overrides(children)),
        CombiningAlgorithm::DenyUnlessPermit => Some(deny_unless_permit(children)),
        CombiningAlgorithm::PermitUnlessDeny => Some(permit_unless_deny(children)),
        CombiningAlgorithm::FirstApplicable => Some(first_applicable(children)),
        CombiningAlgorithm::OnlyOneApplicable => Some(only_one_applicable(children)),
        CombiningAlgorithm::Unrecognized => None,
    }
}

/// Deny if any child denies; else Indeterminate if any child is
/// Indeterminate; else Permit if any child permits; else NotApplicable.
#[must_use]
pub fn deny_overrides(children: impl IntoIterator<Item = Decision>) -> Decision {
    let mut indeterminate = false;
    let mut permit = false;
    let mut deny = false;
    for decision in children {
        match decision {
            Decision::Deny => deny = true,
            Decision::Indeterminate => indeterminate = true,
            Decision::Permit => permit = true,
            Decision::NotApplicable => {}
        }
    }
    if deny {
        Decision::Deny
    } else if indeterminate {
        Decision::Indeterminate
    } else if permit {
        Decision::Permit
    } else {
        Decision::NotApplicable
    }
}

/// Permit if any child permits; else Indeterminate if any child is
/// Indeterminate; else Deny if any child denies; else NotApplicable.
#[must_use]
pub fn permit_overrides(children: impl IntoIterator<Item = Decision>) -> Decision {
    let mut indeterminate = false;
    let mut permit = false;
    let mut deny = false;
    for decision in children {
        match decision {
            Decision::Permit => permit = true,
            Decision::Indeterminate => indeterminate = true,
            Decision::Deny => deny = true,
            Decision::NotApplicable => {}
        }
    }
    if permit {
        Decision::Permit
    } else if indeterminate {
        Decision::Indeterminate
    } else if deny {
        Decision::Deny
    } else {
        Decision::NotApplicable
    }
}

/// Permit if any child permits; else Deny. Total: never NotApplicable or
/// Indeterminate, including for an empty child list.
#[must_use]
pub fn deny_unless_permit(children: impl IntoIterator<Item = Decision>) -> Decision {
    let mut permit = false;
    for decision in children {
        if decision.is_permit() {
            permit = true;
        }
    }
    if permit { Decision::Permit } else { Decision::Deny }
}

/// Deny if any child denies; else Permit. Total like [`deny_unless_permit`].
#[must_use]
pub fn permit_unless_deny(children: impl IntoIterator<Item = Decision>) -> Decision {
    let mut deny = false;
    for decision in children {
        if decision.is_deny() {
            deny = true;
        }
    }
    if deny { Decision::Deny } else { Decision::Permit }
}

/// The first child decision that is not NotApplicable, including
/// Indeterminate; NotApplicable when no child applies or the list is empty.
///
/// Stops consuming the iterator at the first applicable decision, so
/// children after it are never evaluated.
#[must_use]
pub fn first_applicable(children: impl IntoIterator<Item = Decision>) -> Decision {
    for decision in children {
        if decision.is_applicable() {
            return decision;
        }
    }
    Decision::NotApplicable
}

/// NotApplicable when no child applies; the child's decision when exactly one
/// applies; Indeterminate when more than one applies.
///
/// A lone applicable Indeterminate child yields Indeterminate through the
/// exactly-one arm, so any Indeterminate among the applicable children makes
/// the result Indeterminate.
#[must_use]
pub fn only_one_applicable(children: impl IntoIterator<Item = Decision>) -> Decision {
    let mut first: Option<Decision> = None;
    let mut several = false;
    for decision in children {
        if decision.is_applicable() {
            if first.is_some() {
                several = true;
            } else {
                first = Some(decision);
            }
        }
    }
    if several {
        return Decision::Indeterminate;
    }
    match first {
        Some(decision) => decision,
        None => Decision::NotApplicable,
    }
}
