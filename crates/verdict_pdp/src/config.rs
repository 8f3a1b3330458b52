//! Engine configuration.

use serde::{Deserialize, Serialize};
use verdict_core::{CombiningAlgorithm, Decision};

/// Configuration consumed by the decision engine.
///
/// The `debug` toggle gates per-node `tracing::debug!` detail and has no
/// effect on the returned decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdpConfig {
    /// Combining algorithm of the implicit root policy set
    #[serde(default = "default_root_algorithm")]
    pub root_algorithm: CombiningAlgorithm,
    /// Decision used when a node carries an unrecognized combining algorithm
    #[serde(default = "default_fallback_decision")]
    pub fallback_decision: Decision,
    /// Corrected target fold: any Indeterminate among non-true groups makes
    /// the whole target Indeterminate. Off by default for compatibility with
    /// the legacy order-dependent fold.
    #[serde(default)]
    pub strict_target_match: bool,
    /// Emit per-node evaluation detail at debug level
    #[serde(default)]
    pub debug: bool,
}

fn default_root_algorithm() -> CombiningAlgorithm {
    CombiningAlgorithm::DenyOverrides
}

fn default_fallback_decision() -> Decision {
    Decision::Indeterminate
}

impl Default for PdpConfig {
    fn default() -> Self {
        Self {
            root_algorithm: default_root_algorithm(),
            fallback_decision: default_fallback_decision(),
            strict_target_match: false,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PdpConfig::default();
        assert_eq!(config.root_algorithm, CombiningAlgorithm::DenyOverrides);
        assert_eq!(config.fallback_decision, Decision::Indeterminate);
        assert!(!config.strict_target_match);
        assert!(!config.debug);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PdpConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PdpConfig::default());
    }

    #[test]
    fn test_config_deserializes_overrides() {
        let config: PdpConfig = serde_json::from_str(
            r#"{"root_algorithm": "FirstApplicable", "fallback_decision": "Deny"}"#,
        )
        .unwrap();
        assert_eq!(config.root_algorithm, CombiningAlgorithm::FirstApplicable);
        assert_eq!(config.fallback_decision, Decision::Deny);
    }
}
