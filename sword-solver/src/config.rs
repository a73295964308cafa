//! Solver configuration.

use serde::{Deserialize, Serialize};
use sword_bv::BlastConfig;
use sword_sat::SatConfig;

/// Configuration of a [`Solver`](crate::Solver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Boolean search parameters.
    pub sat: SatConfig,
    /// Put operands of commutative operators in canonical order before
    /// looking for an existing encoding.
    pub canonical_commutative: bool,
    /// Check that literals cited by modules in conflicts and reasons are
    /// declared and currently true. Declaration of decided and inferred
    /// literals is always checked.
    pub check_module_reasons: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::checked()
    }
}

impl SolverConfig {
    /// All module checks on (default).
    #[must_use]
    pub fn checked() -> Self {
        Self {
            sat: SatConfig::default(),
            canonical_commutative: true,
            check_module_reasons: true,
        }
    }

    /// Trusts module reasons and restarts more eagerly.
    /// Best for well-tested modules on large instances.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            sat: SatConfig {
                restart_base: 50,
                ..SatConfig::default()
            },
            canonical_commutative: true,
            check_module_reasons: false,
        }
    }

    /// Encoder part of the configuration.
    #[must_use]
    pub fn blast_config(&self) -> BlastConfig {
        BlastConfig {
            canonical_commutative: self.canonical_commutative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(SolverConfig::default(), SolverConfig::checked());
        assert!(!SolverConfig::fast().check_module_reasons);
        assert!(SolverConfig::fast().blast_config().canonical_commutative);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = SolverConfig::fast();
        let json = serde_json::to_string(&config).unwrap();
        let back: SolverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
