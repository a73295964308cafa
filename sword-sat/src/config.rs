//! Search parameters.

use serde::{Deserialize, Serialize};

/// Tunables of the CDCL search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatConfig {
    /// Conflicts before the first restart; scaled by the Luby sequence.
    pub restart_base: u64,
    /// VSIDS activity decay factor in `(0, 1)`.
    pub var_decay: f64,
    /// Polarity tried first for variables never assigned before.
    pub default_phase: bool,
    /// Scale restart intervals by the Luby sequence. When off, restarts
    /// happen every `restart_base` conflicts.
    pub luby_restarts: bool,
}

impl Default for SatConfig {
    fn default() -> Self {
        Self {
            restart_base: 100,
            var_decay: 0.95,
            default_phase: false,
            luby_restarts: true,
        }
    }
}

impl SatConfig {
    /// Restart interval for the `restarts`-th restart.
    #[must_use]
    pub fn restart_interval(&self, restarts: u64) -> u64 {
        if self.luby_restarts {
            (luby(2.0, restarts) * self.restart_base as f64) as u64
        } else {
            self.restart_base
        }
    }
}

/// The Luby sequence `1 1 2 1 1 2 4 ...` raised to base `y`.
#[must_use]
pub fn luby(y: f64, mut x: u64) -> f64 {
    let mut size = 1u64;
    let mut seq = 0i32;
    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != x {
        size = (size - 1) >> 1;
        seq -= 1;
        x %= size;
    }
    y.powi(seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luby_prefix() {
        let seq: Vec<u64> = (0..15).map(|i| luby(2.0, i) as u64).collect();
        assert_eq!(seq, vec![1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8]);
    }

    #[test]
    fn test_fixed_interval() {
        let config = SatConfig {
            luby_restarts: false,
            ..SatConfig::default()
        };
        assert_eq!(config.restart_interval(7), 100);
        assert_eq!(SatConfig::default().restart_interval(6), 400);
    }
}
