//! Fewer than `k` ones among the bits of a signal.

use crate::module::{Conflict, Module, SearchContext, Setup};
use sword_core::{Lit, Result, Signal};

/// Keeps the number of true bits of a signal below `max_ones`.
///
/// Decides free bits to false. Raises a conflict over the true bits once
/// `max_ones` of them are true, and forces the remaining free bits to
/// false as soon as `max_ones - 1` are.
#[derive(Debug, Clone)]
pub struct CardinalityLessThan {
    signal: Signal,
    max_ones: usize,
    lits: Vec<Lit>,
}

impl CardinalityLessThan {
    /// Constrain the bits of `signal`.
    #[must_use]
    pub fn new(signal: Signal, max_ones: usize) -> Self {
        Self {
            signal,
            max_ones,
            lits: Vec::new(),
        }
    }

    /// The bound.
    #[must_use]
    pub fn max_ones(&self) -> usize {
        self.max_ones
    }
}

impl Module for CardinalityLessThan {
    fn name(&self) -> &str {
        "cardinality"
    }

    fn attach(&mut self, setup: &mut Setup<'_>) -> Result<()> {
        self.lits = setup.signal_to_literals(self.signal)?;
        setup.use_variables(&self.lits);
        Ok(())
    }

    fn decide(&mut self, ctx: &SearchContext<'_>) -> Option<Lit> {
        self.lits.iter().find(|&&l| ctx.is_free(l)).map(|&l| !l)
    }

    fn propagate(&mut self, ctx: &mut SearchContext<'_>) -> Option<Conflict> {
        let ones: Vec<Lit> = self
            .lits
            .iter()
            .copied()
            .filter(|&l| ctx.get_value(l).is_true())
            .collect();
        if ones.len() >= self.max_ones {
            return Some(ctx.make_conflict(&ones));
        }
        if ones.len() + 1 == self.max_ones {
            for &l in &self.lits {
                if ctx.is_free(l) {
                    ctx.infer_literal(!l, &ones);
                }
            }
        }
        None
    }
}
