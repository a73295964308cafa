//! The surface the encoder and the module bridge consume.
//!
//! [`Solver`](crate::Solver) implements both traits; other engines can be
//! substituted as long as they honour the hook protocol.

use crate::hooks::ExternalHooks;
use crate::solver::SolverResult;
use sword_core::{LBool, Lit, Var};

/// Something clauses can be written into.
pub trait ClauseSink {
    /// Allocate a fresh boolean variable.
    fn new_var(&mut self) -> Var;

    /// Add a permanent clause. Returns `false` once the clause set is
    /// known to be unsatisfiable.
    fn add_clause(&mut self, lits: &[Lit]) -> bool;
}

/// A complete boolean search engine.
pub trait BooleanEngine: ClauseSink {
    /// Number of allocated variables.
    fn num_vars(&self) -> usize;

    /// Search under `assumptions`, consulting `hooks` at every decision and
    /// propagation fixpoint. Assumptions only apply to this call.
    fn solve_with_hooks(
        &mut self,
        assumptions: &[Lit],
        hooks: &mut dyn ExternalHooks,
    ) -> SolverResult;

    /// Value of `var` in the model of the last satisfiable call.
    fn model_value(&self, var: Var) -> LBool;

    /// Current value of `lit` (level-0 facts outside of search).
    fn value(&self, lit: Lit) -> LBool;

    /// Current decision level.
    fn decision_level(&self) -> u32;
}
