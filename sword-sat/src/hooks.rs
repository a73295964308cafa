//! Extension points consulted by the search loop.
//!
//! The engine knows nothing about what an external propagator reasons about.
//! It hands it a read-only [`AssignmentView`] and accepts clauses back:
//! reason clauses for forced literals and conflict clauses. Every returned
//! clause is stored permanently, so it must be a consequence of the
//! constraints the propagator stands for.

use sword_core::{LBool, Lit, Var};

/// Read-only view of the current partial assignment.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentView<'a> {
    assigns: &'a [LBool],
    levels: &'a [u32],
    decision_level: u32,
}

impl<'a> AssignmentView<'a> {
    /// View over per-variable values and levels, indexed by variable.
    #[must_use]
    pub fn new(assigns: &'a [LBool], levels: &'a [u32], decision_level: u32) -> Self {
        Self {
            assigns,
            levels,
            decision_level,
        }
    }

    /// Value of `lit`; `Undef` for variables the engine does not know.
    #[must_use]
    pub fn value(&self, lit: Lit) -> LBool {
        self.assigns
            .get(lit.var().index())
            .map_or(LBool::Undef, |v| v.under(lit))
    }

    /// Decision level at which `var` was assigned, `None` while unassigned.
    #[must_use]
    pub fn level(&self, var: Var) -> Option<u32> {
        match self.assigns.get(var.index()) {
            Some(v) if !v.is_undef() => Some(self.levels[var.index()]),
            _ => None,
        }
    }

    /// Current decision level.
    #[must_use]
    pub fn decision_level(&self) -> u32 {
        self.decision_level
    }

    /// Number of variables known to the engine.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.assigns.len()
    }
}

/// Answer of an external decision hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No opinion, the engine picks.
    Abstain,
    /// Branch on this literal; it must be unassigned.
    Branch(Lit),
    /// Stop the search. `solve` reports `Unknown`.
    Abort,
}

/// Answer of an external propagation hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propagation {
    /// Nothing new.
    Idle,
    /// Forced literals, each as a clause `[lit, ¬r1, ¬r2, ...]` whose
    /// first literal is the one forced and whose others are all false.
    Implied(Vec<Vec<Lit>>),
    /// A clause whose literals are all false.
    Conflict(Vec<Lit>),
    /// Stop the search. `solve` reports `Unknown`.
    Abort,
}

/// Callbacks the search loop makes into external reasoning.
pub trait ExternalHooks {
    /// Called before each engine decision.
    fn decide(&mut self, view: &AssignmentView<'_>) -> Decision {
        let _ = view;
        Decision::Abstain
    }

    /// Called whenever unit propagation reaches a fixpoint without conflict.
    fn propagate(&mut self, view: &AssignmentView<'_>) -> Propagation {
        let _ = view;
        Propagation::Idle
    }
}

/// Hooks that never intervene.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl ExternalHooks for NoHooks {}
