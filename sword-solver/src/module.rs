//! The propagator module interface.
//!
//! A module is external reasoning plugged into the search loop. It is
//! attached once, when it declares the boolean variables it works on, and
//! is then consulted at every decision point and every propagation
//! fixpoint while its enable literal holds.
//!
//! Modules never see the engine itself. During attachment they get a
//! [`Setup`], during search a [`SearchContext`]; both expose exactly the
//! helper surface a module needs.

use rustc_hash::FxHashSet;
use sword_bv::BitBlaster;
use sword_core::{LBool, Lit, Result, Signal, TermGraph, Var};
use sword_sat::{AssignmentView, ClauseSink};

/// A propagator plugged into the search.
pub trait Module {
    /// Name used in diagnostics and contract-violation reports.
    fn name(&self) -> &str;

    /// Called once at registration. Declare the variables the module
    /// reads and writes through [`Setup::use_variables`].
    fn attach(&mut self, setup: &mut Setup<'_>) -> Result<()>;

    /// Suggest a decision. The literal must be free and declared.
    fn decide(&mut self, ctx: &SearchContext<'_>) -> Option<Lit> {
        let _ = ctx;
        None
    }

    /// Called at every propagation fixpoint. Either force literals with
    /// [`SearchContext::infer_literal`] and return `None`, or return a
    /// conflict built with [`SearchContext::make_conflict`].
    fn propagate(&mut self, ctx: &mut SearchContext<'_>) -> Option<Conflict> {
        let _ = ctx;
        None
    }
}

/// A set of currently true literals that cannot all hold while the module
/// is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    set: Vec<Lit>,
    enable: Lit,
}

impl Conflict {
    /// The offending literals.
    #[must_use]
    pub fn literals(&self) -> &[Lit] {
        &self.set
    }

    /// Clause form: `¬enable ∨ ¬l1 ∨ ... ∨ ¬ln`.
    #[must_use]
    pub fn clause(&self) -> Vec<Lit> {
        let mut clause: Vec<Lit> = self.set.iter().map(|&l| !l).collect();
        clause.push(!self.enable);
        clause
    }
}

/// Helper surface available while a module is attached.
pub struct Setup<'a> {
    graph: &'a TermGraph,
    blaster: &'a mut BitBlaster,
    sink: &'a mut dyn ClauseSink,
    declared: &'a mut FxHashSet<Var>,
    enable: Lit,
}

impl<'a> Setup<'a> {
    pub(crate) fn new(
        graph: &'a TermGraph,
        blaster: &'a mut BitBlaster,
        sink: &'a mut dyn ClauseSink,
        declared: &'a mut FxHashSet<Var>,
        enable: Lit,
    ) -> Self {
        Self {
            graph,
            blaster,
            sink,
            declared,
            enable,
        }
    }

    /// The bits of `signal`, least significant first. Encodes the signal
    /// if nothing has asked for it yet.
    pub fn signal_to_literals(&mut self, signal: Signal) -> Result<Vec<Lit>> {
        Ok(self
            .blaster
            .encode(self.graph, signal, &mut *self.sink)?
            .to_vec())
    }

    /// Declare interest in the variables of `lits`.
    pub fn use_variables(&mut self, lits: &[Lit]) {
        self.declared.extend(lits.iter().map(|l| l.var()));
    }

    /// The literal gating this module.
    #[must_use]
    pub fn enable_literal(&self) -> Lit {
        self.enable
    }
}

/// Helper surface available during search.
pub struct SearchContext<'a> {
    view: AssignmentView<'a>,
    declared: &'a FxHashSet<Var>,
    enable: Lit,
    inferred: Vec<(Lit, Vec<Lit>)>,
}

impl<'a> SearchContext<'a> {
    pub(crate) fn new(view: AssignmentView<'a>, declared: &'a FxHashSet<Var>, enable: Lit) -> Self {
        Self {
            view,
            declared,
            enable,
            inferred: Vec::new(),
        }
    }

    /// Current value of `lit`.
    #[must_use]
    pub fn get_value(&self, lit: Lit) -> LBool {
        self.view.value(lit)
    }

    /// Whether `lit` is unassigned.
    #[must_use]
    pub fn is_free(&self, lit: Lit) -> bool {
        self.get_value(lit).is_undef()
    }

    /// Whether `lit` is assigned, either way.
    #[must_use]
    pub fn is_set(&self, lit: Lit) -> bool {
        !self.is_free(lit)
    }

    /// Whether the module's enable literal currently holds.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.get_value(self.enable).is_true()
    }

    /// Whether the variable of `lit` was declared by the module.
    #[must_use]
    pub fn is_declared(&self, lit: Lit) -> bool {
        self.declared.contains(&lit.var())
    }

    /// Current decision level.
    #[must_use]
    pub fn decision_level(&self) -> u32 {
        self.view.decision_level()
    }

    /// Conflict over a set of true literals; the enable literal is added
    /// when it becomes a clause.
    #[must_use]
    pub fn make_conflict(&self, lits: &[Lit]) -> Conflict {
        Conflict {
            set: lits.to_vec(),
            enable: self.enable,
        }
    }

    /// Force `lit`, justified by the true literals in `reason`.
    pub fn infer_literal(&mut self, lit: Lit, reason: &[Lit]) {
        self.inferred.push((lit, reason.to_vec()));
    }

    pub(crate) fn into_inferred(self) -> Vec<(Lit, Vec<Lit>)> {
        self.inferred
    }
}
