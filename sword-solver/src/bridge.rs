//! Dispatch from the engine's extension points to registered modules.
//!
//! Modules are consulted in registration order, and only while their
//! enable literal is true. Every clause handed back to the engine carries
//! `¬enable`, so a disabled module constrains nothing. A module that breaks
//! the protocol stops the search; the violation is kept until the
//! controller collects it.

use crate::module::{Module, SearchContext};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use sword_core::{LBool, Lit, SwordError, Var};
use sword_sat::{AssignmentView, Decision, ExternalHooks, Propagation};
use tracing::{trace, warn};

/// Module activity counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    /// Decisions taken from modules.
    pub module_decisions: u64,
    /// Literals forced by modules.
    pub module_inferences: u64,
    /// Conflicts raised by modules.
    pub module_conflicts: u64,
}

struct Registered {
    module: Box<dyn Module>,
    enable: Lit,
    declared: FxHashSet<Var>,
}

/// The engine hook implementation backing all registered modules.
pub struct ModuleBridge {
    modules: Vec<Registered>,
    check_reasons: bool,
    violation: Option<SwordError>,
    stats: BridgeStats,
}

impl fmt::Debug for ModuleBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.modules.iter().map(|r| r.module.name()).collect();
        f.debug_struct("ModuleBridge")
            .field("modules", &names)
            .field("check_reasons", &self.check_reasons)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ModuleBridge {
    /// Create a bridge. With `check_reasons`, every conflict and reason
    /// literal is checked to be true and declared.
    #[must_use]
    pub fn new(check_reasons: bool) -> Self {
        Self {
            modules: Vec::new(),
            check_reasons,
            violation: None,
            stats: BridgeStats::default(),
        }
    }

    /// Add a module gated by `enable` with its declared variable set.
    pub fn register(&mut self, module: Box<dyn Module>, enable: Lit, declared: FxHashSet<Var>) {
        self.modules.push(Registered {
            module,
            enable,
            declared,
        });
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no module is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// The violation that aborted the last search, if any.
    pub fn take_violation(&mut self) -> Option<SwordError> {
        self.violation.take()
    }

    fn violate(&mut self, index: usize, reason: String) {
        let module = self.modules[index].module.name().to_string();
        warn!(%module, %reason, "module contract violation");
        self.violation = Some(SwordError::ModuleViolation { module, reason });
    }

    /// Check that every literal is declared and, when checking is on, true.
    fn check_true_set(&self, index: usize, view: &AssignmentView<'_>, lits: &[Lit]) -> Result<(), String> {
        let declared = &self.modules[index].declared;
        for &l in lits {
            if !declared.contains(&l.var()) {
                return Err(format!("literal {l} is not declared"));
            }
            if self.check_reasons && !view.value(l).is_true() {
                return Err(format!("literal {l} is cited but not true"));
            }
        }
        Ok(())
    }
}

impl ExternalHooks for ModuleBridge {
    fn decide(&mut self, view: &AssignmentView<'_>) -> Decision {
        for index in 0..self.modules.len() {
            let entry = &mut self.modules[index];
            if !view.value(entry.enable).is_true() {
                continue;
            }
            let ctx = SearchContext::new(*view, &entry.declared, entry.enable);
            let Some(lit) = entry.module.decide(&ctx) else {
                continue;
            };
            if !entry.declared.contains(&lit.var()) {
                self.violate(index, format!("decided on undeclared literal {lit}"));
                return Decision::Abort;
            }
            if !view.value(lit).is_undef() {
                self.violate(index, format!("decided on assigned literal {lit}"));
                return Decision::Abort;
            }
            trace!(module = self.modules[index].module.name(), %lit, "module decision");
            self.stats.module_decisions += 1;
            return Decision::Branch(lit);
        }
        Decision::Abstain
    }

    fn propagate(&mut self, view: &AssignmentView<'_>) -> Propagation {
        let mut implied: Vec<Vec<Lit>> = Vec::new();
        for index in 0..self.modules.len() {
            let entry = &mut self.modules[index];
            let enable = entry.enable;
            if !view.value(enable).is_true() {
                continue;
            }
            let mut ctx = SearchContext::new(*view, &entry.declared, enable);
            let conflict = entry.module.propagate(&mut ctx);
            let inferred = ctx.into_inferred();

            if let Some(conflict) = conflict {
                if let Err(reason) = self.check_true_set(index, view, conflict.literals()) {
                    self.violate(index, format!("conflict: {reason}"));
                    return Propagation::Abort;
                }
                trace!(
                    module = self.modules[index].module.name(),
                    size = conflict.literals().len(),
                    "module conflict"
                );
                self.stats.module_conflicts += 1;
                return Propagation::Conflict(conflict.clause());
            }

            for (lit, reason) in inferred {
                if !self.modules[index].declared.contains(&lit.var()) {
                    self.violate(index, format!("inferred undeclared literal {lit}"));
                    return Propagation::Abort;
                }
                if let Err(why) = self.check_true_set(index, view, &reason) {
                    self.violate(index, format!("reason for {lit}: {why}"));
                    return Propagation::Abort;
                }
                let mut clause = Vec::with_capacity(reason.len() + 2);
                clause.push(lit);
                clause.extend(reason.iter().map(|&r| !r));
                clause.push(!enable);
                match view.value(lit) {
                    LBool::True => {}
                    LBool::False => {
                        trace!(%lit, "inference contradicts the assignment");
                        self.stats.module_conflicts += 1;
                        return Propagation::Conflict(clause);
                    }
                    LBool::Undef => {
                        self.stats.module_inferences += 1;
                        implied.push(clause);
                    }
                }
            }
        }
        if implied.is_empty() {
            Propagation::Idle
        } else {
            Propagation::Implied(implied)
        }
    }
}
