//! CDCL search: two watched literals, 1UIP learning, VSIDS, phase saving,
//! Luby restarts, per-call assumptions and external hooks.
//!
//! Assumptions occupy decision levels `1..=k`, one level each. A restart
//! returns to level 0 and the assumptions are decided again. After every
//! call the solver is back at level 0, so clauses can be added between calls
//! and everything learned is kept.

use crate::clause::{ClauseDb, ClauseKind, ClauseRef};
use crate::config::SatConfig;
use crate::engine::{BooleanEngine, ClauseSink};
use crate::hooks::{AssignmentView, Decision, ExternalHooks, NoHooks, Propagation};
use crate::vsids::Vsids;
use crate::watched::{WatchLists, Watcher};
use serde::Serialize;
use smallvec::{SmallVec, smallvec};
use sword_core::{LBool, Lit, Var};
use tracing::{debug, trace};

type LitVec = SmallVec<[Lit; 4]>;

/// Outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolverResult {
    /// A model was found.
    Sat,
    /// No model exists under the given assumptions.
    Unsat,
    /// An external hook aborted the search.
    Unknown,
}

/// Search counters, cumulative over all calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SatStats {
    /// Branching decisions, including external ones.
    pub decisions: u64,
    /// Conflicts, including external ones.
    pub conflicts: u64,
    /// Literals taken off the propagation queue.
    pub propagations: u64,
    /// Restarts.
    pub restarts: u64,
    /// Clauses learned by conflict analysis.
    pub learned_clauses: u64,
    /// Decisions supplied by hooks.
    pub external_decisions: u64,
    /// Literals forced by hooks.
    pub external_implications: u64,
    /// Conflicts raised by hooks.
    pub external_conflicts: u64,
}

/// What storing an external clause did to the assignment.
enum External {
    Stored,
    Assigned,
    Conflict(ClauseRef),
    Unsat,
}

/// Control flow after consulting the propagation hook.
enum Step {
    Fixpoint,
    Continue,
    Unsat,
    Abort,
}

#[inline]
fn value_of(assigns: &[LBool], lit: Lit) -> LBool {
    assigns[lit.var().index()].under(lit)
}

/// A CDCL SAT solver.
#[derive(Debug)]
pub struct Solver {
    config: SatConfig,
    db: ClauseDb,
    watches: WatchLists,
    assigns: Vec<LBool>,
    levels: Vec<u32>,
    reasons: Vec<Option<ClauseRef>>,
    phases: Vec<bool>,
    seen: Vec<bool>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    qhead: usize,
    vsids: Vsids,
    ok: bool,
    model: Vec<LBool>,
    conflicts_since_restart: u64,
    stats: SatStats,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a solver with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SatConfig::default())
    }

    /// Create a solver with `config`.
    #[must_use]
    pub fn with_config(config: SatConfig) -> Self {
        let vsids = Vsids::new(config.var_decay);
        Self {
            config,
            db: ClauseDb::new(),
            watches: WatchLists::new(),
            assigns: Vec::new(),
            levels: Vec::new(),
            reasons: Vec::new(),
            phases: Vec::new(),
            seen: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            vsids,
            ok: true,
            model: Vec::new(),
            conflicts_since_restart: 0,
            stats: SatStats::default(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SatConfig {
        &self.config
    }

    /// Allocate a fresh variable.
    pub fn new_var(&mut self) -> Var {
        let var = Var::new(self.assigns.len() as u32);
        self.assigns.push(LBool::Undef);
        self.levels.push(0);
        self.reasons.push(None);
        self.phases.push(self.config.default_phase);
        self.seen.push(false);
        self.watches.add_var();
        self.vsids.add_var();
        var
    }

    /// Number of allocated variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    /// Number of stored clauses of length two or more.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.db.len()
    }

    /// The clause database.
    #[must_use]
    pub fn clauses(&self) -> &ClauseDb {
        &self.db
    }

    /// Cumulative statistics.
    #[must_use]
    pub fn stats(&self) -> &SatStats {
        &self.stats
    }

    /// Current decision level.
    #[must_use]
    pub fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    /// Assigned literals in assignment order.
    #[must_use]
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// False once the clause set is unsatisfiable without assumptions.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Model of the last satisfiable call; empty otherwise.
    #[must_use]
    pub fn model(&self) -> &[LBool] {
        &self.model
    }

    /// Value of `var` in the last model.
    #[must_use]
    pub fn model_value(&self, var: Var) -> LBool {
        self.model.get(var.index()).copied().unwrap_or(LBool::Undef)
    }

    /// Current value of `lit`.
    #[must_use]
    pub fn value(&self, lit: Lit) -> LBool {
        value_of(&self.assigns, lit)
    }

    /// Add a permanent clause. Returns `false` once the clause set is
    /// unsatisfiable.
    pub fn add_clause(&mut self, lits: impl IntoIterator<Item = Lit>) -> bool {
        if !self.ok {
            return false;
        }
        self.backtrack(0);

        let mut clause: LitVec = lits.into_iter().collect();
        clause.sort_unstable();
        clause.dedup();
        if clause.windows(2).any(|w| w[0].is_complement_of(w[1])) {
            return true;
        }

        let mut kept = LitVec::new();
        for &lit in &clause {
            match self.value(lit) {
                LBool::True => return true,
                LBool::False => {}
                LBool::Undef => kept.push(lit),
            }
        }

        match kept.len() {
            0 => {
                self.ok = false;
            }
            1 => {
                self.assign(kept[0], None);
                if self.propagate().is_some() {
                    self.ok = false;
                }
            }
            _ => {
                let cref = self.db.push(kept, ClauseKind::Original);
                self.attach(cref);
            }
        }
        self.ok
    }

    /// Solve without assumptions.
    pub fn solve(&mut self) -> SolverResult {
        self.solve_with_hooks(&[], &mut NoHooks)
    }

    /// Solve under `assumptions`, which only apply to this call.
    pub fn solve_with_assumptions(&mut self, assumptions: &[Lit]) -> SolverResult {
        self.solve_with_hooks(assumptions, &mut NoHooks)
    }

    /// Solve under `assumptions`, consulting `hooks` during search.
    pub fn solve_with_hooks(
        &mut self,
        assumptions: &[Lit],
        hooks: &mut dyn ExternalHooks,
    ) -> SolverResult {
        self.model.clear();
        if !self.ok {
            return SolverResult::Unsat;
        }
        self.backtrack(0);
        debug!(
            vars = self.num_vars(),
            clauses = self.db.len(),
            assumptions = assumptions.len(),
            "search started"
        );

        let result = self.search(assumptions, hooks);
        if result == SolverResult::Sat {
            self.model = self.assigns.clone();
        }
        self.backtrack(0);

        debug!(
            ?result,
            conflicts = self.stats.conflicts,
            decisions = self.stats.decisions,
            "search finished"
        );
        result
    }

    fn search(&mut self, assumptions: &[Lit], hooks: &mut dyn ExternalHooks) -> SolverResult {
        self.conflicts_since_restart = 0;
        loop {
            if let Some(confl) = self.propagate() {
                if !self.handle_conflict(confl) {
                    return SolverResult::Unsat;
                }
                continue;
            }

            match self.consult_propagate(hooks) {
                Step::Fixpoint => {}
                Step::Continue => continue,
                Step::Unsat => return SolverResult::Unsat,
                Step::Abort => return SolverResult::Unknown,
            }

            if self.decision_level() > 0
                && self.conflicts_since_restart >= self.config.restart_interval(self.stats.restarts)
            {
                self.backtrack(0);
                self.stats.restarts += 1;
                self.conflicts_since_restart = 0;
                debug!(restarts = self.stats.restarts, "restart");
                continue;
            }

            let level = self.decision_level() as usize;
            if let Some(&assumption) = assumptions.get(level) {
                match self.value(assumption) {
                    LBool::True => self.new_decision_level(),
                    LBool::False => {
                        trace!(%assumption, "assumption falsified");
                        return SolverResult::Unsat;
                    }
                    LBool::Undef => {
                        self.new_decision_level();
                        self.assign(assumption, None);
                    }
                }
                continue;
            }

            match hooks.decide(&self.view()) {
                Decision::Branch(lit) if self.value(lit).is_undef() => {
                    self.stats.decisions += 1;
                    self.stats.external_decisions += 1;
                    self.new_decision_level();
                    self.assign(lit, None);
                    continue;
                }
                Decision::Branch(_) | Decision::Abstain => {}
                Decision::Abort => return SolverResult::Unknown,
            }

            match self.pick_branch() {
                Some(lit) => {
                    self.stats.decisions += 1;
                    self.new_decision_level();
                    self.assign(lit, None);
                }
                None => return SolverResult::Sat,
            }
        }
    }

    fn view(&self) -> AssignmentView<'_> {
        AssignmentView::new(&self.assigns, &self.levels, self.decision_level())
    }

    fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    fn assign(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let idx = lit.var().index();
        debug_assert!(self.assigns[idx].is_undef());
        self.assigns[idx] = LBool::from_bool(lit.is_pos());
        self.levels[idx] = self.decision_level();
        self.reasons[idx] = reason;
        self.trail.push(lit);
    }

    fn attach(&mut self, cref: ClauseRef) {
        let (a, b) = {
            let lits = &self.db[cref].lits;
            (lits[0], lits[1])
        };
        self.watches.watch(a, cref, b);
        self.watches.watch(b, cref, a);
    }

    /// Undo every assignment above `level`, saving phases.
    fn backtrack(&mut self, level: u32) {
        if self.decision_level() <= level {
            return;
        }
        let start = self.trail_lim[level as usize];
        for &lit in self.trail[start..].iter().rev() {
            let var = lit.var();
            let idx = var.index();
            self.assigns[idx] = LBool::Undef;
            self.reasons[idx] = None;
            self.phases[idx] = lit.is_pos();
            self.vsids.insert(var);
        }
        self.trail.truncate(start);
        self.trail_lim.truncate(level as usize);
        self.qhead = self.qhead.min(start);
    }

    /// Unit propagation to fixpoint. Returns a falsified clause on conflict.
    fn propagate(&mut self) -> Option<ClauseRef> {
        let mut conflict = None;
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            self.stats.propagations += 1;

            let false_lit = !p;
            let mut ws = self.watches.take(false_lit);
            let mut i = 0;
            let mut j = 0;
            while i < ws.len() {
                let w = ws[i];
                i += 1;
                if value_of(&self.assigns, w.blocker) == LBool::True {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                let clause = &mut self.db[w.clause];
                if clause.lits[0] == false_lit {
                    clause.lits.swap(0, 1);
                }
                let first = clause.lits[0];
                let kept = Watcher {
                    clause: w.clause,
                    blocker: first,
                };
                if first != w.blocker && value_of(&self.assigns, first) == LBool::True {
                    ws[j] = kept;
                    j += 1;
                    continue;
                }

                let mut replacement = None;
                for k in 2..clause.lits.len() {
                    if value_of(&self.assigns, clause.lits[k]) != LBool::False {
                        clause.lits.swap(1, k);
                        replacement = Some(clause.lits[1]);
                        break;
                    }
                }
                if let Some(lit) = replacement {
                    self.watches.watch(lit, w.clause, first);
                    continue;
                }

                ws[j] = kept;
                j += 1;
                if value_of(&self.assigns, first) == LBool::False {
                    conflict = Some(w.clause);
                    while i < ws.len() {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    self.assign(first, Some(w.clause));
                }
            }
            ws.truncate(j);
            self.watches.restore(false_lit, ws);

            if conflict.is_some() {
                self.qhead = self.trail.len();
                break;
            }
        }
        conflict
    }

    /// Learn from a conflict at the current level and backjump. Returns
    /// `false` when the conflict is at level 0.
    fn handle_conflict(&mut self, confl: ClauseRef) -> bool {
        self.stats.conflicts += 1;
        self.conflicts_since_restart += 1;
        if self.decision_level() == 0 {
            self.ok = false;
            return false;
        }

        let (learnt, backjump) = self.analyze(confl);
        trace!(
            level = self.decision_level(),
            backjump,
            size = learnt.len(),
            "conflict"
        );
        self.backtrack(backjump);
        if learnt.len() == 1 {
            self.assign(learnt[0], None);
        } else {
            let asserting = learnt[0];
            let cref = self.db.push(learnt, ClauseKind::Learned);
            self.attach(cref);
            self.assign(asserting, Some(cref));
            self.stats.learned_clauses += 1;
        }
        self.vsids.decay();
        true
    }

    /// First-UIP analysis. Returns the learned clause, asserting literal
    /// first and the highest remaining level second, and the backjump level.
    fn analyze(&mut self, confl: ClauseRef) -> (LitVec, u32) {
        let current = self.decision_level();
        let mut learnt: LitVec = smallvec![Lit::from_raw(0)];
        let mut path_count = 0usize;
        let mut pivot: Option<Lit> = None;
        let mut index = self.trail.len();
        let mut cref = confl;

        loop {
            for &q in &self.db[cref].lits {
                if Some(q) == pivot {
                    continue;
                }
                let idx = q.var().index();
                if !self.seen[idx] && self.levels[idx] > 0 {
                    self.seen[idx] = true;
                    self.vsids.bump(q.var());
                    if self.levels[idx] >= current {
                        path_count += 1;
                    } else {
                        learnt.push(q);
                    }
                }
            }

            loop {
                index -= 1;
                if self.seen[self.trail[index].var().index()] {
                    break;
                }
            }
            let lit = self.trail[index];
            self.seen[lit.var().index()] = false;
            pivot = Some(lit);
            path_count -= 1;
            if path_count == 0 {
                break;
            }
            // Only the decision of a level lacks a reason, and it is the
            // last current-level literal reached.
            let Some(reason) = self.reasons[lit.var().index()] else {
                break;
            };
            cref = reason;
        }

        if let Some(uip) = pivot {
            learnt[0] = !uip;
        }

        // Drop literals implied by the rest of the clause.
        let mut minimized: LitVec = smallvec![learnt[0]];
        for &q in &learnt[1..] {
            let redundant = self.reasons[q.var().index()].is_some_and(|r| {
                self.db[r].lits.iter().all(|&x| {
                    let idx = x.var().index();
                    x.var() == q.var() || self.seen[idx] || self.levels[idx] == 0
                })
            });
            if !redundant {
                minimized.push(q);
            }
        }
        for &q in &learnt[1..] {
            self.seen[q.var().index()] = false;
        }

        let mut backjump = 0;
        if minimized.len() > 1 {
            let mut max_i = 1;
            for i in 2..minimized.len() {
                if self.levels[minimized[i].var().index()]
                    > self.levels[minimized[max_i].var().index()]
                {
                    max_i = i;
                }
            }
            minimized.swap(1, max_i);
            backjump = self.levels[minimized[1].var().index()];
        }
        (minimized, backjump)
    }

    fn pick_branch(&mut self) -> Option<Lit> {
        while let Some(var) = self.vsids.pop_max() {
            if self.assigns[var.index()].is_undef() {
                return Some(Lit::with_polarity(var, self.phases[var.index()]));
            }
        }
        None
    }

    fn consult_propagate(&mut self, hooks: &mut dyn ExternalHooks) -> Step {
        match hooks.propagate(&self.view()) {
            Propagation::Idle => Step::Fixpoint,
            Propagation::Abort => Step::Abort,
            Propagation::Conflict(lits) => {
                self.stats.external_conflicts += 1;
                match self.add_external_clause(&lits) {
                    External::Conflict(cref) => self.resolve_external_conflict(cref),
                    External::Unsat => Step::Unsat,
                    External::Assigned => Step::Continue,
                    External::Stored => Step::Fixpoint,
                }
            }
            Propagation::Implied(clauses) => {
                let mut progressed = false;
                for clause in &clauses {
                    match self.add_external_clause(clause) {
                        External::Conflict(cref) => return self.resolve_external_conflict(cref),
                        External::Unsat => return Step::Unsat,
                        External::Assigned => {
                            self.stats.external_implications += 1;
                            progressed = true;
                        }
                        External::Stored => {}
                    }
                }
                if progressed {
                    Step::Continue
                } else {
                    Step::Fixpoint
                }
            }
        }
    }

    /// Store a clause supplied mid-search. Literals are ordered true first,
    /// then unassigned, then false by decreasing level, so the watches are
    /// valid for the current assignment and after any backjump.
    fn add_external_clause(&mut self, lits: &[Lit]) -> External {
        let mut clause: LitVec = lits.iter().copied().collect();
        clause.sort_unstable();
        clause.dedup();
        if clause.windows(2).any(|w| w[0].is_complement_of(w[1])) {
            return External::Stored;
        }
        let assigns = &self.assigns;
        let levels = &self.levels;
        clause.sort_by_key(|&l| match value_of(assigns, l) {
            LBool::True => (0, 0),
            LBool::Undef => (1, 0),
            LBool::False => (2, u32::MAX - levels[l.var().index()]),
        });

        let Some(&first) = clause.first() else {
            self.ok = false;
            return External::Unsat;
        };
        let first_level = self.levels[first.var().index()];

        if clause.len() == 1 {
            match self.value(first) {
                LBool::True if first_level == 0 => return External::Stored,
                LBool::False if first_level == 0 => {
                    self.ok = false;
                    return External::Unsat;
                }
                _ => {}
            }
            self.backtrack(0);
            self.assign(first, None);
            return External::Assigned;
        }

        let second = clause[1];
        let cref = self.db.push(clause, ClauseKind::External);
        self.attach(cref);
        match (self.value(first), self.value(second)) {
            (LBool::False, _) => External::Conflict(cref),
            (LBool::Undef, LBool::False) => {
                self.assign(first, Some(cref));
                External::Assigned
            }
            _ => External::Stored,
        }
    }

    /// Backjump to the highest level of a falsified external clause and
    /// analyze it there.
    fn resolve_external_conflict(&mut self, cref: ClauseRef) -> Step {
        let level = self.levels[self.db[cref].lits[0].var().index()];
        if level == 0 {
            self.stats.conflicts += 1;
            self.ok = false;
            return Step::Unsat;
        }
        self.backtrack(level);
        if self.handle_conflict(cref) {
            Step::Continue
        } else {
            Step::Unsat
        }
    }
}

impl ClauseSink for Solver {
    fn new_var(&mut self) -> Var {
        Solver::new_var(self)
    }

    fn add_clause(&mut self, lits: &[Lit]) -> bool {
        Solver::add_clause(self, lits.iter().copied())
    }
}

impl BooleanEngine for Solver {
    fn num_vars(&self) -> usize {
        Solver::num_vars(self)
    }

    fn solve_with_hooks(
        &mut self,
        assumptions: &[Lit],
        hooks: &mut dyn ExternalHooks,
    ) -> SolverResult {
        Solver::solve_with_hooks(self, assumptions, hooks)
    }

    fn model_value(&self, var: Var) -> LBool {
        Solver::model_value(self, var)
    }

    fn value(&self, lit: Lit) -> LBool {
        Solver::value(self, lit)
    }

    fn decision_level(&self) -> u32 {
        Solver::decision_level(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(solver: &mut Solver, n: usize) -> Vec<Var> {
        (0..n).map(|_| solver.new_var()).collect()
    }

    #[test]
    fn test_empty_is_sat() {
        let mut solver = Solver::new();
        assert_eq!(solver.solve(), SolverResult::Sat);
    }

    #[test]
    fn test_unit_and_binary() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 2);
        assert!(solver.add_clause([Lit::pos(v[0])]));
        assert!(solver.add_clause([Lit::neg(v[0]), Lit::pos(v[1])]));
        assert_eq!(solver.solve(), SolverResult::Sat);
        assert_eq!(solver.model_value(v[0]), LBool::True);
        assert_eq!(solver.model_value(v[1]), LBool::True);
    }

    #[test]
    fn test_contradiction_is_permanent() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 1);
        solver.add_clause([Lit::pos(v[0])]);
        assert!(!solver.add_clause([Lit::neg(v[0])]));
        assert_eq!(solver.solve(), SolverResult::Unsat);
        assert!(!solver.is_ok());
        assert!(solver.model().is_empty());
    }

    #[test]
    fn test_tautology_ignored() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 1);
        assert!(solver.add_clause([Lit::pos(v[0]), Lit::neg(v[0])]));
        assert_eq!(solver.num_clauses(), 0);
    }

    /// Pigeonhole with 3 pigeons and 2 holes.
    #[test]
    fn test_pigeonhole_unsat() {
        let mut solver = Solver::new();
        let p: Vec<Vec<Var>> = (0..3).map(|_| vars(&mut solver, 2)).collect();
        for pigeon in &p {
            solver.add_clause(pigeon.iter().map(|&v| Lit::pos(v)));
        }
        for hole in 0..2 {
            for a in 0..3 {
                for b in (a + 1)..3 {
                    solver.add_clause([Lit::neg(p[a][hole]), Lit::neg(p[b][hole])]);
                }
            }
        }
        assert_eq!(solver.solve(), SolverResult::Unsat);
        assert!(solver.stats().conflicts > 0);
    }

    #[test]
    fn test_assumptions_are_per_call() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 2);
        solver.add_clause([Lit::pos(v[0]), Lit::pos(v[1])]);

        let result = solver.solve_with_assumptions(&[Lit::neg(v[0]), Lit::neg(v[1])]);
        assert_eq!(result, SolverResult::Unsat);
        assert!(solver.is_ok());

        assert_eq!(
            solver.solve_with_assumptions(&[Lit::neg(v[0])]),
            SolverResult::Sat
        );
        assert_eq!(solver.model_value(v[1]), LBool::True);
        assert_eq!(solver.solve(), SolverResult::Sat);
    }

    #[test]
    fn test_add_clause_after_solve() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 3);
        solver.add_clause([Lit::pos(v[0]), Lit::pos(v[1]), Lit::pos(v[2])]);
        assert_eq!(solver.solve(), SolverResult::Sat);
        solver.add_clause([Lit::neg(v[0])]);
        solver.add_clause([Lit::neg(v[1])]);
        assert_eq!(solver.solve(), SolverResult::Sat);
        assert_eq!(solver.model_value(v[2]), LBool::True);
        solver.add_clause([Lit::neg(v[2])]);
        assert_eq!(solver.solve(), SolverResult::Unsat);
    }

    /// Forbids any two of its variables being true together.
    struct AtMostOne {
        vars: Vec<Var>,
        calls: usize,
    }

    impl ExternalHooks for AtMostOne {
        fn propagate(&mut self, view: &AssignmentView<'_>) -> Propagation {
            self.calls += 1;
            let true_lits: Vec<Lit> = self
                .vars
                .iter()
                .map(|&v| Lit::pos(v))
                .filter(|&l| view.value(l).is_true())
                .collect();
            match true_lits.as_slice() {
                [] => Propagation::Idle,
                [a] => {
                    let implied: Vec<Vec<Lit>> = self
                        .vars
                        .iter()
                        .map(|&v| Lit::neg(v))
                        .filter(|&l| view.value(l).is_undef())
                        .map(|l| vec![l, !*a])
                        .collect();
                    if implied.is_empty() {
                        Propagation::Idle
                    } else {
                        Propagation::Implied(implied)
                    }
                }
                [a, b, ..] => Propagation::Conflict(vec![!*a, !*b]),
            }
        }
    }

    #[test]
    fn test_external_propagation_restricts_models() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 4);
        // at least two of the first three, unless v3
        solver.add_clause([Lit::pos(v[0]), Lit::pos(v[1]), Lit::pos(v[3])]);
        solver.add_clause([Lit::pos(v[1]), Lit::pos(v[2]), Lit::pos(v[3])]);
        let mut hooks = AtMostOne {
            vars: v[..3].to_vec(),
            calls: 0,
        };
        assert_eq!(solver.solve_with_hooks(&[], &mut hooks), SolverResult::Sat);
        let ones = v[..3]
            .iter()
            .filter(|&&x| solver.model_value(x).is_true())
            .count();
        assert!(ones <= 1);
        assert!(hooks.calls > 0);

        let result = solver.solve_with_hooks(&[Lit::neg(v[3]), Lit::neg(v[1])], &mut hooks);
        assert_eq!(result, SolverResult::Unsat);
    }

    #[test]
    fn test_external_conflict_at_root_is_unsat() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 3);
        solver.add_clause([Lit::pos(v[0])]);
        solver.add_clause([Lit::pos(v[1])]);
        let mut hooks = AtMostOne {
            vars: v[..2].to_vec(),
            calls: 0,
        };
        assert_eq!(solver.solve_with_hooks(&[], &mut hooks), SolverResult::Unsat);
        assert!(!solver.is_ok());
    }

    struct Brancher(Lit);

    impl ExternalHooks for Brancher {
        fn decide(&mut self, view: &AssignmentView<'_>) -> Decision {
            if view.value(self.0).is_undef() {
                Decision::Branch(self.0)
            } else {
                Decision::Abstain
            }
        }
    }

    #[test]
    fn test_external_decision_is_followed() {
        let mut solver = Solver::with_config(SatConfig {
            default_phase: true,
            ..SatConfig::default()
        });
        let v = vars(&mut solver, 2);
        solver.add_clause([Lit::pos(v[0]), Lit::pos(v[1])]);
        let mut hooks = Brancher(Lit::neg(v[0]));
        assert_eq!(solver.solve_with_hooks(&[], &mut hooks), SolverResult::Sat);
        assert_eq!(solver.model_value(v[0]), LBool::False);
        assert_eq!(solver.stats().external_decisions, 1);
    }

    struct Aborter;

    impl ExternalHooks for Aborter {
        fn propagate(&mut self, _view: &AssignmentView<'_>) -> Propagation {
            Propagation::Abort
        }
    }

    #[test]
    fn test_abort_returns_unknown_at_root() {
        let mut solver = Solver::new();
        let v = vars(&mut solver, 2);
        solver.add_clause([Lit::pos(v[0]), Lit::pos(v[1])]);
        assert_eq!(
            solver.solve_with_hooks(&[Lit::pos(v[0])], &mut Aborter),
            SolverResult::Unknown
        );
        assert_eq!(solver.decision_level(), 0);
        assert_eq!(solver.solve(), SolverResult::Sat);
    }
}
