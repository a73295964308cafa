//! The incremental solve controller.
//!
//! Owns the term graph, the encoder, the boolean engine and the module
//! bridge of one solver instance. Signals are encoded lazily, the first time
//! an assertion, assumption or module asks for them. Assertions are
//! permanent; assumptions apply to the next [`Solver::solve`] call only.

use crate::assignment::{BitValue, SignalAssignment};
use crate::bridge::ModuleBridge;
use crate::config::SolverConfig;
use crate::module::{Module, Setup};
use crate::transcript::{Call, Transcript};
use num_bigint::BigUint;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::io::Write;
use sword_bv::BitBlaster;
use sword_core::{Lit, Opcode, Result, Signal, SwordError, TermGraph};
use sword_sat::{Solver as SatSolver, SolverResult};
use tracing::{debug, info};

/// Counters over the lifetime of a solver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    /// Branching decisions.
    pub decisions: u64,
    /// Conflicts.
    pub conflicts: u64,
    /// Propagated literals.
    pub propagations: u64,
    /// Restarts.
    pub restarts: u64,
    /// Learned clauses.
    pub learned_clauses: u64,
    /// Decisions taken from modules.
    pub module_decisions: u64,
    /// Literals forced by modules.
    pub module_inferences: u64,
    /// Conflicts raised by modules.
    pub module_conflicts: u64,
    /// Signals lowered to literals.
    pub encoded_signals: u64,
    /// Signals that reused a structurally equal encoding.
    pub structural_hits: u64,
    /// Boolean variables.
    pub vars: usize,
    /// Stored clauses.
    pub clauses: usize,
}

/// A bit-vector solver with pluggable propagator modules.
#[derive(Debug)]
pub struct Solver {
    config: SolverConfig,
    graph: TermGraph,
    blaster: BitBlaster,
    sat: SatSolver,
    bridge: ModuleBridge,
    assumptions: Vec<Lit>,
    has_model: bool,
    transcript: Option<Transcript>,
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
        Self::with_config(SolverConfig::default())
    }

    /// Create a solver with `config`.
    #[must_use]
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            graph: TermGraph::new(),
            blaster: BitBlaster::with_config(config.blast_config()),
            sat: SatSolver::with_config(config.sat.clone()),
            bridge: ModuleBridge::new(config.check_module_reasons),
            assumptions: Vec::new(),
            has_model: false,
            transcript: None,
            config,
        }
    }

    /// Create a solver that logs every API call to `out`.
    #[must_use]
    pub fn with_transcript(config: SolverConfig, out: Box<dyn Write>) -> Self {
        let mut solver = Self::with_config(config);
        solver.transcript = Some(Transcript::new(out));
        solver
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The term graph built so far.
    #[must_use]
    pub fn graph(&self) -> &TermGraph {
        &self.graph
    }

    /// Number of registered modules.
    #[must_use]
    pub fn num_modules(&self) -> usize {
        self.bridge.len()
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> SolverStats {
        let sat = self.sat.stats();
        let bridge = self.bridge.stats();
        let blast = self.blaster.stats();
        SolverStats {
            decisions: sat.decisions,
            conflicts: sat.conflicts,
            propagations: sat.propagations,
            restarts: sat.restarts,
            learned_clauses: sat.learned_clauses,
            module_decisions: bridge.module_decisions,
            module_inferences: bridge.module_inferences,
            module_conflicts: bridge.module_conflicts,
            encoded_signals: blast.encoded_signals,
            structural_hits: blast.structural_hits,
            vars: self.sat.num_vars(),
            clauses: self.sat.num_clauses(),
        }
    }

    fn created(&mut self, signal: Result<Signal>) -> Result<Signal> {
        let signal = signal?;
        if let Some(transcript) = self.transcript.as_mut() {
            let node = self.graph.node(signal)?;
            transcript.record(&Call::signal(signal, node))?;
        }
        Ok(signal)
    }

    fn record(&mut self, call: &Call<'_>) -> Result<()> {
        match self.transcript.as_mut() {
            Some(transcript) => transcript.record(call),
            None => Ok(()),
        }
    }

    // ---- term construction ----

    /// A fresh bit-vector variable.
    pub fn add_variable(&mut self, width: u32, name: &str) -> Result<Signal> {
        let s = self.graph.variable(width, name);
        self.created(s)
    }

    /// A fresh array variable, readable through `SELECT` and writable
    /// through `STORE`.
    pub fn add_array_variable(&mut self, index_width: u32, element_width: u32, name: &str) -> Result<Signal> {
        let s = self.graph.array_variable(index_width, element_width, name);
        self.created(s)
    }

    /// A constant from a machine integer.
    pub fn add_constant(&mut self, width: u32, value: u64) -> Result<Signal> {
        let s = self.graph.constant(width, BigUint::from(value));
        self.created(s)
    }

    /// A constant from decimal text of any length.
    pub fn add_constant_str(&mut self, width: u32, decimal: &str) -> Result<Signal> {
        let s = self.graph.constant_from_str(width, decimal, 10);
        self.created(s)
    }

    /// A constant from binary text, most significant bit first.
    pub fn add_bin_constant(&mut self, width: u32, bits: &str) -> Result<Signal> {
        let s = self.graph.constant_from_str(width, bits, 2);
        self.created(s)
    }

    /// A binary constant as wide as its text.
    pub fn add_bin_constant_auto(&mut self, bits: &str) -> Result<Signal> {
        self.add_bin_constant(bits.len() as u32, bits)
    }

    /// A constant from hexadecimal text, most significant digit first.
    pub fn add_hex_constant(&mut self, width: u32, hex: &str) -> Result<Signal> {
        let s = self.graph.constant_from_str(width, hex, 16);
        self.created(s)
    }

    /// A hexadecimal constant four bits per digit wide.
    pub fn add_hex_constant_auto(&mut self, hex: &str) -> Result<Signal> {
        self.add_hex_constant(4 * hex.len() as u32, hex)
    }

    /// Apply a non-parametric operator.
    pub fn add_operator(&mut self, op: Opcode, operands: &[Signal]) -> Result<Signal> {
        let s = self.graph.operator(op, operands);
        self.created(s)
    }

    /// Bits `[low, high)` of `s`.
    pub fn add_extract(&mut self, s: Signal, low: u32, high: u32) -> Result<Signal> {
        let r = self.graph.extract(s, low, high);
        self.created(r)
    }

    /// `n` copies of `s` side by side.
    pub fn add_repeat(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.repeat(s, n);
        self.created(r)
    }

    /// `s` rotated left by a constant.
    pub fn add_rotate_left(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.rotate_left(s, n);
        self.created(r)
    }

    /// `s` rotated right by a constant.
    pub fn add_rotate_right(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.rotate_right(s, n);
        self.created(r)
    }

    /// `s` with `n` zero bits on top.
    pub fn add_zero_extend(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.zero_extend(s, n);
        self.created(r)
    }

    /// `s` with `n` copies of its sign bit on top.
    pub fn add_sign_extend(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.sign_extend(s, n);
        self.created(r)
    }

    /// `s << n` for a constant `n`.
    pub fn add_shift_left(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.shift_by(Opcode::Lshl, s, n);
        self.created(r)
    }

    /// Logical `s >> n` for a constant `n`.
    pub fn add_shift_right(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.shift_by(Opcode::Lshr, s, n);
        self.created(r)
    }

    /// Arithmetic `s >> n` for a constant `n`.
    pub fn add_shift_arith(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let r = self.graph.shift_by(Opcode::Ashr, s, n);
        self.created(r)
    }

    // ---- constraints ----

    fn bool_literal(&mut self, s: Signal, polarity: bool) -> Result<Lit> {
        let lit = self.blaster.encode_bool(&self.graph, s, &mut self.sat)?;
        Ok(if polarity { lit } else { !lit })
    }

    /// Require the 1-bit signal `s` to equal `polarity` from now on.
    pub fn add_assertion(&mut self, s: Signal, polarity: bool) -> Result<()> {
        let lit = self.bool_literal(s, polarity)?;
        self.record(&Call::Assert {
            signal: s,
            polarity,
        })?;
        self.sat.add_clause([lit]);
        Ok(())
    }

    /// Require the 1-bit signal `s` to equal `polarity` in the next
    /// [`solve`](Self::solve) only.
    pub fn add_assumption(&mut self, s: Signal, polarity: bool) -> Result<()> {
        let lit = self.bool_literal(s, polarity)?;
        self.record(&Call::Assume {
            signal: s,
            polarity,
        })?;
        self.assumptions.push(lit);
        Ok(())
    }

    /// Register `module` behind a fresh, permanently asserted enable
    /// signal, which is returned.
    ///
    /// The enable signal and its unit clause are only added once
    /// [`Module::attach`] succeeds; a failed attach leaves the term graph,
    /// the assertions and the module list as they were.
    pub fn add_and_assert_module<M: Module + 'static>(&mut self, mut module: M) -> Result<Signal> {
        let enable = Lit::pos(self.sat.new_var());
        let mut declared = FxHashSet::default();
        {
            let mut setup = Setup::new(
                &self.graph,
                &mut self.blaster,
                &mut self.sat,
                &mut declared,
                enable,
            );
            module.attach(&mut setup)?;
        }

        let index = self.bridge.len();
        let enable_signal = self.graph.variable(1, format!("enable_{index}"))?;
        self.blaster.bind(&self.graph, enable_signal, &[enable])?;
        self.sat.add_clause([enable]);
        debug!(
            module = module.name(),
            %enable,
            variables = declared.len(),
            "module registered"
        );
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.record(&Call::Module {
                name: module.name(),
                enable: enable_signal,
            })?;
        }
        self.bridge.register(Box::new(module), enable, declared);
        Ok(enable_signal)
    }

    /// Bits of `s`, least significant first, encoding it if needed.
    pub fn signal_to_literals(&mut self, s: Signal) -> Result<Vec<Lit>> {
        Ok(self.blaster.encode(&self.graph, s, &mut self.sat)?.to_vec())
    }

    // ---- solving ----

    /// Search under the pending assumptions, which are cleared afterwards.
    ///
    /// Returns `Ok(true)` when satisfiable and `Ok(false)` when not. A
    /// module contract violation aborts the search with an error.
    pub fn solve(&mut self) -> Result<bool> {
        let assumptions = std::mem::take(&mut self.assumptions);
        self.has_model = false;
        let outcome = self.sat.solve_with_hooks(&assumptions, &mut self.bridge);

        let result = match (outcome, self.bridge.take_violation()) {
            (_, Some(violation)) => Err(violation),
            (SolverResult::Sat, None) => Ok(true),
            (SolverResult::Unsat, None) => Ok(false),
            // the bridge records a violation before every abort
            (SolverResult::Unknown, None) => Err(SwordError::SearchAborted),
        };
        self.has_model = matches!(result, Ok(true));
        info!(
            result = ?result.as_ref().ok(),
            assumptions = assumptions.len(),
            conflicts = self.sat.stats().conflicts,
            "solve finished"
        );
        self.record(&Call::Solve {
            assumptions: assumptions.len(),
            result: result.as_ref().ok().copied(),
        })?;
        result
    }

    /// Assignment of the variable `s` in the last satisfiable
    /// [`solve`](Self::solve). Bits the search left open, and variables no
    /// constraint mentions, read as don't-care.
    pub fn variable_assignment(&self, s: Signal) -> Result<SignalAssignment> {
        let node = self.graph.node(s)?;
        if !node.is_variable() || node.sort().is_array() {
            return Err(SwordError::NotAVariable(s.id()));
        }
        if !self.has_model {
            return Err(SwordError::NoModel);
        }
        let bits = match self.blaster.literals(s) {
            Some(lits) => lits
                .iter()
                .map(|&l| BitValue::from(self.sat.model_value(l.var()).under(l)))
                .collect(),
            None => vec![BitValue::DontCare; node.width() as usize],
        };
        Ok(SignalAssignment::new(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assumptions_last_one_call() {
        let mut solver = Solver::new();
        let x = solver.add_variable(1, "x").unwrap();
        solver.add_assumption(x, true).unwrap();
        solver.add_assumption(x, false).unwrap();
        assert!(!solver.solve().unwrap());
        assert!(solver.solve().unwrap());
    }

    #[test]
    fn test_assertions_persist() {
        let mut solver = Solver::new();
        let x = solver.add_variable(1, "x").unwrap();
        solver.add_assertion(x, false).unwrap();
        assert!(solver.solve().unwrap());
        solver.add_assumption(x, true).unwrap();
        assert!(!solver.solve().unwrap());
        assert!(solver.solve().unwrap());
        assert_eq!(
            solver.variable_assignment(x).unwrap().bits(),
            &[BitValue::Zero]
        );
    }

    #[test]
    fn test_model_only_after_sat() {
        let mut solver = Solver::new();
        let x = solver.add_variable(4, "x").unwrap();
        assert_eq!(solver.variable_assignment(x), Err(SwordError::NoModel));
        let bit = solver.add_extract(x, 0, 1).unwrap();
        solver.add_assumption(bit, true).unwrap();
        solver.add_assumption(bit, false).unwrap();
        assert!(!solver.solve().unwrap());
        assert_eq!(solver.variable_assignment(x), Err(SwordError::NoModel));
    }

    #[test]
    fn test_unmentioned_variable_is_dont_care() {
        let mut solver = Solver::new();
        let x = solver.add_variable(3, "x").unwrap();
        let _y = solver.add_variable(2, "y").unwrap();
        assert!(solver.solve().unwrap());
        let a = solver.variable_assignment(x).unwrap();
        assert_eq!(a.as_ints(), vec![-1, -1, -1]);
    }

    #[test]
    fn test_assignment_needs_a_variable() {
        let mut solver = Solver::new();
        let x = solver.add_variable(2, "x").unwrap();
        let n = solver.add_operator(Opcode::Not, &[x]).unwrap();
        assert!(solver.solve().unwrap());
        assert_eq!(
            solver.variable_assignment(n),
            Err(SwordError::NotAVariable(n.id()))
        );
    }

    #[test]
    fn test_wide_assertion_is_rejected() {
        let mut solver = Solver::new();
        let x = solver.add_variable(8, "x").unwrap();
        assert_eq!(
            solver.add_assertion(x, true),
            Err(SwordError::NotBoolean { width: 8 })
        );
    }

    #[test]
    fn test_auto_width_constants() {
        let mut solver = Solver::new();
        let b = solver.add_bin_constant_auto("0101").unwrap();
        let h = solver.add_hex_constant_auto("a5").unwrap();
        assert_eq!(solver.graph().node(b).unwrap().width(), 4);
        assert_eq!(solver.graph().node(h).unwrap().width(), 8);
    }
}
