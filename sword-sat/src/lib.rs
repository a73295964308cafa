//! Sword SAT - the boolean search engine under the bit-vector layer.
//!
//! A compact Conflict-Driven Clause Learning solver:
//! - 2-watched literal unit propagation with blocker literals
//! - 1UIP conflict analysis with local clause minimization
//! - VSIDS decisions from a binary heap, phase saving
//! - Luby restarts
//! - Assumptions scoped to a single call
//! - [`ExternalHooks`]: decide/propagate callbacks through which external
//!   reasoning branches, forces literals with reason clauses, or raises
//!   conflicts
//!
//! # Examples
//!
//! ```
//! use sword_sat::{Lit, Solver, SolverResult};
//!
//! let mut sat = Solver::new();
//! let a = sat.new_var();
//! let b = sat.new_var();
//! sat.add_clause([Lit::pos(a), Lit::pos(b)]);
//! sat.add_clause([Lit::neg(a)]);
//! assert_eq!(sat.solve(), SolverResult::Sat);
//! assert!(sat.model_value(b).is_true());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod clause;
pub mod config;
pub mod engine;
pub mod hooks;
pub mod solver;
pub mod vsids;
pub mod watched;

pub use clause::{Clause, ClauseDb, ClauseKind, ClauseRef};
pub use config::SatConfig;
pub use engine::{BooleanEngine, ClauseSink};
pub use hooks::{AssignmentView, Decision, ExternalHooks, NoHooks, Propagation};
pub use solver::{SatStats, Solver, SolverResult};
pub use sword_core::{LBool, Lit, Var};
