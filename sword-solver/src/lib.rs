//! # sword-solver
//!
//! Incremental bit-vector solving with propagator modules.
//!
//! Build terms through [`Solver`], assert or assume 1-bit signals, and call
//! [`Solver::solve`] as often as needed: assertions and learned clauses
//! persist, assumptions last one call. External reasoning plugs in through
//! the [`Module`] trait; each module is gated by an enable literal and is
//! consulted at every decision and propagation fixpoint of the search.
//!
//! ## Example
//!
//! ```
//! use sword_solver::{CardinalityLessThan, Opcode, Solver};
//!
//! let mut solver = Solver::new();
//! let x = solver.add_variable(8, "x").unwrap();
//! let y = solver.add_variable(8, "y").unwrap();
//! let product = solver.add_operator(Opcode::Mul, &[x, y]).unwrap();
//! let c = solver.add_constant(8, 18).unwrap();
//! let eq = solver.add_operator(Opcode::Equal, &[product, c]).unwrap();
//! solver.add_assertion(eq, true).unwrap();
//! solver.add_and_assert_module(CardinalityLessThan::new(x, 4)).unwrap();
//!
//! assert!(solver.solve().unwrap());
//! let xv = solver.variable_assignment(x).unwrap();
//! let yv = solver.variable_assignment(y).unwrap();
//! assert!(xv.count_ones() < 4);
//! assert_eq!(xv.to_u64().unwrap() * yv.to_u64().unwrap() % 256, 18);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod assignment;
pub mod bridge;
pub mod config;
pub mod module;
pub mod modules;
pub mod solver;
pub mod transcript;

pub use assignment::{BitValue, SignalAssignment};
pub use bridge::{BridgeStats, ModuleBridge};
pub use config::SolverConfig;
pub use module::{Conflict, Module, SearchContext, Setup};
pub use modules::CardinalityLessThan;
pub use solver::{Solver, SolverStats};
pub use sword_core::{LBool, Lit, Opcode, Result, Signal, Sort, SwordError, Var};
pub use transcript::{Call, Transcript};
