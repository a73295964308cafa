//! # sword-bv
//!
//! Bit-blasting for Sword term graphs.
//!
//! [`BitBlaster`] lowers bit-vector signals to literals of any
//! [`ClauseSink`](sword_sat::ClauseSink), memoizing per signal and sharing
//! structurally equal terms. The gate layer ([`Circuit`]) folds constants
//! and hashes gates so repeated sub-circuits are built once.
//!
//! ## Example
//!
//! ```
//! use sword_bv::BitBlaster;
//! use sword_core::{Opcode, TermGraph};
//! use sword_sat::{Solver, SolverResult};
//!
//! let mut g = TermGraph::new();
//! let x = g.variable(4, "x").unwrap();
//! let y = g.variable(4, "y").unwrap();
//! let sum = g.operator(Opcode::Add, &[x, y]).unwrap();
//! let nine = g.constant_from_str(4, "9", 10).unwrap();
//! let eq = g.operator(Opcode::Equal, &[sum, nine]).unwrap();
//!
//! let mut sat = Solver::new();
//! let mut bb = BitBlaster::new();
//! let goal = bb.encode_bool(&g, eq, &mut sat).unwrap();
//! sat.add_clause([goal]);
//! assert_eq!(sat.solve(), SolverResult::Sat);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod arith;
pub mod array;
pub mod blaster;
pub mod gates;

pub use array::ReadLog;
pub use blaster::{BitBlaster, BlastConfig, BlastStats};
pub use gates::{Bits, Circuit, GateCache, GateKey};
