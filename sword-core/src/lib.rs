//! Sword Core - literals, the opcode catalog and the bit-vector term graph.
//!
//! This crate holds the types every other Sword crate agrees on:
//! - [`Var`], [`Lit`] and [`LBool`] for the boolean layer
//! - [`Opcode`] with per-operator arity and classification
//! - [`TermGraph`], an arena of immutable [`Signal`] nodes with validating
//!   constructors
//! - [`SwordError`] and the crate-wide [`Result`] alias
//!
//! # Examples
//!
//! ```
//! use sword_core::{Opcode, Sort, TermGraph};
//!
//! let mut g = TermGraph::new();
//! let x = g.variable(8, "x").unwrap();
//! let y = g.variable(8, "y").unwrap();
//! let product = g.operator(Opcode::Mul, &[x, y]).unwrap();
//! let c = g.constant_from_str(8, "18", 10).unwrap();
//! let eq = g.operator(Opcode::Equal, &[product, c]).unwrap();
//! assert_eq!(g.sort(eq).unwrap(), Sort::BitVec(1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constant;
pub mod error;
pub mod graph;
pub mod literal;
pub mod opcode;

pub use error::{Result, SwordError};
pub use graph::{Node, Signal, Sort, TermGraph};
pub use literal::{LBool, Lit, Var};
pub use opcode::{Arity, Opcode};
