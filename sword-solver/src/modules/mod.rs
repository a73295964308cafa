//! Ready-made modules.

pub mod cardinality;

pub use cardinality::CardinalityLessThan;
