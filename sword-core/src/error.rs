//! Error types shared across the Sword crates.

use crate::opcode::Opcode;
use thiserror::Error;

/// Result alias used by every fallible Sword API.
pub type Result<T> = std::result::Result<T, SwordError>;

/// Errors reported by term construction, solving and module supervision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwordError {
    /// Operands of a width-sensitive operator disagree.
    #[error("width mismatch in {op}: expected {expected} bits, found {found}")]
    WidthMismatch {
        /// Operator being built.
        op: Opcode,
        /// Width required by the first operand or the operator.
        expected: u32,
        /// Offending width.
        found: u32,
    },

    /// Wrong number of operands for an operator.
    #[error("arity mismatch in {op}: expected {expected} operands, found {found}")]
    ArityMismatch {
        /// Operator being built.
        op: Opcode,
        /// Human readable arity ("2", "at least 2", ...).
        expected: String,
        /// Number supplied.
        found: usize,
    },

    /// Extract bounds are empty or exceed the operand.
    #[error("invalid extract [{low}, {high}) from a {width}-bit signal")]
    InvalidExtract {
        /// Inclusive lower bit.
        low: u32,
        /// Exclusive upper bit.
        high: u32,
        /// Width of the operand.
        width: u32,
    },

    /// A numeric parameter of repeat/rotate/shift/extend is out of range.
    #[error("invalid parameter for {op}: {reason}")]
    InvalidParameter {
        /// Operator being built.
        op: Opcode,
        /// What went wrong.
        reason: String,
    },

    /// Signals must be at least one bit wide.
    #[error("bit-vectors must have a positive width")]
    ZeroWidth,

    /// An operand has the wrong sort (array where a bit-vector is expected, etc.).
    #[error("sort mismatch in {op}: {reason}")]
    SortMismatch {
        /// Operator being built.
        op: Opcode,
        /// What went wrong.
        reason: String,
    },

    /// A constant literal could not be parsed or does not fit its width.
    #[error("invalid constant '{value}': {reason}")]
    InvalidConstant {
        /// The text or number supplied.
        value: String,
        /// What went wrong.
        reason: String,
    },

    /// The signal handle does not belong to this term graph.
    #[error("unknown signal #{0}")]
    UnknownSignal(u32),

    /// Assertions and assumptions need a single-bit signal.
    #[error("expected a 1-bit signal, found {width} bits")]
    NotBoolean {
        /// Width of the offending signal.
        width: u32,
    },

    /// Only free variables have a readable assignment.
    #[error("signal #{0} is not a bit-vector variable")]
    NotAVariable(u32),

    /// No satisfying assignment is available (last solve was UNSAT or none ran).
    #[error("no model available: the last solve() did not return SAT")]
    NoModel,

    /// A registered module broke the propagator protocol; search was aborted.
    #[error("module '{module}' violated the propagator contract: {reason}")]
    ModuleViolation {
        /// Name reported by the module.
        module: String,
        /// What went wrong.
        reason: String,
    },

    /// The engine stopped without a verdict and no module reported why.
    #[error("search aborted without a verdict")]
    SearchAborted,

    /// Writing the call transcript failed.
    #[error("transcript write failed: {0}")]
    TranscriptIo(String),
}

impl SwordError {
    /// Shorthand for [`SwordError::ArityMismatch`].
    pub fn arity(op: Opcode, expected: impl Into<String>, found: usize) -> Self {
        SwordError::ArityMismatch {
            op,
            expected: expected.into(),
            found,
        }
    }

    /// Shorthand for [`SwordError::InvalidParameter`].
    pub fn parameter(op: Opcode, reason: impl Into<String>) -> Self {
        SwordError::InvalidParameter {
            op,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`SwordError::SortMismatch`].
    pub fn sort(op: Opcode, reason: impl Into<String>) -> Self {
        SwordError::SortMismatch {
            op,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`SwordError::InvalidConstant`].
    pub fn constant(value: impl Into<String>, reason: impl Into<String>) -> Self {
        SwordError::InvalidConstant {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised while building terms.
    #[must_use]
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            SwordError::WidthMismatch { .. }
                | SwordError::ArityMismatch { .. }
                | SwordError::InvalidExtract { .. }
                | SwordError::InvalidParameter { .. }
                | SwordError::ZeroWidth
                | SwordError::SortMismatch { .. }
                | SwordError::InvalidConstant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SwordError::WidthMismatch {
            op: Opcode::Add,
            expected: 8,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "width mismatch in +: expected 8 bits, found 4"
        );
        assert!(err.is_construction_error());
        assert!(!SwordError::NoModel.is_construction_error());
        assert!(!SwordError::SearchAborted.is_construction_error());
        assert_eq!(
            SwordError::SearchAborted.to_string(),
            "search aborted without a verdict"
        );
    }
}
