//! Boolean variables, literals and three-valued assignments.
//!
//! These are shared by the SAT engine, the bit-blaster and the module bridge,
//! which is why they live here rather than in `sword-sat`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// A Boolean decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Var(u32);

impl Var {
    /// Create a variable from its index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Index of the variable, usable for dense per-variable tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw variable number.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A literal: a variable together with a polarity.
///
/// Encoded as `var << 1 | sign` so that a literal and its complement are
/// adjacent, which keeps watch lists indexable by `Lit::index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lit(u32);

impl Lit {
    /// Positive literal of `var`.
    #[must_use]
    pub const fn pos(var: Var) -> Self {
        Self(var.0 << 1)
    }

    /// Negative literal of `var`.
    #[must_use]
    pub const fn neg(var: Var) -> Self {
        Self((var.0 << 1) | 1)
    }

    /// Literal of `var` that is true when the variable has value `value`.
    #[must_use]
    pub const fn with_polarity(var: Var, value: bool) -> Self {
        if value { Self::pos(var) } else { Self::neg(var) }
    }

    /// The underlying variable.
    #[must_use]
    pub const fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    /// True for a negated literal.
    #[must_use]
    pub const fn is_neg(self) -> bool {
        (self.0 & 1) != 0
    }

    /// True for a non-negated literal.
    #[must_use]
    pub const fn is_pos(self) -> bool {
        (self.0 & 1) == 0
    }

    /// The complementary literal.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Dense index over both polarities.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw encoded value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Rebuild a literal from [`Lit::raw`].
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// True when `self` and `other` are the two polarities of one variable.
    #[must_use]
    pub const fn is_complement_of(self, other: Lit) -> bool {
        self.0 ^ other.0 == 1
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        self.negate()
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pos() {
            write!(f, "{}", self.var().raw())
        } else {
            write!(f, "-{}", self.var().raw())
        }
    }
}

/// Three-valued assignment of a variable or literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LBool {
    /// Assigned true.
    True,
    /// Assigned false.
    False,
    /// Not assigned at the current search state.
    #[default]
    Undef,
}

impl LBool {
    /// Lift a Boolean.
    #[must_use]
    pub const fn from_bool(b: bool) -> Self {
        if b { LBool::True } else { LBool::False }
    }

    /// True only for [`LBool::True`].
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, LBool::True)
    }

    /// True only for [`LBool::False`].
    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, LBool::False)
    }

    /// True only for [`LBool::Undef`].
    #[must_use]
    pub const fn is_undef(self) -> bool {
        matches!(self, LBool::Undef)
    }

    /// Value seen through a literal of the given polarity.
    #[must_use]
    pub const fn under(self, lit: Lit) -> Self {
        match (self, lit.is_neg()) {
            (LBool::Undef, _) => LBool::Undef,
            (v, false) => v,
            (LBool::True, true) => LBool::False,
            (LBool::False, true) => LBool::True,
        }
    }
}

impl Not for LBool {
    type Output = LBool;

    fn not(self) -> LBool {
        match self {
            LBool::True => LBool::False,
            LBool::False => LBool::True,
            LBool::Undef => LBool::Undef,
        }
    }
}
