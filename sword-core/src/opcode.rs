//! The word-level operator catalog.
//!
//! Every [`Signal`](crate::Signal) carries one [`Opcode`]. The catalog answers
//! the static questions the term graph and the encoder ask about an operator:
//! how many operands it takes, whether operand order matters, and whether it
//! produces a word (arithmetic class) or a single truth bit (logical class).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Word-level operator kinds, including the pseudo-opcodes for leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Opcode {
    /// Free variable (bit-vector or array).
    Variable,
    /// Literal constant.
    Constant,
    /// `a = b`
    Equal,
    /// `a != b`
    Nequal,
    /// Pairwise disequality of all operands.
    Distinct,
    /// `a => b` over single bits.
    Implies,
    /// Signed `<`.
    Slt,
    /// Signed `<=`.
    Sle,
    /// Unsigned `<`.
    Ult,
    /// Unsigned `<=`.
    Ule,
    /// Signed `>`.
    Sgt,
    /// Signed `>=`.
    Sge,
    /// Unsigned `>`.
    Ugt,
    /// Unsigned `>=`.
    Uge,
    /// Bitwise complement.
    Not,
    /// `if c then a else b`, with a single-bit condition.
    Ite,
    /// Two's complement negation.
    Neg,
    /// Modular addition.
    Add,
    /// Modular subtraction.
    Sub,
    /// Modular multiplication, truncated to the operand width.
    Mul,
    /// Signed division, rounding toward zero.
    Sdiv,
    /// Signed remainder, sign follows the dividend.
    Srem,
    /// Signed modulo, sign follows the divisor.
    Smod,
    /// Unsigned division.
    Udiv,
    /// Unsigned remainder.
    Urem,
    /// Bitwise and.
    And,
    /// Bitwise nand.
    Nand,
    /// Bitwise or.
    Or,
    /// Bitwise nor.
    Nor,
    /// Bitwise xor.
    Xor,
    /// Bitwise xnor.
    Xnor,
    /// Logical shift left.
    Lshl,
    /// Logical shift right.
    Lshr,
    /// Arithmetic shift right.
    Ashr,
    /// Or-reduction to one bit.
    RedOr,
    /// And-reduction to one bit.
    RedAnd,
    /// Concatenation, first operand most significant.
    Concat,
    /// Bit range `[low, high)`.
    Extract,
    /// Repeated concatenation.
    Repeat,
    /// Rotation toward the most significant bit.
    RotateLeft,
    /// Rotation toward the least significant bit.
    RotateRight,
    /// Array read.
    Select,
    /// Array write.
    Store,
    /// Prefix with copies of the sign bit.
    SignExtend,
    /// Prefix with zeros.
    ZeroExtend,
}

/// Operand count accepted by an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// A leaf; built by a dedicated constructor, never by `add_operator`.
    Leaf,
    /// Exactly this many operands.
    Exactly(usize),
    /// This many operands or more.
    AtLeast(usize),
    /// One operand plus numeric parameters; built by a dedicated constructor.
    Parametric,
}

impl Arity {
    /// Whether `n` operands are accepted.
    #[must_use]
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Leaf => n == 0,
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Parametric => n == 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Leaf => write!(f, "0"),
            Arity::Exactly(k) => write!(f, "{k}"),
            Arity::AtLeast(k) => write!(f, "at least {k}"),
            Arity::Parametric => write!(f, "1 (with parameters)"),
        }
    }
}

impl Opcode {
    /// Every opcode, in declaration order.
    pub const ALL: [Opcode; 45] = [
        Opcode::Variable,
        Opcode::Constant,
        Opcode::Equal,
        Opcode::Nequal,
        Opcode::Distinct,
        Opcode::Implies,
        Opcode::Slt,
        Opcode::Sle,
        Opcode::Ult,
        Opcode::Ule,
        Opcode::Sgt,
        Opcode::Sge,
        Opcode::Ugt,
        Opcode::Uge,
        Opcode::Not,
        Opcode::Ite,
        Opcode::Neg,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Sdiv,
        Opcode::Srem,
        Opcode::Smod,
        Opcode::Udiv,
        Opcode::Urem,
        Opcode::And,
        Opcode::Nand,
        Opcode::Or,
        Opcode::Nor,
        Opcode::Xor,
        Opcode::Xnor,
        Opcode::Lshl,
        Opcode::Lshr,
        Opcode::Ashr,
        Opcode::RedOr,
        Opcode::RedAnd,
        Opcode::Concat,
        Opcode::Extract,
        Opcode::Repeat,
        Opcode::RotateLeft,
        Opcode::RotateRight,
        Opcode::Select,
        Opcode::Store,
        Opcode::SignExtend,
        Opcode::ZeroExtend,
    ];

    /// Operand order does not affect the result.
    #[must_use]
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Opcode::And
                | Opcode::Nand
                | Opcode::Or
                | Opcode::Nor
                | Opcode::Xor
                | Opcode::Xnor
                | Opcode::Equal
                | Opcode::Nequal
                | Opcode::Distinct
                | Opcode::Add
                | Opcode::Mul
        )
    }

    /// Bitwise or numeric operator producing a word.
    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Opcode::And
                | Opcode::Nand
                | Opcode::Or
                | Opcode::Nor
                | Opcode::Xor
                | Opcode::Xnor
                | Opcode::Add
                | Opcode::Mul
                | Opcode::Sub
                | Opcode::Sdiv
                | Opcode::Udiv
                | Opcode::Srem
                | Opcode::Smod
                | Opcode::Urem
                | Opcode::Neg
                | Opcode::Lshl
                | Opcode::Lshr
                | Opcode::Ashr
                | Opcode::Not
        )
    }

    /// Operator producing a single truth bit.
    #[must_use]
    pub fn is_logical(self) -> bool {
        matches!(
            self,
            Opcode::Equal
                | Opcode::Nequal
                | Opcode::Ugt
                | Opcode::Ult
                | Opcode::Uge
                | Opcode::Ule
                | Opcode::Sgt
                | Opcode::Slt
                | Opcode::Sge
                | Opcode::Sle
                | Opcode::Distinct
                | Opcode::Implies
                | Opcode::RedOr
                | Opcode::RedAnd
        )
    }

    /// Bitwise opcodes that fold over two or more operands.
    #[must_use]
    pub fn is_bitwise_nary(self) -> bool {
        matches!(
            self,
            Opcode::And | Opcode::Nand | Opcode::Or | Opcode::Nor | Opcode::Xor | Opcode::Xnor
        )
    }

    /// Accepted operand count.
    #[must_use]
    pub fn arity(self) -> Arity {
        match self {
            Opcode::Variable | Opcode::Constant => Arity::Leaf,
            Opcode::Not | Opcode::Neg | Opcode::RedOr | Opcode::RedAnd => Arity::Exactly(1),
            Opcode::Extract
            | Opcode::Repeat
            | Opcode::RotateLeft
            | Opcode::RotateRight
            | Opcode::SignExtend
            | Opcode::ZeroExtend => Arity::Parametric,
            Opcode::Ite | Opcode::Store => Arity::Exactly(3),
            Opcode::Distinct | Opcode::Concat => Arity::AtLeast(2),
            op if op.is_bitwise_nary() => Arity::AtLeast(2),
            _ => Arity::Exactly(2),
        }
    }

    /// Short operator symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Opcode::Variable => "var",
            Opcode::Constant => "const",
            Opcode::Equal => "=",
            Opcode::Nequal => "!=",
            Opcode::Distinct => "distinct",
            Opcode::Implies => "=>",
            Opcode::Sgt => ">s",
            Opcode::Ugt => ">u",
            Opcode::Slt => "<s",
            Opcode::Ult => "<u",
            Opcode::Sge => ">=s",
            Opcode::Uge => ">=u",
            Opcode::Sle => "<=s",
            Opcode::Ule => "<=u",
            Opcode::Not => "not",
            Opcode::Neg => "-",
            Opcode::Ite => "ite",
            Opcode::And => "and",
            Opcode::Nand => "nand",
            Opcode::Or => "or",
            Opcode::Nor => "nor",
            Opcode::Xor => "xor",
            Opcode::Xnor => "xnor",
            Opcode::Add => "+",
            Opcode::Sub => "-",
            Opcode::Mul => "*",
            Opcode::Sdiv => "/s",
            Opcode::Udiv => "/u",
            Opcode::Smod => "%",
            Opcode::Srem => "rem s",
            Opcode::Urem => "rem u",
            Opcode::Lshl => "<<",
            Opcode::Lshr => ">>",
            Opcode::Ashr => ">>a",
            Opcode::RedOr => "red_or",
            Opcode::RedAnd => "red_and",
            Opcode::Concat => "++",
            Opcode::Extract => "extract",
            Opcode::Repeat => "rep",
            Opcode::RotateLeft => "rot_l",
            Opcode::RotateRight => "rot_r",
            Opcode::Select => "select",
            Opcode::Store => "store",
            Opcode::SignExtend => "sgn_ext",
            Opcode::ZeroExtend => "zero_ext",
        }
    }

    /// Unambiguous upper-case name.
    #[must_use]
    pub fn strict_name(self) -> &'static str {
        match self {
            Opcode::Variable => "VAR",
            Opcode::Constant => "CONST",
            Opcode::Equal => "EQUAL",
            Opcode::Nequal => "NEQUAL",
            Opcode::Distinct => "DISTINCT",
            Opcode::Implies => "IMPLIES",
            Opcode::Slt => "SLT",
            Opcode::Sle => "SLE",
            Opcode::Ult => "ULT",
            Opcode::Ule => "ULE",
            Opcode::Sgt => "SGT",
            Opcode::Sge => "SGE",
            Opcode::Ugt => "UGT",
            Opcode::Uge => "UGE",
            Opcode::Not => "NOT",
            Opcode::Ite => "ITE",
            Opcode::Neg => "NEG",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Sdiv => "SDIV",
            Opcode::Srem => "SREM",
            Opcode::Smod => "SMOD",
            Opcode::Udiv => "UDIV",
            Opcode::Urem => "UREM",
            Opcode::And => "AND",
            Opcode::Nand => "NAND",
            Opcode::Or => "OR",
            Opcode::Nor => "NOR",
            Opcode::Xor => "XOR",
            Opcode::Xnor => "XNOR",
            Opcode::Lshl => "LSHL",
            Opcode::Lshr => "LSHR",
            Opcode::Ashr => "ASHR",
            Opcode::RedOr => "RED_OR",
            Opcode::RedAnd => "RED_AND",
            Opcode::Concat => "CONCAT",
            Opcode::Extract => "EXTRACT",
            Opcode::Repeat => "REPEAT",
            Opcode::RotateLeft => "ROTATE_LEFT",
            Opcode::RotateRight => "ROTATE_RIGHT",
            Opcode::Select => "SELECT",
            Opcode::Store => "STORE",
            Opcode::SignExtend => "SIGN_EXTEND",
            Opcode::ZeroExtend => "ZERO_EXTEND",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
