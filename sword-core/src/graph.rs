//! Arena-allocated term DAG.
//!
//! Signals are stable `u32` indices into a [`TermGraph`]. Nodes are never
//! mutated after they are pushed, and every constructor validates its
//! arguments before touching the arena, so a failed call leaves the graph
//! exactly as it was.

use crate::constant;
use crate::error::{Result, SwordError};
use crate::opcode::{Arity, Opcode};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Handle to a node of a [`TermGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signal(u32);

impl Signal {
    /// Create a handle from a raw arena index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw arena index.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Arena index as `usize`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sort of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    /// Fixed-width bit-vector.
    BitVec(u32),
    /// Array from `index`-bit words to `element`-bit words.
    Array {
        /// Width of the index sort.
        index: u32,
        /// Width of the element sort.
        element: u32,
    },
}

impl Sort {
    /// Width of a bit-vector sort, `None` for arrays.
    #[must_use]
    pub fn bv_width(self) -> Option<u32> {
        match self {
            Sort::BitVec(w) => Some(w),
            Sort::Array { .. } => None,
        }
    }

    /// Whether this is an array sort.
    #[must_use]
    pub fn is_array(self) -> bool {
        matches!(self, Sort::Array { .. })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::BitVec(w) => write!(f, "bv{w}"),
            Sort::Array { index, element } => write!(f, "array[bv{index} -> bv{element}]"),
        }
    }
}

/// One immutable node of the term DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    op: Opcode,
    sort: Sort,
    operands: SmallVec<[Signal; 3]>,
    params: SmallVec<[u32; 2]>,
    value: Option<BigUint>,
    name: Option<String>,
}

impl Node {
    fn leaf(op: Opcode, sort: Sort) -> Self {
        Self {
            op,
            sort,
            operands: SmallVec::new(),
            params: SmallVec::new(),
            value: None,
            name: None,
        }
    }

    /// Operator kind.
    #[must_use]
    pub fn op(&self) -> Opcode {
        self.op
    }

    /// Result sort.
    #[must_use]
    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// Bit width for bit-vector nodes; arrays report their element width.
    #[must_use]
    pub fn width(&self) -> u32 {
        match self.sort {
            Sort::BitVec(w) => w,
            Sort::Array { element, .. } => element,
        }
    }

    /// Operands in construction order.
    #[must_use]
    pub fn operands(&self) -> &[Signal] {
        &self.operands
    }

    /// Numeric parameters: `[low, high]` for extract, `[n]` for
    /// repeat/rotate/extend and constant-amount shifts.
    #[must_use]
    pub fn params(&self) -> &[u32] {
        &self.params
    }

    /// Value of a constant node.
    #[must_use]
    pub fn value(&self) -> Option<&BigUint> {
        self.value.as_ref()
    }

    /// Name of a variable node.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this node is a free variable.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.op == Opcode::Variable
    }
}

/// Owner of every signal built for one solver instance.
#[derive(Debug, Default, Clone)]
pub struct TermGraph {
    nodes: Vec<Node>,
}

impl TermGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn node(&self, s: Signal) -> Result<&Node> {
        self.nodes
            .get(s.index())
            .ok_or(SwordError::UnknownSignal(s.id()))
    }

    /// Sort of a signal.
    pub fn sort(&self, s: Signal) -> Result<Sort> {
        Ok(self.node(s)?.sort)
    }

    /// Iterate over all nodes in creation order.
    pub fn signals(&self) -> impl Iterator<Item = (Signal, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (Signal::new(i as u32), n))
    }

    fn push(&mut self, node: Node) -> Signal {
        let s = Signal::new(self.nodes.len() as u32);
        self.nodes.push(node);
        s
    }

    fn bv_width(&self, s: Signal, op: Opcode) -> Result<u32> {
        match self.sort(s)? {
            Sort::BitVec(w) => Ok(w),
            Sort::Array { .. } => Err(SwordError::sort(
                op,
                format!("operand {s} is an array, expected a bit-vector"),
            )),
        }
    }

    /// Create a bit-vector variable.
    pub fn variable(&mut self, width: u32, name: impl Into<String>) -> Result<Signal> {
        if width == 0 {
            return Err(SwordError::ZeroWidth);
        }
        let mut node = Node::leaf(Opcode::Variable, Sort::BitVec(width));
        node.name = Some(name.into());
        Ok(self.push(node))
    }

    /// Create an array variable.
    pub fn array_variable(
        &mut self,
        index_width: u32,
        element_width: u32,
        name: impl Into<String>,
    ) -> Result<Signal> {
        if index_width == 0 || element_width == 0 {
            return Err(SwordError::ZeroWidth);
        }
        let sort = Sort::Array {
            index: index_width,
            element: element_width,
        };
        let mut node = Node::leaf(Opcode::Variable, sort);
        node.name = Some(name.into());
        Ok(self.push(node))
    }

    /// Create a constant from an arbitrary-precision value.
    pub fn constant(&mut self, width: u32, value: BigUint) -> Result<Signal> {
        constant::check_fits(&value, width, &value.to_string())?;
        let mut node = Node::leaf(Opcode::Constant, Sort::BitVec(width));
        node.value = Some(value);
        Ok(self.push(node))
    }

    /// Create a constant from text in base 2, 10 or 16.
    pub fn constant_from_str(&mut self, width: u32, text: &str, radix: u32) -> Result<Signal> {
        let value = constant::parse_radix(text, radix)?;
        constant::check_fits(&value, width, text)?;
        self.constant(width, value)
    }

    /// Apply a word-level operator to its operands.
    ///
    /// Parametric opcodes (extract, repeat, rotates, extensions) have their
    /// own constructors and are rejected here.
    pub fn operator(&mut self, op: Opcode, operands: &[Signal]) -> Result<Signal> {
        for &s in operands {
            self.node(s)?;
        }
        match op.arity() {
            Arity::Leaf | Arity::Parametric => {
                return Err(SwordError::parameter(
                    op,
                    "built by a dedicated constructor, not as a plain operator",
                ));
            }
            arity if !arity.accepts(operands.len()) => {
                return Err(SwordError::arity(op, arity.to_string(), operands.len()));
            }
            _ => {}
        }
        let sort = self.operator_sort(op, operands)?;
        let mut node = Node::leaf(op, sort);
        node.operands.extend_from_slice(operands);
        Ok(self.push(node))
    }

    fn operator_sort(&self, op: Opcode, operands: &[Signal]) -> Result<Sort> {
        match op {
            Opcode::Select => {
                let Sort::Array { index, element } = self.sort(operands[0])? else {
                    return Err(SwordError::sort(op, "first operand must be an array"));
                };
                self.expect_width(op, operands[1], index)?;
                Ok(Sort::BitVec(element))
            }
            Opcode::Store => {
                let sort = self.sort(operands[0])?;
                let Sort::Array { index, element } = sort else {
                    return Err(SwordError::sort(op, "first operand must be an array"));
                };
                self.expect_width(op, operands[1], index)?;
                self.expect_width(op, operands[2], element)?;
                Ok(sort)
            }
            Opcode::Ite => {
                self.expect_width(op, operands[0], 1)?;
                let w = self.bv_width(operands[1], op)?;
                self.expect_width(op, operands[2], w)?;
                Ok(Sort::BitVec(w))
            }
            Opcode::Implies => {
                self.expect_width(op, operands[0], 1)?;
                self.expect_width(op, operands[1], 1)?;
                Ok(Sort::BitVec(1))
            }
            Opcode::Concat => {
                let mut total = 0u32;
                for &s in operands {
                    total = total
                        .checked_add(self.bv_width(s, op)?)
                        .ok_or_else(|| SwordError::parameter(op, "width overflow"))?;
                }
                Ok(Sort::BitVec(total))
            }
            Opcode::Not | Opcode::Neg => Ok(Sort::BitVec(self.bv_width(operands[0], op)?)),
            Opcode::RedOr | Opcode::RedAnd => {
                self.bv_width(operands[0], op)?;
                Ok(Sort::BitVec(1))
            }
            _ => {
                // Remaining opcodes want operands of one common width.
                let w = self.bv_width(operands[0], op)?;
                for &s in &operands[1..] {
                    self.expect_width(op, s, w)?;
                }
                if op.is_logical() {
                    Ok(Sort::BitVec(1))
                } else {
                    Ok(Sort::BitVec(w))
                }
            }
        }
    }

    fn expect_width(&self, op: Opcode, s: Signal, expected: u32) -> Result<()> {
        let found = self.bv_width(s, op)?;
        if found == expected {
            Ok(())
        } else {
            Err(SwordError::WidthMismatch {
                op,
                expected,
                found,
            })
        }
    }

    fn unary_with_params(&mut self, op: Opcode, s: Signal, params: &[u32], width: u32) -> Signal {
        let mut node = Node::leaf(op, Sort::BitVec(width));
        node.operands.push(s);
        node.params.extend_from_slice(params);
        self.push(node)
    }

    /// Bits `[low, high)` of `s`.
    pub fn extract(&mut self, s: Signal, low: u32, high: u32) -> Result<Signal> {
        let width = self.bv_width(s, Opcode::Extract)?;
        if low >= high || high > width {
            return Err(SwordError::InvalidExtract { low, high, width });
        }
        Ok(self.unary_with_params(Opcode::Extract, s, &[low, high], high - low))
    }

    /// `s` concatenated with itself `n` times.
    pub fn repeat(&mut self, s: Signal, n: u32) -> Result<Signal> {
        let op = Opcode::Repeat;
        let width = self.bv_width(s, op)?;
        if n == 0 {
            return Err(SwordError::parameter(op, "repeat count must be positive"));
        }
        let total = width
            .checked_mul(n)
            .ok_or_else(|| SwordError::parameter(op, "width overflow"))?;
        Ok(self.unary_with_params(op, s, &[n], total))
    }

    /// Rotate `s` left by `n` positions, `n < width`.
    pub fn rotate_left(&mut self, s: Signal, n: u32) -> Result<Signal> {
        self.rotate(Opcode::RotateLeft, s, n)
    }

    /// Rotate `s` right by `n` positions, `n < width`.
    pub fn rotate_right(&mut self, s: Signal, n: u32) -> Result<Signal> {
        self.rotate(Opcode::RotateRight, s, n)
    }

    fn rotate(&mut self, op: Opcode, s: Signal, n: u32) -> Result<Signal> {
        let width = self.bv_width(s, op)?;
        if n >= width {
            return Err(SwordError::parameter(
                op,
                format!("rotation by {n} on a {width}-bit signal"),
            ));
        }
        Ok(self.unary_with_params(op, s, &[n], width))
    }

    /// Prefix `s` with `n` zero bits.
    pub fn zero_extend(&mut self, s: Signal, n: u32) -> Result<Signal> {
        self.extend(Opcode::ZeroExtend, s, n)
    }

    /// Prefix `s` with `n` copies of its sign bit.
    pub fn sign_extend(&mut self, s: Signal, n: u32) -> Result<Signal> {
        self.extend(Opcode::SignExtend, s, n)
    }

    fn extend(&mut self, op: Opcode, s: Signal, n: u32) -> Result<Signal> {
        let width = self.bv_width(s, op)?;
        let total = width
            .checked_add(n)
            .ok_or_else(|| SwordError::parameter(op, "width overflow"))?;
        Ok(self.unary_with_params(op, s, &[n], total))
    }

    /// Shift `s` by the constant amount `n`. `op` is one of
    /// [`Opcode::Lshl`], [`Opcode::Lshr`] or [`Opcode::Ashr`].
    pub fn shift_by(&mut self, op: Opcode, s: Signal, n: u32) -> Result<Signal> {
        if !matches!(op, Opcode::Lshl | Opcode::Lshr | Opcode::Ashr) {
            return Err(SwordError::parameter(op, "not a shift operator"));
        }
        let width = self.bv_width(s, op)?;
        Ok(self.unary_with_params(op, s, &[n], width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_xy(width: u32) -> (TermGraph, Signal, Signal) {
        let mut g = TermGraph::new();
        let x = g.variable(width, "x").unwrap();
        let y = g.variable(width, "y").unwrap();
        (g, x, y)
    }

    #[test]
    fn test_width_rules() {
        let (mut g, x, y) = graph_with_xy(8);
        let sum = g.operator(Opcode::Add, &[x, y]).unwrap();
        assert_eq!(g.sort(sum).unwrap(), Sort::BitVec(8));
        let lt = g.operator(Opcode::Slt, &[x, y]).unwrap();
        assert_eq!(g.sort(lt).unwrap(), Sort::BitVec(1));
        let cat = g.operator(Opcode::Concat, &[x, y, lt]).unwrap();
        assert_eq!(g.sort(cat).unwrap(), Sort::BitVec(17));
        let ext = g.extract(x, 2, 5).unwrap();
        assert_eq!(g.node(ext).unwrap().width(), 3);
        let sx = g.sign_extend(x, 4).unwrap();
        assert_eq!(g.node(sx).unwrap().width(), 12);
        let rep = g.repeat(lt, 3).unwrap();
        assert_eq!(g.node(rep).unwrap().width(), 3);
    }

    #[test]
    fn test_failed_construction_leaves_graph_unchanged() {
        let (mut g, x, _) = graph_with_xy(8);
        let z = g.variable(4, "z").unwrap();
        let before = g.len();

        assert_eq!(
            g.operator(Opcode::Add, &[x, z]),
            Err(SwordError::WidthMismatch {
                op: Opcode::Add,
                expected: 8,
                found: 4
            })
        );
        assert!(matches!(
            g.operator(Opcode::Not, &[x, x]),
            Err(SwordError::ArityMismatch { .. })
        ));
        assert_eq!(
            g.extract(x, 3, 3),
            Err(SwordError::InvalidExtract {
                low: 3,
                high: 3,
                width: 8
            })
        );
        assert!(g.extract(x, 0, 9).is_err());
        assert!(g.rotate_left(x, 8).is_err());
        assert!(g.repeat(x, 0).is_err());
        assert!(g.operator(Opcode::Extract, &[x]).is_err());
        assert_eq!(
            g.operator(Opcode::Add, &[x, Signal::new(99)]),
            Err(SwordError::UnknownSignal(99))
        );
        assert_eq!(g.len(), before);
    }

    #[test]
    fn test_array_sorts() {
        let mut g = TermGraph::new();
        let a = g.array_variable(3, 8, "a").unwrap();
        let i = g.variable(3, "i").unwrap();
        let v = g.variable(8, "v").unwrap();
        let stored = g.operator(Opcode::Store, &[a, i, v]).unwrap();
        assert!(g.sort(stored).unwrap().is_array());
        let read = g.operator(Opcode::Select, &[stored, i]).unwrap();
        assert_eq!(g.sort(read).unwrap(), Sort::BitVec(8));

        assert!(matches!(
            g.operator(Opcode::Select, &[a, v]),
            Err(SwordError::WidthMismatch { .. })
        ));
        assert!(matches!(
            g.operator(Opcode::Equal, &[a, a]),
            Err(SwordError::SortMismatch { .. })
        ));
    }

    #[test]
    fn test_constants() {
        let mut g = TermGraph::new();
        let c = g.constant_from_str(8, "ff", 16).unwrap();
        assert_eq!(g.node(c).unwrap().value(), Some(&BigUint::from(255u32)));
        assert!(g.constant_from_str(8, "100", 16).is_err());
        assert!(g.constant(0, BigUint::from(0u32)).is_err());
        assert!(g.constant_from_str(8, "1", 40).is_err());
        assert!(g.constant_from_str(8, "7", 8).is_err());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_implies_and_ite() {
        let (mut g, x, y) = graph_with_xy(4);
        let c = g.operator(Opcode::Ult, &[x, y]).unwrap();
        let d = g.operator(Opcode::Ule, &[x, y]).unwrap();
        assert!(g.operator(Opcode::Implies, &[c, d]).is_ok());
        assert!(g.operator(Opcode::Implies, &[x, d]).is_err());
        let ite = g.operator(Opcode::Ite, &[c, x, y]).unwrap();
        assert_eq!(g.sort(ite).unwrap(), Sort::BitVec(4));
        assert!(g.operator(Opcode::Ite, &[x, x, y]).is_err());
    }
}
