//! Per-bit read-back of variable signals.

use serde::{Deserialize, Serialize};
use std::fmt;
use sword_core::LBool;

/// Value of one bit in a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitValue {
    /// Assigned false.
    Zero,
    /// Assigned true.
    One,
    /// Left unassigned; any value satisfies the constraints.
    DontCare,
}

impl BitValue {
    /// `0`, `1`, or `-1` for don't-care.
    #[must_use]
    pub fn as_int(self) -> i8 {
        match self {
            BitValue::Zero => 0,
            BitValue::One => 1,
            BitValue::DontCare => -1,
        }
    }
}

impl From<LBool> for BitValue {
    fn from(value: LBool) -> Self {
        match value {
            LBool::True => BitValue::One,
            LBool::False => BitValue::Zero,
            LBool::Undef => BitValue::DontCare,
        }
    }
}

/// Bits of a variable, index 0 least significant, last index the sign bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalAssignment {
    bits: Vec<BitValue>,
}

impl SignalAssignment {
    /// Wrap bits given least significant first.
    #[must_use]
    pub fn new(bits: Vec<BitValue>) -> Self {
        Self { bits }
    }

    /// The bits, least significant first.
    #[must_use]
    pub fn bits(&self) -> &[BitValue] {
        &self.bits
    }

    /// Number of bits.
    #[must_use]
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// The sign bit.
    #[must_use]
    pub fn sign(&self) -> Option<BitValue> {
        self.bits.last().copied()
    }

    /// Whether no bit is don't-care.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.bits.contains(&BitValue::DontCare)
    }

    /// The `{0, 1, -1}` encoding of each bit.
    #[must_use]
    pub fn as_ints(&self) -> Vec<i8> {
        self.bits.iter().map(|b| b.as_int()).collect()
    }

    /// Number of bits assigned one.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b == BitValue::One).count()
    }

    /// Unsigned value, don't-care bits read as zero. `None` above 64 bits.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        if self.bits.len() > 64 {
            return None;
        }
        Some(
            self.bits
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == BitValue::One)
                .fold(0u64, |acc, (i, _)| acc | (1 << i)),
        )
    }

    /// Two's complement value, don't-care bits read as zero. `None` above
    /// 64 bits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        let raw = self.to_u64()?;
        let width = self.bits.len() as u32;
        if width == 0 || width == 64 {
            return Some(raw as i64);
        }
        let shift = 64 - width;
        Some(((raw << shift) as i64) >> shift)
    }
}

impl fmt::Display for SignalAssignment {
    /// Most significant bit first, `x` for don't-care.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.bits.iter().rev() {
            let c = match b {
                BitValue::Zero => '0',
                BitValue::One => '1',
                BitValue::DontCare => 'x',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
