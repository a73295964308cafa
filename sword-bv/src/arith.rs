//! Word-level networks: adders, multiplier, dividers, comparators, shifters.
//!
//! Division by zero follows the SMT-LIB convention: `udiv(a, 0)` is all
//! ones and `urem(a, 0)` is `a`; the signed forms are built on absolute
//! values, which gives `sdiv(a, 0) = a < 0 ? 1 : -1`, `srem(a, 0) = a` and
//! `smod(a, 0) = a`.

use crate::gates::{Bits, Circuit};
use sword_core::Lit;
use sword_sat::ClauseSink;

impl<S: ClauseSink + ?Sized> Circuit<'_, S> {
    /// Constant word of `width` bits.
    pub fn const_word(&self, width: usize, value: bool) -> Bits {
        Bits::from_elem(self.constant(value), width)
    }

    /// Bitwise complement.
    #[must_use]
    pub fn not_word(&self, a: &[Lit]) -> Bits {
        a.iter().map(|&l| !l).collect()
    }

    /// Per-bit `s ? t : e`.
    pub fn mux_word(&mut self, s: Lit, t: &[Lit], e: &[Lit]) -> Bits {
        t.iter().zip(e).map(|(&x, &y)| self.mux(s, x, y)).collect()
    }

    /// Ripple-carry `a + b + carry_in`; returns the sum and the carry out.
    pub fn add_words(&mut self, a: &[Lit], b: &[Lit], carry_in: Lit) -> (Bits, Lit) {
        debug_assert_eq!(a.len(), b.len());
        let mut carry = carry_in;
        let mut sum = Bits::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            let (s, c) = self.full_add(x, y, carry);
            sum.push(s);
            carry = c;
        }
        (sum, carry)
    }

    /// `a + b` modulo `2^w`.
    pub fn add(&mut self, a: &[Lit], b: &[Lit]) -> Bits {
        let zero = self.fls();
        self.add_words(a, b, zero).0
    }

    /// `a - b` modulo `2^w`.
    pub fn sub(&mut self, a: &[Lit], b: &[Lit]) -> Bits {
        let not_b = self.not_word(b);
        let one = self.tru();
        self.add_words(a, &not_b, one).0
    }

    /// Two's complement negation.
    pub fn neg(&mut self, a: &[Lit]) -> Bits {
        let zero = self.const_word(a.len(), false);
        self.sub(&zero, a)
    }

    /// `a * b` truncated to the operand width. Partial products are summed
    /// column-wise with 3:2 compressors, then one ripple adder.
    pub fn mul(&mut self, a: &[Lit], b: &[Lit]) -> Bits {
        let width = a.len();
        let mut columns: Vec<Vec<Lit>> = vec![Vec::new(); width];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate().take(width - i) {
                let pp = self.and(x, y);
                if self.const_value(pp) != Some(false) {
                    columns[i + j].push(pp);
                }
            }
        }

        while columns.iter().any(|c| c.len() > 2) {
            let mut next: Vec<Vec<Lit>> = vec![Vec::new(); width];
            for k in 0..width {
                let bits = &columns[k];
                let mut i = 0;
                while i + 2 < bits.len() {
                    let (sum, carry) = self.full_add(bits[i], bits[i + 1], bits[i + 2]);
                    next[k].push(sum);
                    if k + 1 < width {
                        next[k + 1].push(carry);
                    }
                    i += 3;
                }
                next[k].extend_from_slice(&bits[i..]);
            }
            columns = next;
        }

        let zero = self.fls();
        let row_a: Bits = columns.iter().map(|c| c.first().copied().unwrap_or(zero)).collect();
        let row_b: Bits = columns.iter().map(|c| c.get(1).copied().unwrap_or(zero)).collect();
        self.add(&row_a, &row_b)
    }

    /// `a == b`
    pub fn eq_words(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let bits: Bits = a.iter().zip(b).map(|(&x, &y)| self.xnor(x, y)).collect();
        self.and_all(&bits)
    }

    /// `a == 0`
    pub fn is_zero(&mut self, a: &[Lit]) -> Lit {
        let negated = self.not_word(a);
        self.and_all(&negated)
    }

    /// Unsigned `a < b`, folded from the least significant bit upward: a
    /// higher bit decides unless the bits are equal.
    pub fn ult(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let mut lt = self.fls();
        for (&x, &y) in a.iter().zip(b) {
            let here = self.and(!x, y);
            let same = self.xnor(x, y);
            let carried = self.and(same, lt);
            lt = self.or(here, carried);
        }
        lt
    }

    /// Unsigned `a <= b`.
    pub fn ule(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        !self.ult(b, a)
    }

    /// Signed `a < b`: unsigned comparison with flipped sign bits.
    pub fn slt(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let a = flip_sign(a);
        let b = flip_sign(b);
        self.ult(&a, &b)
    }

    /// Signed `a <= b`.
    pub fn sle(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        !self.slt(b, a)
    }

    /// Restoring division. Returns `(a / b, a % b)` with the division by
    /// zero convention of this module.
    pub fn udiv_urem(&mut self, a: &[Lit], b: &[Lit]) -> (Bits, Bits) {
        let width = a.len();
        let mut rem = self.const_word(width, false);
        let mut quot = self.const_word(width, false);

        for i in (0..width).rev() {
            // shifted = rem << 1 | a[i]; rem stays below 2^(w-1-i) so no bit is lost
            let mut shifted = Bits::with_capacity(width);
            shifted.push(a[i]);
            shifted.extend_from_slice(&rem[..width - 1]);

            let fits = self.ule(b, &shifted);
            let diff = self.sub(&shifted, b);
            rem = self.mux_word(fits, &diff, &shifted);
            quot[i] = fits;
        }

        let b_zero = self.is_zero(b);
        let ones = self.const_word(width, true);
        let quot = self.mux_word(b_zero, &ones, &quot);
        let rem = self.mux_word(b_zero, a, &rem);
        (quot, rem)
    }

    /// `|a|` in two's complement.
    pub fn abs(&mut self, a: &[Lit]) -> Bits {
        let sign = a[a.len() - 1];
        let negated = self.neg(a);
        self.mux_word(sign, &negated, a)
    }

    /// Signed division rounding toward zero.
    pub fn sdiv(&mut self, a: &[Lit], b: &[Lit]) -> Bits {
        let w = a.len();
        let (abs_a, abs_b) = (self.abs(a), self.abs(b));
        let (q, _) = self.udiv_urem(&abs_a, &abs_b);
        let negate = self.xor(a[w - 1], b[w - 1]);
        let neg_q = self.neg(&q);
        self.mux_word(negate, &neg_q, &q)
    }

    /// Signed remainder; the sign follows the dividend.
    pub fn srem(&mut self, a: &[Lit], b: &[Lit]) -> Bits {
        let w = a.len();
        let (abs_a, abs_b) = (self.abs(a), self.abs(b));
        let (_, r) = self.udiv_urem(&abs_a, &abs_b);
        let neg_r = self.neg(&r);
        self.mux_word(a[w - 1], &neg_r, &r)
    }

    /// Signed modulo; the sign follows the divisor.
    pub fn smod(&mut self, a: &[Lit], b: &[Lit]) -> Bits {
        let w = a.len();
        let (a_sign, b_sign) = (a[w - 1], b[w - 1]);
        let (abs_a, abs_b) = (self.abs(a), self.abs(b));
        let (_, r) = self.udiv_urem(&abs_a, &abs_b);

        let signs_differ = self.xor(a_sign, b_sign);
        let r_zero = self.is_zero(&r);
        let adjust = self.and(signs_differ, !r_zero);
        let adjusted = self.sub(&abs_b, &r);
        let magnitude = self.mux_word(adjust, &adjusted, &r);
        let negated = self.neg(&magnitude);
        self.mux_word(b_sign, &negated, &magnitude)
    }

    /// Barrel shifter. Amount bits past `log2(width)` force the fill word.
    fn barrel(&mut self, a: &[Lit], amount: &[Lit], left: bool, fill: Lit) -> Bits {
        let width = a.len();
        let mut cur: Bits = a.iter().copied().collect();
        let mut stage = 0;
        while stage < amount.len() && (1usize << stage) < width {
            let k = 1usize << stage;
            let shifted: Bits = (0..width)
                .map(|j| {
                    if left {
                        if j >= k { cur[j - k] } else { fill }
                    } else if j + k < width {
                        cur[j + k]
                    } else {
                        fill
                    }
                })
                .collect();
            cur = self.mux_word(amount[stage], &shifted, &cur);
            stage += 1;
        }
        let overflow = self.or_all(&amount[stage..]);
        let filled = Bits::from_elem(fill, width);
        self.mux_word(overflow, &filled, &cur)
    }

    /// `a << amount`
    pub fn shl(&mut self, a: &[Lit], amount: &[Lit]) -> Bits {
        let zero = self.fls();
        self.barrel(a, amount, true, zero)
    }

    /// Logical `a >> amount`.
    pub fn lshr(&mut self, a: &[Lit], amount: &[Lit]) -> Bits {
        let zero = self.fls();
        self.barrel(a, amount, false, zero)
    }

    /// Arithmetic `a >> amount`.
    pub fn ashr(&mut self, a: &[Lit], amount: &[Lit]) -> Bits {
        let sign = a[a.len() - 1];
        self.barrel(a, amount, false, sign)
    }
}

fn flip_sign(a: &[Lit]) -> Bits {
    let mut out: Bits = a.iter().copied().collect();
    if let Some(msb) = out.last_mut() {
        *msb = !*msb;
    }
    out
}

/// `a` shifted by a constant amount; vacated positions take `fill`.
#[must_use]
pub fn shift_static(a: &[Lit], n: u32, left: bool, fill: Lit) -> Bits {
    let width = a.len();
    let n = n as usize;
    (0..width)
        .map(|j| {
            if left {
                if j >= n { a[j - n] } else { fill }
            } else if j + n < width {
                a[j + n]
            } else {
                fill
            }
        })
        .collect()
}

/// `a` rotated toward the most significant bit by `n`.
#[must_use]
pub fn rotate_left_static(a: &[Lit], n: u32) -> Bits {
    let width = a.len();
    let n = n as usize % width.max(1);
    (0..width).map(|j| a[(j + width - n) % width]).collect()
}

/// `a` rotated toward the least significant bit by `n`.
#[must_use]
pub fn rotate_right_static(a: &[Lit], n: u32) -> Bits {
    let width = a.len();
    let n = n as usize % width.max(1);
    (0..width).map(|j| a[(j + n) % width]).collect()
}
