//! Boolean gate library with constant folding and structural hashing.
//!
//! A [`Circuit`] writes Tseitin clauses into any [`ClauseSink`]. Gates whose
//! inputs are constants or trivially related fold without new variables, and
//! identical gates over identical inputs are built once per blaster.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use sword_core::Lit;
use sword_sat::ClauseSink;

/// Literals of a word, least significant bit first.
pub type Bits = SmallVec<[Lit; 32]>;

/// Structural key of a two- or three-input gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKey {
    /// `a & b`, inputs ordered.
    And(Lit, Lit),
    /// `a ^ b`, both inputs positive and ordered.
    Xor(Lit, Lit),
    /// `s ? t : e`, selector positive.
    Mux(Lit, Lit, Lit),
}

/// Gates built so far, keyed by structure.
pub type GateCache = FxHashMap<GateKey, Lit>;

/// Gate builder over a clause sink.
pub struct Circuit<'a, S: ClauseSink + ?Sized> {
    sink: &'a mut S,
    tru: Lit,
    cache: &'a mut GateCache,
}

impl<'a, S: ClauseSink + ?Sized> Circuit<'a, S> {
    /// Wrap `sink`. `tru` must be a literal asserted true in the sink.
    pub fn new(sink: &'a mut S, tru: Lit, cache: &'a mut GateCache) -> Self {
        Self { sink, tru, cache }
    }

    /// The constant-true literal.
    #[must_use]
    pub fn tru(&self) -> Lit {
        self.tru
    }

    /// The constant-false literal.
    #[must_use]
    pub fn fls(&self) -> Lit {
        !self.tru
    }

    /// Literal for a constant bit.
    #[must_use]
    pub fn constant(&self, value: bool) -> Lit {
        if value { self.tru } else { !self.tru }
    }

    /// `Some(b)` when `lit` is one of the constant literals.
    #[must_use]
    pub fn const_value(&self, lit: Lit) -> Option<bool> {
        if lit == self.tru {
            Some(true)
        } else if lit == !self.tru {
            Some(false)
        } else {
            None
        }
    }

    /// A fresh unconstrained literal.
    pub fn fresh(&mut self) -> Lit {
        Lit::pos(self.sink.new_var())
    }

    /// `width` fresh literals.
    pub fn fresh_word(&mut self, width: usize) -> Bits {
        (0..width).map(|_| self.fresh()).collect()
    }

    /// Add a clause.
    pub fn clause(&mut self, lits: &[Lit]) {
        self.sink.add_clause(lits);
    }

    /// `a & b`
    pub fn and(&mut self, a: Lit, b: Lit) -> Lit {
        match (self.const_value(a), self.const_value(b)) {
            (Some(false), _) | (_, Some(false)) => return self.fls(),
            (Some(true), _) => return b,
            (_, Some(true)) => return a,
            _ => {}
        }
        if a == b {
            return a;
        }
        if a.is_complement_of(b) {
            return self.fls();
        }
        let key = GateKey::And(a.min(b), a.max(b));
        if let Some(&out) = self.cache.get(&key) {
            return out;
        }
        let out = self.fresh();
        self.clause(&[!out, a]);
        self.clause(&[!out, b]);
        self.clause(&[out, !a, !b]);
        self.cache.insert(key, out);
        out
    }

    /// `a | b`
    pub fn or(&mut self, a: Lit, b: Lit) -> Lit {
        !self.and(!a, !b)
    }

    /// `a => b`
    pub fn implies(&mut self, a: Lit, b: Lit) -> Lit {
        self.or(!a, b)
    }

    /// `a ^ b`
    pub fn xor(&mut self, a: Lit, b: Lit) -> Lit {
        match (self.const_value(a), self.const_value(b)) {
            (Some(x), _) => return if x { !b } else { b },
            (_, Some(y)) => return if y { !a } else { a },
            _ => {}
        }
        if a == b {
            return self.fls();
        }
        if a.is_complement_of(b) {
            return self.tru;
        }
        // xor(!a, b) = !xor(a, b)
        let flip = a.is_neg() != b.is_neg();
        let (pa, pb) = (Lit::pos(a.var()), Lit::pos(b.var()));
        let key = GateKey::Xor(pa.min(pb), pa.max(pb));
        let out = match self.cache.get(&key) {
            Some(&out) => out,
            None => {
                let out = self.fresh();
                self.clause(&[!out, !pa, !pb]);
                self.clause(&[!out, pa, pb]);
                self.clause(&[out, !pa, pb]);
                self.clause(&[out, pa, !pb]);
                self.cache.insert(key, out);
                out
            }
        };
        if flip { !out } else { out }
    }

    /// `a <=> b`
    pub fn xnor(&mut self, a: Lit, b: Lit) -> Lit {
        !self.xor(a, b)
    }

    /// `s ? t : e`
    pub fn mux(&mut self, s: Lit, t: Lit, e: Lit) -> Lit {
        if let Some(sel) = self.const_value(s) {
            return if sel { t } else { e };
        }
        if s.is_neg() {
            return self.mux(!s, e, t);
        }
        if t == e {
            return t;
        }
        match (self.const_value(t), self.const_value(e)) {
            (Some(true), _) => return self.or(s, e),
            (Some(false), _) => return self.and(!s, e),
            (_, Some(true)) => return self.or(!s, t),
            (_, Some(false)) => return self.and(s, t),
            _ => {}
        }
        if t.is_complement_of(e) {
            return self.xnor(s, t);
        }
        if t == s {
            return self.or(s, e);
        }
        if e == s {
            return self.and(s, t);
        }
        if t == !s {
            return self.and(!s, e);
        }
        if e == !s {
            return self.or(!s, t);
        }
        let key = GateKey::Mux(s, t, e);
        if let Some(&out) = self.cache.get(&key) {
            return out;
        }
        let out = self.fresh();
        self.clause(&[!s, !t, out]);
        self.clause(&[!s, t, !out]);
        self.clause(&[s, !e, out]);
        self.clause(&[s, e, !out]);
        // redundant, strengthens propagation when t = e
        self.clause(&[!t, !e, out]);
        self.clause(&[t, e, !out]);
        self.cache.insert(key, out);
        out
    }

    /// Conjunction of any number of literals.
    pub fn and_all(&mut self, lits: &[Lit]) -> Lit {
        let mut inputs: SmallVec<[Lit; 16]> = SmallVec::new();
        for &l in lits {
            match self.const_value(l) {
                Some(true) => {}
                Some(false) => return self.fls(),
                None => inputs.push(l),
            }
        }
        inputs.sort_unstable();
        inputs.dedup();
        if inputs.windows(2).any(|w| w[0].is_complement_of(w[1])) {
            return self.fls();
        }
        match inputs.as_slice() {
            [] => self.tru,
            [single] => *single,
            [a, b] => self.and(*a, *b),
            _ => {
                let out = self.fresh();
                let mut big: SmallVec<[Lit; 16]> = SmallVec::with_capacity(inputs.len() + 1);
                big.push(out);
                for &l in &inputs {
                    self.clause(&[!out, l]);
                    big.push(!l);
                }
                self.clause(&big);
                out
            }
        }
    }

    /// Disjunction of any number of literals.
    pub fn or_all(&mut self, lits: &[Lit]) -> Lit {
        let negated: SmallVec<[Lit; 16]> = lits.iter().map(|&l| !l).collect();
        !self.and_all(&negated)
    }

    /// `(a ^ b ^ c, majority(a, b, c))`
    pub fn full_add(&mut self, a: Lit, b: Lit, c: Lit) -> (Lit, Lit) {
        let a_xor_b = self.xor(a, b);
        let sum = self.xor(a_xor_b, c);
        let and_ab = self.and(a, b);
        let and_c = self.and(c, a_xor_b);
        let carry = self.or(and_ab, and_c);
        (sum, carry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sword_sat::{Solver, SolverResult};

    fn setup() -> (Solver, Lit, GateCache) {
        let mut sat = Solver::new();
        let t = Lit::pos(sat.new_var());
        sat.add_clause([t]);
        (sat, t, GateCache::default())
    }

    /// Every input combination forces the gate output to `f(inputs)`.
    fn check_truth_table(
        arity: usize,
        build: impl Fn(&mut Circuit<'_, Solver>, &[Lit]) -> Lit,
        f: impl Fn(&[bool]) -> bool,
    ) {
        let (mut sat, t, mut cache) = setup();
        let inputs: Vec<Lit> = (0..arity).map(|_| Lit::pos(sat.new_var())).collect();
        let out = {
            let mut c = Circuit::new(&mut sat, t, &mut cache);
            build(&mut c, &inputs)
        };
        for row in 0..(1u32 << arity) {
            let values: Vec<bool> = (0..arity).map(|i| row >> i & 1 == 1).collect();
            let mut assumptions: Vec<Lit> = inputs
                .iter()
                .zip(&values)
                .map(|(&l, &v)| if v { l } else { !l })
                .collect();
            let expected = f(&values);
            assumptions.push(if expected { !out } else { out });
            assert_eq!(
                sat.solve_with_assumptions(&assumptions),
                SolverResult::Unsat,
                "row {values:?}"
            );
        }
    }

    #[test]
    fn test_basic_gates() {
        check_truth_table(2, |c, i| c.and(i[0], i[1]), |v| v[0] && v[1]);
        check_truth_table(2, |c, i| c.or(i[0], i[1]), |v| v[0] || v[1]);
        check_truth_table(2, |c, i| c.xor(!i[0], i[1]), |v| !v[0] ^ v[1]);
        check_truth_table(2, |c, i| c.implies(i[0], i[1]), |v| !v[0] || v[1]);
        check_truth_table(3, |c, i| c.mux(i[0], i[1], i[2]), |v| {
            if v[0] { v[1] } else { v[2] }
        });
        check_truth_table(3, |c, i| c.mux(!i[0], i[1], i[2]), |v| {
            if v[0] { v[2] } else { v[1] }
        });
        check_truth_table(4, |c, i| c.and_all(i), |v| v.iter().all(|&b| b));
        check_truth_table(4, |c, i| c.or_all(i), |v| v.iter().any(|&b| b));
        check_truth_table(3, |c, i| c.full_add(i[0], i[1], i[2]).1, |v| {
            v.iter().filter(|&&b| b).count() >= 2
        });
    }

    #[test]
    fn test_folding_and_sharing() {
        let (mut sat, t, mut cache) = setup();
        let a = Lit::pos(sat.new_var());
        let b = Lit::pos(sat.new_var());
        let before = sat.num_vars();
        let mut c = Circuit::new(&mut sat, t, &mut cache);
        assert_eq!(c.and(a, c.tru()), a);
        assert_eq!(c.and(a, !a), c.fls());
        assert_eq!(c.xor(a, c.tru()), !a);
        assert_eq!(c.mux(c.fls(), a, b), b);
        assert_eq!(c.mux(a, b, b), b);
        let g1 = c.and(a, b);
        let g2 = c.and(b, a);
        assert_eq!(g1, g2);
        let x1 = c.xor(!a, b);
        let x2 = c.xor(a, b);
        assert_eq!(x1, !x2);
        assert_eq!(sat.num_vars(), before + 2);
    }
}
