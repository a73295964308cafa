//! Array reads over write histories.
//!
//! `select(store(a, j, v), i)` lowers to `i == j ? v : select(a, i)` down to
//! the base array variable. Reads of a base array get fresh element words,
//! tied together by congruence: equal indices imply equal elements. Index
//! equality is always encoded as a circuit; only literally identical or
//! constant-disequal indices are decided while encoding.

use crate::gates::{Bits, Circuit};
use rustc_hash::FxHashMap;
use sword_core::{Lit, Opcode, Result, Signal, SwordError, TermGraph};
use sword_sat::ClauseSink;

/// Reads performed on each base array variable.
#[derive(Debug, Default, Clone)]
pub struct ReadLog {
    reads: FxHashMap<Signal, Vec<(Bits, Bits)>>,
    count: u64,
}

impl ReadLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of distinct base reads.
    #[must_use]
    pub fn num_reads(&self) -> u64 {
        self.count
    }

    /// Element word of `base[index]`, consistent with every earlier read.
    pub fn read<S: ClauseSink + ?Sized>(
        &mut self,
        c: &mut Circuit<'_, S>,
        base: Signal,
        index: &[Lit],
        width: usize,
    ) -> Bits {
        let earlier = self.reads.entry(base).or_default();
        if let Some((_, value)) = earlier.iter().find(|(j, _)| j.as_slice() == index) {
            return value.clone();
        }

        let value = c.fresh_word(width);
        for (j, v) in earlier.iter() {
            let same = c.eq_words(index, j);
            if c.const_value(same) == Some(false) {
                continue;
            }
            for (&x, &y) in value.iter().zip(v) {
                c.clause(&[!same, !x, y]);
                c.clause(&[!same, x, !y]);
            }
        }
        earlier.push((index.iter().copied().collect(), value.clone()));
        self.count += 1;
        value
    }
}

/// Lower `select(array, index)`. `word` yields the bits of already encoded
/// bit-vector signals.
pub fn select<S: ClauseSink + ?Sized>(
    c: &mut Circuit<'_, S>,
    graph: &TermGraph,
    word: impl Fn(Signal) -> Result<Bits>,
    log: &mut ReadLog,
    array: Signal,
    index: &[Lit],
    width: usize,
) -> Result<Bits> {
    let mut writes: Vec<(Bits, Bits)> = Vec::new();
    let mut cur = array;
    loop {
        let node = graph.node(cur)?;
        match node.op() {
            Opcode::Store => {
                let ops = node.operands();
                writes.push((word(ops[1])?, word(ops[2])?));
                cur = ops[0];
            }
            Opcode::Variable if node.sort().is_array() => break,
            op => {
                return Err(SwordError::sort(
                    op,
                    "arrays are built from array variables and stores only",
                ));
            }
        }
    }

    let mut value = log.read(c, cur, index, width);
    // innermost write first, so the outermost store wins
    for (j, v) in writes.iter().rev() {
        let hit = c.eq_words(index, j);
        value = c.mux_word(hit, v, &value);
    }
    Ok(value)
}
