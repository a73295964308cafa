//! Word-level identities, proved by refuting their negation.

use proptest::prelude::*;
use sword_solver::{Opcode, Signal, Solver};

/// Solve with `claim` assumed false; the identity holds iff that is UNSAT.
fn holds(solver: &mut Solver, claim: Signal) -> bool {
    solver.add_assumption(claim, false).unwrap();
    !solver.solve().unwrap()
}

fn op(solver: &mut Solver, op: Opcode, args: &[Signal]) -> Signal {
    solver.add_operator(op, args).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_sub_is_add_of_negation(w in 1u32..=6) {
        let mut s = Solver::new();
        let x = s.add_variable(w, "x").unwrap();
        let y = s.add_variable(w, "y").unwrap();
        let lhs = op(&mut s, Opcode::Sub, &[x, y]);
        let ny = op(&mut s, Opcode::Neg, &[y]);
        let rhs = op(&mut s, Opcode::Add, &[x, ny]);
        let claim = op(&mut s, Opcode::Equal, &[lhs, rhs]);
        prop_assert!(holds(&mut s, claim));
    }

    #[test]
    fn prop_division_identity(w in 1u32..=5) {
        let mut s = Solver::new();
        let a = s.add_variable(w, "a").unwrap();
        let b = s.add_variable(w, "b").unwrap();
        let q = op(&mut s, Opcode::Udiv, &[a, b]);
        let r = op(&mut s, Opcode::Urem, &[a, b]);
        let qb = op(&mut s, Opcode::Mul, &[q, b]);
        let back = op(&mut s, Opcode::Add, &[qb, r]);
        let claim = op(&mut s, Opcode::Equal, &[back, a]);
        let zero = s.add_constant(w, 0).unwrap();
        let r_small = op(&mut s, Opcode::Ult, &[r, b]);
        let nonzero = op(&mut s, Opcode::Nequal, &[b, zero]);
        s.add_assertion(nonzero, true).unwrap();
        prop_assert!(holds(&mut s, claim));
        prop_assert!(holds(&mut s, r_small));
    }

    #[test]
    fn prop_rotations_cancel(w in 1u32..=8, n in 0u32..8) {
        let n = n % w;
        let mut s = Solver::new();
        let x = s.add_variable(w, "x").unwrap();
        let r = s.add_rotate_right(x, n).unwrap();
        let back = s.add_rotate_left(r, n).unwrap();
        let claim = op(&mut s, Opcode::Equal, &[back, x]);
        prop_assert!(holds(&mut s, claim));
    }

    #[test]
    fn prop_sign_extend_restores_sign_extended_words(w in 1u32..=5, n in 1u32..=3) {
        let mut s = Solver::new();
        let x = s.add_variable(w + n, "x").unwrap();
        let low = s.add_extract(x, 0, w).unwrap();
        let restored = s.add_sign_extend(low, n).unwrap();
        // bits w-1 .. w+n-1 of x all agree
        let top = s.add_extract(x, w - 1, w + n).unwrap();
        let ones = op(&mut s, Opcode::RedAnd, &[top]);
        let any = op(&mut s, Opcode::RedOr, &[top]);
        let zeros = op(&mut s, Opcode::Not, &[any]);
        let uniform = op(&mut s, Opcode::Or, &[ones, zeros]);
        s.add_assertion(uniform, true).unwrap();
        let claim = op(&mut s, Opcode::Equal, &[restored, x]);
        prop_assert!(holds(&mut s, claim));
    }

    #[test]
    fn prop_commuted_operands_agree(w in 1u32..=6) {
        let mut s = Solver::new();
        let x = s.add_variable(w, "x").unwrap();
        let y = s.add_variable(w, "y").unwrap();
        for commutative in [Opcode::Add, Opcode::Mul, Opcode::And, Opcode::Xnor] {
            let xy = op(&mut s, commutative, &[x, y]);
            let yx = op(&mut s, commutative, &[y, x]);
            let claim = op(&mut s, Opcode::Equal, &[xy, yx]);
            prop_assert!(holds(&mut s, claim));
        }
        prop_assert!(s.stats().structural_hits >= 4);
    }
}
