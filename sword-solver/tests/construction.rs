//! Construction errors are reported at the offending call and leave the
//! term graph untouched.

use sword_solver::{Opcode, Signal, Solver, SwordError};

fn assert_rejected(
    solver: &mut Solver,
    build: impl FnOnce(&mut Solver) -> sword_solver::Result<Signal>,
) -> SwordError {
    let before = solver.graph().len();
    let err = build(solver).unwrap_err();
    assert_eq!(solver.graph().len(), before, "graph changed after {err}");
    assert!(err.is_construction_error(), "{err}");
    err
}

#[test]
fn test_width_and_arity() {
    let mut solver = Solver::new();
    let x = solver.add_variable(8, "x").unwrap();
    let y = solver.add_variable(4, "y").unwrap();

    let err = assert_rejected(&mut solver, |s| s.add_operator(Opcode::Add, &[x, y]));
    assert_eq!(
        err,
        SwordError::WidthMismatch {
            op: Opcode::Add,
            expected: 8,
            found: 4
        }
    );
    let err = assert_rejected(&mut solver, |s| s.add_operator(Opcode::Add, &[x]));
    assert!(matches!(err, SwordError::ArityMismatch { found: 1, .. }));
    let err = assert_rejected(&mut solver, |s| s.add_operator(Opcode::Ite, &[x, x, x]));
    assert!(matches!(err, SwordError::WidthMismatch { .. }), "{err}");
    assert_rejected(&mut solver, |s| s.add_operator(Opcode::Not, &[]));
    assert_rejected(&mut solver, |s| s.add_operator(Opcode::Extract, &[x]));
}

#[test]
fn test_parametric_bounds() {
    let mut solver = Solver::new();
    let x = solver.add_variable(8, "x").unwrap();

    let err = assert_rejected(&mut solver, |s| s.add_extract(x, 3, 3));
    assert_eq!(
        err,
        SwordError::InvalidExtract {
            low: 3,
            high: 3,
            width: 8
        }
    );
    assert_rejected(&mut solver, |s| s.add_extract(x, 4, 9));
    assert_rejected(&mut solver, |s| s.add_repeat(x, 0));
    assert_rejected(&mut solver, |s| s.add_rotate_left(x, 8));
    assert_rejected(&mut solver, |s| s.add_rotate_right(x, 9));

    // boundary values are fine
    let whole = solver.add_extract(x, 0, 8).unwrap();
    let same = solver.add_zero_extend(x, 0).unwrap();
    let sx = solver.add_sign_extend(x, 4).unwrap();
    let rep = solver.add_repeat(x, 3).unwrap();
    let widths: Vec<u32> = [whole, same, sx, rep]
        .iter()
        .map(|&s| solver.graph().node(s).unwrap().width())
        .collect();
    assert_eq!(widths, vec![8, 8, 12, 24]);
}

#[test]
fn test_constants() {
    let mut solver = Solver::new();
    assert_rejected(&mut solver, |s| s.add_constant(4, 16));
    assert_rejected(&mut solver, |s| s.add_bin_constant(4, "10101"));
    assert_rejected(&mut solver, |s| s.add_hex_constant(8, "1g"));
    assert_rejected(&mut solver, |s| s.add_constant_str(8, ""));
    assert_rejected(&mut solver, |s| s.add_variable(0, "empty"));

    let wide = solver
        .add_constant_str(100, "1267650600228229401496703205375")
        .unwrap();
    assert_eq!(solver.graph().node(wide).unwrap().width(), 100);
}

#[test]
fn test_arrays_are_typed() {
    let mut solver = Solver::new();
    let mem = solver.add_array_variable(4, 8, "mem").unwrap();
    let other = solver.add_array_variable(4, 8, "other").unwrap();
    let i = solver.add_variable(4, "i").unwrap();
    let wide = solver.add_variable(8, "wide").unwrap();

    assert_rejected(&mut solver, |s| s.add_operator(Opcode::Equal, &[mem, other]));
    assert_rejected(&mut solver, |s| s.add_operator(Opcode::Select, &[mem, wide]));
    assert_rejected(&mut solver, |s| s.add_operator(Opcode::Store, &[mem, i, i]));
    assert_rejected(&mut solver, |s| s.add_operator(Opcode::Add, &[mem, mem]));

    let read = solver.add_operator(Opcode::Select, &[mem, i]).unwrap();
    assert_eq!(solver.graph().node(read).unwrap().width(), 8);
}

#[test]
fn test_foreign_signal() {
    let mut a = Solver::new();
    let mut b = Solver::new();
    let _ = b.add_variable(1, "p").unwrap();
    let q = b.add_variable(1, "q").unwrap();
    assert_eq!(a.add_assertion(q, true), Err(SwordError::UnknownSignal(q.id())));
}
