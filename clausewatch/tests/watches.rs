use clausewatch::*;

fn lit(x: i32) -> Lit {
    Lit::from_dimacs(x)
}

fn lits(xs: &[i32]) -> Vec<Lit> {
    xs.iter().map(|&x| lit(x)).collect()
}

fn solver(vars: usize) -> Solver {
    let _ = simple_logger::init_with_level(log::Level::Info);
    let mut s = Solver::new();
    for _ in 0..vars {
        s.new_var();
    }
    s
}

fn watched(s: &Solver, l: Lit) -> Vec<(ClauseRef, i32, bool)> {
    s.watches()
        .watches(l)
        .iter()
        .map(|w| (w.clause, w.blit.to_dimacs(), w.binary()))
        .collect()
}

#[test]
fn attach_watches_first_two_literals() {
    let mut s = solver(4);
    s.add_clause(lits(&[1, 2, 3, 4]));
    let c = s.store().clauses()[0];
    assert_eq!(watched(&s, lit(1)), vec![(c, 2, false)]);
    assert_eq!(watched(&s, lit(2)), vec![(c, 1, false)]);
    assert!(watched(&s, lit(3)).is_empty());
    assert!(watched(&s, lit(4)).is_empty());
    assert_eq!(s.watches().watches(lit(1))[0].size, 4);
}

#[test]
fn rebuild_puts_binary_clauses_first() {
    let mut s = solver(5);
    s.add_clause(lits(&[1, 2, 3]));
    s.add_clause(lits(&[1, 4]));
    let learned = s.add_learned_clause(&lits(&[1, 5]), 1, &[]);
    let garbage = s.add_learned_clause(&lits(&[1, 3, 5]), 2, &[]);
    s.mark_garbage(garbage);
    let cs = s.store().clauses().to_vec();

    s.rebuild_watches(false);
    assert_eq!(
        watched(&s, lit(1)),
        vec![(cs[1], 4, true), (learned, 5, true), (cs[0], 2, false)]
    );
    assert!(watched(&s, lit(3)).is_empty());

    s.rebuild_watches(true);
    assert_eq!(watched(&s, lit(1)), vec![(cs[1], 4, true), (cs[0], 2, false)]);
    assert!(watched(&s, lit(5)).is_empty());
    assert_eq!(s.watches().len(), 4);
}

#[test]
fn rebuild_rewinds_propagation_at_root() {
    let mut s = solver(3);
    s.add_clause(lits(&[-1]));
    assert_eq!(s.propagate(), None);
    assert_eq!(s.assignment().propagated, 1);

    let c = s.add_resolved_clause(&lits(&[1, 2, 3]), &[]);
    assert!(watched(&s, lit(1)).is_empty());

    s.rebuild_watches(false);
    assert_eq!(s.assignment().propagated, 0);
    assert_eq!(s.propagate(), None);
    assert_eq!(watched(&s, lit(3)), vec![(c, 1, false)]);
    assert_eq!(s.store().clause(c).lits()[..2], lits(&[2, 3])[..]);
}

#[test]
fn rebuild_keeps_propagation_cursor_above_root() {
    let mut s = solver(3);
    s.add_clause(lits(&[1, 2, 3]));
    s.assume_decision(lit(-1));
    assert_eq!(s.propagate(), None);
    s.rebuild_watches(false);
    assert_eq!(s.assignment().propagated, 1);
}

#[test]
fn clause_added_below_propagated_literal_is_revisited() {
    let mut s = solver(2);
    s.add_clause(lits(&[-1]));
    assert_eq!(s.propagate(), None);
    s.add_clause(lits(&[1, 2]));
    assert_eq!(s.assignment().propagated, 0);
    assert_eq!(s.propagate(), None);
    assert_eq!(s.value(lit(2)), LBOOL_TRUE);
}

#[test]
fn repack_is_stable() {
    let mut s = solver(7);
    s.add_clause(lits(&[1, 2, 3]));
    s.add_clause(lits(&[1, 4]));
    s.add_clause(lits(&[1, 5, 6]));
    s.add_clause(lits(&[1, 7]));
    let cs = s.store().clauses().to_vec();
    assert_eq!(
        watched(&s, lit(1)),
        vec![(cs[0], 2, false), (cs[1], 4, true), (cs[2], 5, false), (cs[3], 7, true)]
    );

    s.repack_watches();
    assert_eq!(
        watched(&s, lit(1)),
        vec![(cs[1], 4, true), (cs[3], 7, true), (cs[0], 2, false), (cs[2], 5, false)]
    );
}

#[test]
fn collect_flushes_watches_of_deleted_clauses() {
    let mut s = solver(4);
    s.add_clause(lits(&[1, 2]));
    s.add_clause(lits(&[1, 3, 4]));
    let cs = s.store().clauses().to_vec();
    s.mark_garbage(cs[0]);
    s.mark_garbage(cs[1]);
    s.collect();
    assert_eq!(s.watches().len(), 0);
    assert!(s.store().clauses().is_empty());
}
