use clausewatch::*;

fn for_each_cnf_filename(mut f: impl FnMut(&str)) {
    use std::{fs, path};
    let mut d = path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    d.push("tests/cnfs");
    for direntry in fs::read_dir(d).unwrap() {
        let path = direntry.unwrap().path();
        let s = path.to_str().unwrap();
        println!("Test file: {:?}", s);

        f(s);
    }
}

fn load(filename: &str) -> Solver {
    let _ = simple_logger::init_with_level(log::Level::Info);
    let text = std::fs::read_to_string(filename).unwrap();
    solver_from_dimacs(&text).unwrap()
}

#[test]
fn warmup_on_cnf_files() {
    let mut files = 0;
    for_each_cnf_filename(|filename| {
        files += 1;
        let mut s = load(filename);
        let root = s.assignment().num_assigned();
        assert_eq!(s.warmup(), Ok(()));
        s.stats_info();

        if s.is_unsat() {
            assert!(filename.contains("rootconflict"));
            assert_eq!(s.stats.warmup.runs, 0);
            return;
        }

        assert_eq!(s.level(), 0);
        assert_eq!(s.stats.warmup.runs, 1);
        let fixed = s.assignment().num_assigned();
        assert!(fixed >= root);
        assert_eq!(s.stats.warmup.assigned as usize, s.num_vars() - fixed);
        for v in 0..s.num_vars() {
            let var = Var(v as i32);
            let assigned = s.assignment().var_value(var) != LBOOL_UNDEF;
            assert!(assigned || s.target_phase(var).is_some(), "no phase for {:?}", var);
        }
        println!("  ok -- {} of {} variables fixed at root", fixed, s.num_vars());
    });
    assert_eq!(files, 3);
}

#[test]
fn clause_counts_after_loading() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/cnfs/");

    let s = load(&format!("{}chain.cnf", dir));
    assert_eq!(s.num_vars(), 5);
    assert_eq!(s.store().clauses().len(), 5);
    assert_eq!(s.store().stats.irredundant, 5);

    let s = load(&format!("{}pigeons3x2.cnf", dir));
    assert_eq!(s.num_vars(), 6);
    assert_eq!(s.store().clauses().len(), 9);
    assert_eq!(s.watches().len(), 18);

    let mut s = load(&format!("{}rootconflict.cnf", dir));
    assert_eq!(s.store().clauses().len(), 3);
    assert_eq!(s.assignment().num_assigned(), 1);
    assert!(s.propagate().is_some());
    assert_eq!(s.stats.conflicts, 1);
}

#[test]
fn pigeons_propagate_after_placing_first_pigeon() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/cnfs/");
    let mut s = load(&format!("{}pigeons3x2.cnf", dir));
    assert_eq!(s.propagate(), None);

    // pigeon 1 in hole 1 pushes pigeons 2 and 3 into hole 2
    s.assume_decision(Lit::from_dimacs(1));
    let conflict = s.propagate();
    for &l in &[-3, -5, 4, 6] {
        assert_eq!(s.value(Lit::from_dimacs(l)), LBOOL_TRUE, "literal {}", l);
    }
    assert!(conflict.is_some());
    let c = s.store().clause(conflict.unwrap());
    assert!(c.lits().iter().all(|&l| s.value(l) == LBOOL_FALSE));
    assert_eq!(s.stats.conflicts, 1);

    s.backtrack(0);
    assert_eq!(s.assignment().num_assigned(), 0);
    assert_eq!(s.propagate(), None);
}

#[test]
fn non_cnf_input_is_rejected() {
    match solver_from_dimacs("p cnf 2 1\n1 x 0\n") {
        Err(LoadError::Parse(_)) => {}
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("garbage input accepted"),
    }
}
