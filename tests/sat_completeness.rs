use sat_lisp::sat::assignment::Assignment;
use sat_lisp::sat::cnf::Cnf;
use sat_lisp::sat::dimacs::{parse_dimacs, to_dimacs};
use sat_lisp::sat::dpll::Dpll;
use sat_lisp::sat::preprocessing::remove_redundancy;
use sat_lisp::sat::propagation::apply_assumption;
use sat_lisp::sat::solver::{Solver, SolverConfig};
use sat_lisp::sat::{Literal, solve};

fn random_cnf(rng: &mut fastrand::Rng, vars: i32) -> Cnf {
    let clauses = rng.usize(0..=4 * vars as usize);
    (0..clauses)
        .map(|_| {
            let width = rng.usize(1..=4);
            (0..width)
                .map(|_| {
                    let var = rng.i32(1..=vars);
                    if rng.bool() { var } else { -var }
                })
                .collect::<Vec<i32>>()
        })
        .collect()
}

fn brute_force(cnf: &Cnf) -> bool {
    let vars = cnf.variables();
    (0u32..1 << vars.len()).any(|bits| {
        let model: Assignment = vars
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), bits & (1 << i) != 0))
            .collect();
        cnf.evaluate(&model) == Some(true)
    })
}

#[test]
fn test_agrees_with_brute_force() {
    let mut rng = fastrand::Rng::with_seed(0x5a7);
    for _ in 0..300 {
        let vars = rng.i32(1..=12);
        let cnf = random_cnf(&mut rng, vars);

        let expected = brute_force(&cnf);
        let model = solve(&cnf);
        assert_eq!(model.is_some(), expected, "disagreement on:\n{cnf}");
        if let Some(model) = model {
            assert!(cnf.verify(&model), "bad model {model} for:\n{cnf}");
        }
    }
}

#[test]
fn test_tautology_setting_does_not_change_answers() {
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..100 {
        let vars = rng.i32(1..=8);
        let cnf = random_cnf(&mut rng, vars);

        let mut eliminating = Dpll::new(cnf.clone());
        let mut keeping = Dpll::with_config(
            cnf.clone(),
            SolverConfig {
                eliminate_tautologies: false,
            },
        );
        assert_eq!(eliminating.solve().is_some(), keeping.solve().is_some());
    }
}

#[test]
fn test_assumption_is_sound() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..200 {
        let vars = rng.i32(2..=8);
        let cnf = random_cnf(&mut rng, vars);

        let bits = rng.u32(..);
        let model: Assignment = (1..=vars)
            .map(|v| (v.to_string(), bits & (1 << v) != 0))
            .collect();
        let assumed: Vec<Literal> = model.to_literals().into_iter().take(vars as usize / 2).collect();

        let reduced = apply_assumption(&cnf, &assumed);
        assert_eq!(cnf.evaluate(&model), reduced.evaluate(&model));
    }
}

#[test]
fn test_redundancy_removal_is_idempotent() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..100 {
        let vars = rng.i32(1..=6);
        let cnf = random_cnf(&mut rng, vars);

        let once = remove_redundancy(&cnf);
        assert_eq!(remove_redundancy(&once), once);
    }
}

#[test]
fn test_contradicting_units() {
    let cnf = Cnf::from(vec![vec![("a", true)], vec![("a", false)]]);
    assert!(solve(&cnf).is_none());
}

#[test]
fn test_single_clause_model() {
    let cnf = Cnf::from(vec![vec![("a", true), ("b", false), ("c", true)]]);
    let model = solve(&cnf).unwrap();
    assert!(
        model.get("a") == Some(true) || model.get("b") == Some(false) || model.get("c") == Some(true)
    );
}

#[test]
fn test_empty_formula() {
    let model = solve(&Cnf::default()).unwrap();
    assert!(model.is_empty());
}

#[test]
fn test_dimacs_export_solves_the_same() {
    let cnf: Cnf = "x -y\ny z\n-x -z\n-z".parse().unwrap();
    let reparsed = parse_dimacs(to_dimacs(&cnf).as_bytes()).unwrap();

    assert_eq!(reparsed.len(), cnf.len());
    assert_eq!(solve(&cnf).is_some(), solve(&reparsed).is_some());
}

#[test]
fn test_pigeonhole_is_unsat() {
    // Three pigeons, two holes.
    let mut text = String::new();
    for p in 0..3 {
        text.push_str(&format!("p{p}h0 p{p}h1\n"));
    }
    for h in 0..2 {
        for a in 0..3 {
            for b in a + 1..3 {
                text.push_str(&format!("-p{a}h{h} -p{b}h{h}\n"));
            }
        }
    }
    let cnf: Cnf = text.parse().unwrap();
    assert!(solve(&cnf).is_none());
}
