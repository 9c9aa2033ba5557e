use criterion::{Criterion, criterion_group, criterion_main};
use sat_lisp::lisp::Interpreter;
use sat_lisp::sat::cnf::Cnf;
use sat_lisp::sat::dpll::Dpll;
use sat_lisp::sat::solver::{Solver, SolverConfig};
use sat_lisp::sudoku::solver::{Board, EXAMPLE_FOUR, EXAMPLE_NINE, Sudoku};
use std::hint::black_box;
use std::time::Duration;

/// Uniform random 3-SAT over `vars` variables. The same seed always gives the
/// same formula.
fn random_3sat(seed: u64, vars: i32, clauses: usize) -> Cnf {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..clauses)
        .map(|_| {
            let mut picked: Vec<i32> = Vec::with_capacity(3);
            while picked.len() < 3 {
                let var = rng.i32(1..=vars);
                if !picked.contains(&var) {
                    picked.push(var);
                }
            }
            picked
                .into_iter()
                .map(|var| if rng.bool() { var } else { -var })
                .collect::<Vec<i32>>()
        })
        .collect()
}

fn bench_sudoku(c: &mut Criterion) {
    let four = Sudoku::new(Board::from(EXAMPLE_FOUR)).unwrap();
    let nine = Sudoku::new(Board::from(EXAMPLE_NINE)).unwrap();
    let nine_cnf = nine.to_cnf();

    c.bench_function("sudoku 4x4 - encode and solve", |b| {
        b.iter(|| black_box(four.solve()));
    });

    c.bench_function("sudoku 9x9 - encode", |b| {
        b.iter(|| black_box(nine.to_cnf()));
    });

    let mut group = c.benchmark_group("sudoku 9x9 - solve");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("eliminate tautologies", |b| {
        b.iter(|| {
            let mut state = Dpll::new(nine_cnf.clone());
            black_box(state.solve())
        });
    });

    group.bench_function("keep tautologies", |b| {
        b.iter(|| {
            let mut state = Dpll::with_config(
                nine_cnf.clone(),
                SolverConfig {
                    eliminate_tautologies: false,
                },
            );
            black_box(state.solve())
        });
    });

    group.finish();
}

fn bench_3sat(c: &mut Criterion) {
    // 4.26 clauses per variable sits near the satisfiability threshold.
    let formulas: Vec<Cnf> = (0..20).map(|seed| random_3sat(seed, 20, 85)).collect();

    let mut group = c.benchmark_group("3sat - 20 variables");
    group.sample_size(20);

    group.bench_function("dpll", |b| {
        b.iter(|| {
            for cnf in &formulas {
                let mut state = Dpll::new(cnf.clone());
                black_box(state.solve());
            }
        });
    });

    group.finish();
}

fn bench_lisp(c: &mut Criterion) {
    let interp = Interpreter::new();
    interp
        .eval("(define (fib n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))")
        .unwrap();
    interp
        .eval("(define (fact n) (if (<= n 1) 1 (* n (fact (- n 1)))))")
        .unwrap();

    c.bench_function("lisp - fib 15", |b| {
        b.iter(|| black_box(interp.eval("(fib 15)").unwrap()));
    });

    c.bench_function("lisp - fact 20", |b| {
        b.iter(|| black_box(interp.eval("(fact 20)").unwrap()));
    });

    c.bench_function("lisp - map filter reduce", |b| {
        b.iter(|| {
            black_box(
                interp
                    .eval(
                        "(reduce (lambda (a b) (+ a b)) \
                         (filter (lambda (x) (> x 10)) \
                         (map (lambda (x) (* x x)) (list 1 2 3 4 5 6 7 8 9 10))) 0)",
                    )
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, bench_sudoku, bench_3sat, bench_lisp);
criterion_main!(benches);
