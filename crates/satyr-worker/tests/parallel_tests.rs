//! End-to-end tests for the parallel engine.

use satyr_base::{Assignment, Formula};
use satyr_dpll::{Solver, Verdict};
use satyr_format::parse_str;
use satyr_worker::{ParallelConfig, ParallelSolver};

fn formula(input: &str) -> Formula {
    parse_str(input).expect("test formula must parse")
}

fn solve_parallel(input: &str, config: ParallelConfig) -> (Verdict, Option<Assignment>) {
    ParallelSolver::new(formula(input), config).solve()
}

fn solve_sequential(input: &str) -> Verdict {
    Solver::new(&formula(input)).solve()
}

fn assert_sound(f: &Formula, assignment: &Assignment) {
    for clause in &f.clauses {
        assert!(
            assignment.satisfies(clause),
            "clause {clause} not satisfied by {assignment}"
        );
    }
}

fn assert_consistent(assignment: &Assignment) {
    let lits = assignment.literals();
    for (i, a) in lits.iter().enumerate() {
        for b in &lits[i + 1..] {
            assert!(!a.is_opposite(*b), "contradictory assignment {assignment}");
        }
    }
}

const SCENARIOS: &[&str] = &[
    "p cnf 1 1\n1 0\n",
    "p cnf 1 2\n1 0\n-1 0\n",
    "p cnf 3 3\n1 2 0\n-1 2 0\n-2 0\n",
    "p cnf 3 3\n1 -2 0\n2 -3 0\n3 0\n",
    "p cnf 4 4\n1 2 0\n3 4 0\n-1 -3 0\n-2 -4 0\n",
    "p cnf 2 2\n1 -2 0\n-1 2 0\n",
    "p cnf 3 4\n1 2 0\n1 -2 0\n-1 3 0\n-1 -3 0\n",
    "p cnf 6 9\n1 2 0\n3 4 0\n5 6 0\n-1 -3 0\n-1 -5 0\n-3 -5 0\n-2 -4 0\n-2 -6 0\n-4 -6 0\n",
    "p cnf 4 8\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n3 4 0\n3 -4 0\n-3 4 0\n-3 -4 0\n",
];

#[test]
fn test_parallel_matches_sequential_verdict() {
    for input in SCENARIOS {
        let expected = solve_sequential(input);
        for workers in [1, 2, 4] {
            let config = ParallelConfig {
                workers,
                ..ParallelConfig::default()
            };
            let (verdict, solution) = solve_parallel(input, config);
            assert_eq!(
                verdict, expected,
                "parallel verdict diverged with {workers} workers on:\n{input}"
            );

            if verdict == Verdict::Satisfiable {
                let f = formula(input);
                let solution = solution.expect("SAT verdict must carry a solution");
                assert_sound(&f, &solution);
                assert_consistent(&solution);
            } else {
                assert!(solution.is_none());
            }
        }
    }
}

#[test]
fn test_depth_limit_falls_back_to_sequential_splits() {
    for input in SCENARIOS {
        let expected = solve_sequential(input);
        let config = ParallelConfig {
            workers: 2,
            parallel_depth: 1,
            optimum: false,
        };
        let (verdict, _) = solve_parallel(input, config);
        assert_eq!(verdict, expected, "depth-limited verdict diverged on:\n{input}");
    }
}

#[test]
fn test_first_solution_on_propagation_chain() {
    let input = "p cnf 3 3\n1 -2 0\n2 -3 0\n3 0\n";
    let config = ParallelConfig {
        workers: 2,
        ..ParallelConfig::default()
    };
    let (verdict, solution) = solve_parallel(input, config);
    assert_eq!(verdict, Verdict::Satisfiable);

    // Propagation forces the whole model, whichever worker reports it.
    let solution = solution.unwrap();
    let mut lits: Vec<i32> = solution.literals().iter().map(|l| l.to_dimacs()).collect();
    lits.sort_unstable();
    assert_eq!(lits, vec![1, 2, 3]);
}

#[test]
fn test_optimum_finds_minimal_commit_count() {
    // A pure literal shortcut satisfies everything with two commits;
    // no assignment under this commit discipline does better.
    let input = "p cnf 3 3\n1 2 0\n-1 3 0\n-1 -3 0\n";
    let config = ParallelConfig {
        workers: 2,
        parallel_depth: 0,
        optimum: true,
    };
    let (verdict, solution) = solve_parallel(input, config);
    assert_eq!(verdict, Verdict::Satisfiable);

    let f = formula(input);
    let solution = solution.unwrap();
    assert_eq!(solution.len(), 2, "expected minimal solution, got {solution}");
    assert_sound(&f, &solution);
}

#[test]
fn test_optimum_exhausts_symmetric_instance() {
    // Every model of this instance commits all four variables.
    let input = "p cnf 4 4\n1 2 0\n3 4 0\n-1 -3 0\n-2 -4 0\n";
    let config = ParallelConfig {
        workers: 4,
        parallel_depth: 0,
        optimum: true,
    };
    let (verdict, solution) = solve_parallel(input, config);
    assert_eq!(verdict, Verdict::Satisfiable);

    let f = formula(input);
    let solution = solution.unwrap();
    assert_eq!(solution.len(), 4);
    assert_sound(&f, &solution);
    assert_consistent(&solution);
}

#[test]
fn test_optimum_reports_unsat() {
    let config = ParallelConfig {
        workers: 2,
        parallel_depth: 0,
        optimum: true,
    };
    let (verdict, solution) = solve_parallel("p cnf 1 2\n1 0\n-1 0\n", config);
    assert_eq!(verdict, Verdict::Unsatisfiable);
    assert!(solution.is_none());
}

#[test]
fn test_repeated_solves_terminate() {
    // Exercises queue close/termination detection under thread timing
    // noise; a hang here is a protocol bug.
    let sat = "p cnf 3 3\n1 -2 0\n2 -3 0\n3 0\n";
    let unsat = "p cnf 3 4\n1 2 0\n1 -2 0\n-1 3 0\n-1 -3 0\n";

    for _ in 0..25 {
        let config = ParallelConfig {
            workers: 4,
            ..ParallelConfig::default()
        };
        let (verdict, _) = solve_parallel(sat, config.clone());
        assert_eq!(verdict, Verdict::Satisfiable);

        let (verdict, _) = solve_parallel(unsat, config);
        assert_eq!(verdict, Verdict::Unsatisfiable);
    }
}

#[test]
fn test_last_work_item_recorded_on_unsat() {
    let solver = ParallelSolver::new(
        formula("p cnf 1 2\n1 0\n-1 0\n"),
        ParallelConfig {
            workers: 2,
            ..ParallelConfig::default()
        },
    );
    let (verdict, _) = solver.solve();
    assert_eq!(verdict, Verdict::Unsatisfiable);
    assert!(solver.last_work_item().is_some());
}
