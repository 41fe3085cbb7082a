//! Per-input solve pipeline: parse, dump, validate, solve, report.

use anyhow::Context;
use satyr_base::Assignment;
use satyr_dpll::{Solver, Verdict};
use satyr_worker::{ParallelConfig, ParallelSolver};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Solver selection and tuning passed down from the argument parser.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub parallel: bool,
    pub threads: usize,
    pub parallel_depth: u32,
    pub optimum: bool,
}

/// Solves every file in the directory, sequentially, up to `limit`.
pub fn run_directory(
    dir: &Path,
    limit: Option<usize>,
    options: &SolveOptions,
) -> anyhow::Result<()> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to open path: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    if let Some(limit) = limit {
        files.truncate(limit);
    }

    println!("Folder solve mode, solving {} files", files.len());
    let start = Instant::now();
    for (i, file) in files.iter().enumerate() {
        run_file(file, options)?;
        println!("{}/{} done\n", i + 1, files.len());
    }
    let elapsed = start.elapsed();

    if !files.is_empty() {
        println!(
            "Solving of {} files took {:.3?}; Average: {:.3?}",
            files.len(),
            elapsed,
            elapsed / files.len() as u32
        );
    }
    Ok(())
}

/// Solves a single DIMACS file.
pub fn run_file(path: &Path, options: &SolveOptions) -> anyhow::Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    run_input(&path.display().to_string(), &content, options)
}

/// Solves DIMACS text from any source.
pub fn run_input(name: &str, input: &str, options: &SolveOptions) -> anyhow::Result<()> {
    println!("Analyzing {name}");
    let start = Instant::now();

    let formula = satyr_format::parse_str(input).context("parser error")?;

    satyr_format::write_dump("parser.out", &formula)
        .context("could not write parser output file")?;

    satyr_format::validate(&formula).context("parsing result is not valid")?;

    let (verdict, solution) = if options.parallel {
        let solver = ParallelSolver::new(
            formula,
            ParallelConfig {
                workers: options.threads,
                parallel_depth: options.parallel_depth,
                optimum: options.optimum,
            },
        );
        let (verdict, solution) = solver.solve();
        if verdict == Verdict::Unsatisfiable {
            // The last examined frame shows where the search died.
            if let Some(item) = solver.last_work_item() {
                tracing::info!(
                    "last examined assignment: {} with {} open clauses",
                    item.assignment,
                    item.working.len()
                );
            }
        }
        (verdict, solution)
    } else {
        let mut solver = Solver::new(&formula);
        let verdict = solver.solve();
        if verdict == Verdict::Unsatisfiable {
            tracing::info!(
                "last examined assignment: {} with {} open clauses",
                solver.assignment(),
                solver.working().len()
            );
        }
        let solution =
            (verdict == Verdict::Satisfiable).then(|| solver.assignment().clone());
        (verdict, solution)
    };

    println!("Result: {verdict}");
    if verdict == Verdict::Satisfiable {
        if let Some(solution) = &solution {
            println!("{}", v_line(solution));
        }
    }

    tracing::info!("time elapsed: {:.3?}", start.elapsed());
    Ok(())
}

/// Renders the committed literals as a DIMACS `v` line, sorted by
/// variable id and terminated by 0.
fn v_line(solution: &Assignment) -> String {
    let mut line = String::from("v");
    for lit in solution.sorted_by_id() {
        line.push(' ');
        line.push_str(&lit.to_dimacs().to_string());
    }
    line.push_str(" 0");
    line
}
