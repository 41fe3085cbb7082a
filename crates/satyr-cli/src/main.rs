//! satyr CLI - command-line interface for the DPLL SAT solver.

mod solve;

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "satyr")]
#[command(author, version, about = "Parallel DPLL SAT solver", long_about = None)]
struct Cli {
    /// Input file or directory of input files, in DIMACS format; reads
    /// stdin when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long, value_parser = ["none", "steps", "full"], default_value = "none")]
    log_level: String,

    /// Enable parallel solving
    #[arg(short, long)]
    parallel: bool,

    /// Number of worker threads (default: half of available CPUs,
    /// requires --parallel)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Only parallelize splits up to this depth (0 = unlimited, requires
    /// --parallel)
    #[arg(short = 'd', long, default_value_t = 0)]
    parallel_depth: u32,

    /// Find a minimal solution (fewest committed literals, requires
    /// --parallel)
    #[arg(short, long)]
    optimum: bool,

    /// Number of files to solve when --file is a directory (default:
    /// all files)
    #[arg(short = 'n', long)]
    num_files: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `none` still shows headline results and errors; `steps` adds the
    // major decisions; `full` adds per-decision detail.
    let filter = match cli.log_level.as_str() {
        "steps" => "debug",
        "full" => "trace",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if !cli.parallel {
        if cli.threads.is_some() {
            println!("Warning: --threads requires --parallel flag, ignoring");
        }
        if cli.parallel_depth > 0 {
            println!("Warning: --parallel-depth requires --parallel flag, ignoring");
        }
        if cli.optimum {
            println!("Warning: --optimum requires --parallel flag, ignoring");
        }
    }

    let threads = cli
        .threads
        .unwrap_or_else(satyr_worker::default_workers)
        .max(1);
    if cli.parallel {
        tracing::info!("using {threads} worker threads");
        if cli.parallel_depth > 0 {
            tracing::info!("parallelizing only up to depth {}", cli.parallel_depth);
        }
    }

    let options = solve::SolveOptions {
        parallel: cli.parallel,
        threads,
        parallel_depth: cli.parallel_depth,
        optimum: cli.optimum,
    };

    match cli.file {
        Some(path) => {
            let meta = fs::metadata(&path)
                .with_context(|| format!("failed to open path: {}", path.display()))?;
            if meta.is_dir() {
                solve::run_directory(&path, cli.num_files, &options)
            } else {
                solve::run_file(&path, &options)
            }
        }
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            solve::run_input("stdin", &input, &options)
        }
    }
}
