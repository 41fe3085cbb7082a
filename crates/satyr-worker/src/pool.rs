//! Parallel coordinator.
//!
//! Spawns a pool of homogeneous worker threads over a shared work
//! queue. In first-solution mode the first satisfying assignment wins
//! and stops the search; in optimum mode the search runs to quiescence
//! and the assignment with the fewest committed literals is published.

use crate::item::WorkItem;
use crate::queue::WorkQueue;
use satyr_base::{Assignment, Formula, Literal};
use satyr_dpll::{pick_branch_literal, reduce, Solver, Verdict};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use tracing::{info, trace};

/// Configuration for the parallel solver.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Only create parallel work up to this split depth; 0 means
    /// unlimited (still bounded by queue capacity).
    pub parallel_depth: u32,
    /// Exhaust the search and keep the satisfying assignment with the
    /// fewest committed literals.
    pub optimum: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            parallel_depth: 0,
            optimum: false,
        }
    }
}

/// Default worker count: half the available CPUs, at least one.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|p| p.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// Coordinator state shared across workers, behind one mutex. Busy
/// tracking lives inside the queue, where popping an item and becoming
/// busy are a single atomic step.
#[derive(Debug)]
struct Shared {
    /// A satisfying assignment has been recorded.
    found: bool,
    /// Best assignment seen so far (optimum mode).
    best: Option<Assignment>,
    /// Literal count of `best`.
    best_len: usize,
    /// Last examined work item, kept for UNSAT debugging.
    last_item: Option<WorkItem>,
}

/// The parallel SAT solver.
pub struct ParallelSolver {
    formula: Formula,
    config: ParallelConfig,
    queue: Arc<WorkQueue>,
    shared: Arc<Mutex<Shared>>,
    done: Arc<AtomicBool>,
}

impl ParallelSolver {
    /// Creates a solver for the formula. `solve` may be called once.
    #[must_use]
    pub fn new(formula: Formula, config: ParallelConfig) -> Self {
        Self {
            formula,
            config,
            queue: Arc::new(WorkQueue::new()),
            shared: Arc::new(Mutex::new(Shared {
                found: false,
                best: None,
                best_len: usize::MAX,
                last_item: None,
            })),
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs the parallel search to a verdict.
    ///
    /// Seeds the queue with the root work item, spawns the workers,
    /// waits for the single-shot verdict, then stops and joins every
    /// worker before returning.
    pub fn solve(&self) -> (Verdict, Option<Assignment>) {
        info!("starting parallel solver with {} workers", self.config.workers);

        self.queue.push(WorkItem::root(self.formula.clauses.clone()));

        let (verdict_tx, verdict_rx) = mpsc::sync_channel(1);
        let (solution_tx, solution_rx) = mpsc::sync_channel(1);

        let mut workers = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let ctx = WorkerCtx {
                queue: Arc::clone(&self.queue),
                shared: Arc::clone(&self.shared),
                done: Arc::clone(&self.done),
                verdict_tx: verdict_tx.clone(),
                solution_tx: solution_tx.clone(),
                optimum: self.config.optimum,
                parallel_depth: self.config.parallel_depth,
                max_queue: self.config.workers * 4,
            };
            let handle = thread::Builder::new()
                .name(format!("satyr-worker-{id}"))
                .spawn(move || worker_loop(id, &ctx))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }
        drop(verdict_tx);
        drop(solution_tx);

        let verdict = verdict_rx.recv().unwrap_or(Verdict::Unknown);

        // Stop and join everything before reading the solution slot.
        self.done.store(true, Ordering::SeqCst);
        self.queue.close();
        for worker in workers {
            let _ = worker.join();
        }

        if verdict != Verdict::Satisfiable {
            return (verdict, None);
        }
        let solution = solution_rx.try_recv().ok();
        if self.config.optimum {
            if let Some(best) = &solution {
                info!(
                    "optimal solution found with {} literals: {best}",
                    best.len()
                );
            }
        }
        (verdict, solution)
    }

    /// The last work item any worker examined, for UNSAT debugging.
    #[must_use]
    pub fn last_work_item(&self) -> Option<WorkItem> {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_item
            .clone()
    }
}

/// Everything a worker thread needs, cloned per worker.
struct WorkerCtx {
    queue: Arc<WorkQueue>,
    shared: Arc<Mutex<Shared>>,
    done: Arc<AtomicBool>,
    verdict_tx: SyncSender<Verdict>,
    solution_tx: SyncSender<Assignment>,
    optimum: bool,
    parallel_depth: u32,
    max_queue: usize,
}

impl WorkerCtx {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn found(&self) -> bool {
        self.lock().found
    }

    fn set_found(&self) {
        self.lock().found = true;
    }

    /// Records a strictly better assignment; returns whether it won.
    fn update_best(&self, candidate: Assignment) -> bool {
        let mut shared = self.lock();
        if candidate.len() < shared.best_len {
            shared.best_len = candidate.len();
            shared.best = Some(candidate);
            shared.found = true;
            true
        } else {
            false
        }
    }

    /// Retires the current work item. Quiescence (nothing queued,
    /// nothing in flight) closes the queue so blocked peers wake up and
    /// observe termination; in first-solution mode a recorded solution
    /// already closed it.
    fn finish_item(&self) {
        if self.queue.task_done() && (self.optimum || !self.found()) {
            self.queue.close();
        }
    }

    fn should_parallelize(&self, depth: u32) -> bool {
        if self.queue.len() >= self.max_queue {
            return false;
        }
        self.parallel_depth == 0 || depth < self.parallel_depth
    }

    /// Publishes the terminal verdict once the search is quiescent.
    /// Single-slot non-blocking sends; only the first publisher wins.
    fn publish_terminal(&self, id: usize) {
        let (found, best, best_len) = {
            let shared = self.lock();
            (shared.found, shared.best.clone(), shared.best_len)
        };

        if self.optimum && found {
            if self.verdict_tx.try_send(Verdict::Satisfiable).is_ok() {
                info!(
                    worker = id,
                    "search exhausted, best solution has {best_len} literals"
                );
                if let Some(best) = best {
                    let _ = self.solution_tx.try_send(best);
                }
            }
        } else if !found {
            if self.verdict_tx.try_send(Verdict::Unsatisfiable).is_ok() {
                info!(worker = id, "reporting UNSATISFIABLE");
            }
        }
    }
}

fn worker_loop(id: usize, ctx: &WorkerCtx) {
    loop {
        if ctx.done.load(Ordering::Relaxed) {
            trace!(worker = id, "received done signal");
            return;
        }

        // In first-solution mode another worker's success ends ours.
        if !ctx.optimum && ctx.found() {
            trace!(worker = id, "solution found elsewhere, stopping");
            return;
        }

        let Some(item) = ctx.queue.pop() else {
            // Queue closed: if the whole pool is quiescent this worker
            // may be the one to report the final verdict.
            if ctx.queue.is_quiescent() {
                trace!(worker = id, "no work available and no busy workers");
                ctx.publish_terminal(id);
            }
            return;
        };

        trace!(worker = id, "processing work item at depth {}", item.depth);
        process_work_item(id, ctx, item);
        ctx.finish_item();
    }
}

/// Drives the DPLL state machine over one work item.
fn process_work_item(id: usize, ctx: &WorkerCtx, item: WorkItem) {
    {
        let mut shared = ctx.lock();
        shared.last_item = Some(item.clone());
    }

    let depth = item.depth;
    let mut solver = Solver::from_parts(item.working, item.assignment);

    loop {
        if ctx.done.load(Ordering::Relaxed) {
            return;
        }
        if !ctx.optimum && ctx.found() {
            return;
        }

        if solver.is_solved() {
            if ctx.optimum {
                if ctx.update_best(solver.assignment().clone()) {
                    info!(
                        worker = id,
                        "found better solution with {} literals: {}",
                        solver.assignment().len(),
                        solver.assignment()
                    );
                }
                // Unwind within this work item to visit sibling models.
                if solver.backtrack() {
                    trace!(worker = id, "backtracking past solution");
                    continue;
                }
                trace!(worker = id, "exhausted all branches in this work item");
                return;
            }

            info!(worker = id, "found solution: {}", solver.assignment());
            let _ = ctx.verdict_tx.try_send(Verdict::Satisfiable);
            let _ = ctx.solution_tx.try_send(solver.assignment().clone());
            ctx.set_found();
            ctx.queue.close();
            return;
        }

        if solver.is_unsolvable() {
            trace!(worker = id, "branch unsolvable");
            return;
        }

        if solver.has_contradiction() {
            if solver.backtrack() {
                trace!(worker = id, "contradiction, backtracked to checkpoint");
                continue;
            }
            trace!(worker = id, "no checkpoints left, branch exhausted");
            return;
        }

        if solver.unit_propagation() {
            trace!(
                worker = id,
                "unit propagation, remaining: {}",
                solver.working().len()
            );
            continue;
        }

        if solver.pure_literal() {
            trace!(
                worker = id,
                "pure literal, remaining: {}",
                solver.working().len()
            );
            continue;
        }

        if ctx.should_parallelize(depth) {
            if parallel_split(id, ctx, &solver, depth) {
                // Both polarities are queued; this branch is done.
                trace!(worker = id, "created parallel split at depth {depth}");
                return;
            }
        } else if solver.split() {
            trace!(worker = id, "sequential split at depth {depth}");
            continue;
        }

        if solver.backtrack() {
            trace!(worker = id, "fallback backtrack");
            continue;
        }

        trace!(worker = id, "no resolution step found");
        return;
    }
}

/// Queues two self-contained work items, one per polarity of the branch
/// literal. Returns false when no branch candidate exists.
fn parallel_split(id: usize, ctx: &WorkerCtx, solver: &Solver, depth: u32) -> bool {
    let Some(picked) = pick_branch_literal(solver.working()) else {
        return false;
    };
    trace!(worker = id, "parallel split on {picked}");

    for negated in [picked.negated, !picked.negated] {
        let decision = Literal::new(picked.id, negated);

        let mut working = solver.working().to_vec();
        let mut assignment = solver.assignment().clone();
        assignment.push(decision);
        reduce(&mut working, decision);

        ctx.queue.push(WorkItem {
            working,
            assignment,
            depth: depth + 1,
        });
    }
    true
}
