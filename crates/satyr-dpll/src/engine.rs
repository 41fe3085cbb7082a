//! The sequential DPLL engine.

use crate::checkpoint::{Checkpoint, CheckpointStack};
use crate::decision::pick_branch_literal;
use crate::reduce::reduce;
use satyr_base::{Assignment, Clause, Formula};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, trace};

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The search has not run to completion.
    Unsolved,
    /// A satisfying assignment was found.
    Satisfiable,
    /// No satisfying assignment exists.
    Unsatisfiable,
    /// No verdict was reached.
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unsolved => "UNSOLVED",
            Self::Satisfiable => "SATISFIABLE",
            Self::Unsatisfiable => "UNSATISFIABLE",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// How often each DPLL step fired during a solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepCounters {
    pub unit_propagations: u64,
    pub pure_literals: u64,
    pub splits: u64,
    pub contradiction_backtracks: u64,
    pub fallback_backtracks: u64,
}

/// The DPLL state machine for one branch of the search.
///
/// Owns a working copy of the clauses, the literals committed so far and
/// a stack of checkpoints for unexplored sibling branches. The parallel
/// engine drives the same state machine step by step via the public step
/// methods; [`Solver::solve`] is the self-contained sequential loop.
pub struct Solver {
    working: Vec<Clause>,
    assignment: Assignment,
    checkpoints: CheckpointStack,
    verdict: Verdict,
    stats: StepCounters,
}

impl Solver {
    /// Creates a solver over a deep copy of the formula's clauses.
    #[must_use]
    pub fn new(formula: &Formula) -> Self {
        Self::from_parts(formula.clauses.clone(), Assignment::new())
    }

    /// Creates a solver that resumes from an existing search frame.
    #[must_use]
    pub fn from_parts(working: Vec<Clause>, assignment: Assignment) -> Self {
        Self {
            working,
            assignment,
            checkpoints: CheckpointStack::new(),
            verdict: Verdict::Unknown,
            stats: StepCounters::default(),
        }
    }

    /// The clauses still open on this branch.
    #[must_use]
    pub fn working(&self) -> &[Clause] {
        &self.working
    }

    /// The literals committed on this branch.
    #[must_use]
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// The verdict reached so far.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Step counts accumulated by [`Solver::solve`].
    #[must_use]
    pub fn stats(&self) -> StepCounters {
        self.stats
    }

    /// Runs the DPLL loop to completion.
    pub fn solve(&mut self) -> Verdict {
        info!("starting to solve {} clauses", self.working.len());
        trace!("{}", self.render_working());

        loop {
            if self.is_solved() {
                self.verdict = Verdict::Satisfiable;
                break;
            }

            if self.is_unsolvable() {
                trace!(
                    "unsolvable terminal, assignment: {}, open clauses: {}",
                    self.assignment,
                    self.render_working()
                );
                self.verdict = Verdict::Unsatisfiable;
                break;
            }

            if self.has_contradiction() {
                debug!("found contradiction, backtracking");
                if self.backtrack() {
                    self.stats.contradiction_backtracks += 1;
                    debug!(
                        "backtracked to previous checkpoint, remaining clauses: {}",
                        self.working.len()
                    );
                    trace!("{}", self.render_working());
                    continue;
                }
                info!("no checkpoints left, problem is unsolvable");
                self.verdict = Verdict::Unsatisfiable;
                break;
            }

            if self.unit_propagation() {
                self.stats.unit_propagations += 1;
                debug!(
                    "unit propagation, remaining clauses to solve: {}",
                    self.working.len()
                );
                trace!("{}", self.render_working());
                continue;
            }

            if self.pure_literal() {
                self.stats.pure_literals += 1;
                debug!(
                    "pure literal, remaining clauses to solve: {}",
                    self.working.len()
                );
                trace!("{}", self.render_working());
                continue;
            }

            if self.split() {
                self.stats.splits += 1;
                debug!(
                    "split, remembering checkpoint, remaining clauses to solve: {}",
                    self.working.len()
                );
                trace!("{}", self.render_working());
                continue;
            }

            if self.backtrack() {
                self.stats.fallback_backtracks += 1;
                debug!(
                    "backtracked to previous checkpoint, remaining clauses: {}",
                    self.working.len()
                );
                trace!("{}", self.render_working());
                continue;
            }

            debug!("no resolution step found");
            self.verdict = Verdict::Unsatisfiable;
            break;
        }

        info!(
            unit_propagations = self.stats.unit_propagations,
            pure_literals = self.stats.pure_literals,
            splits = self.stats.splits,
            contradiction_backtracks = self.stats.contradiction_backtracks,
            fallback_backtracks = self.stats.fallback_backtracks,
            "search finished: {}",
            self.verdict
        );
        self.verdict
    }

    /// True when every clause has been satisfied.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.working.is_empty()
    }

    /// True when the branch is a dead end with nowhere left to go: open
    /// clauses remain, every literal in them is impossible, and no
    /// checkpoint offers a sibling branch.
    #[must_use]
    pub fn is_unsolvable(&self) -> bool {
        !self.working.is_empty()
            && self.checkpoints.is_empty()
            && self
                .working
                .iter()
                .all(|clause| clause.literals.iter().all(|lit| lit.impossible))
    }

    /// True when some open clause can no longer be satisfied.
    #[must_use]
    pub fn has_contradiction(&self) -> bool {
        self.working.iter().any(Clause::is_contradictory)
    }

    /// Commits the first unit clause found, if any.
    ///
    /// One unit per call; the engine loop comes back for the rest, which
    /// keeps the bookkeeping trivial.
    pub fn unit_propagation(&mut self) -> bool {
        let found = self
            .working
            .iter()
            .enumerate()
            .find_map(|(idx, clause)| clause.unit_literal().map(|unit| (idx, unit)));
        let Some((idx, unit)) = found else {
            return false;
        };

        trace!("unit clause {} forces {unit}", self.working[idx]);
        self.assignment.push(unit);
        self.working.remove(idx);
        reduce(&mut self.working, unit);
        true
    }

    /// Commits every pure literal found in one sweep of the working set.
    ///
    /// A variable is pure when all its open occurrences share one
    /// polarity. Clauses whose only occurrence of the variable is
    /// already impossible are unaffected. Variables are swept in
    /// ascending id order so runs are reproducible.
    pub fn pure_literal(&mut self) -> bool {
        let mut polarities: BTreeMap<u32, (bool, bool)> = BTreeMap::new();
        for clause in &self.working {
            for lit in clause.literals.iter().filter(|l| !l.impossible) {
                let entry = polarities.entry(lit.id).or_default();
                if lit.negated {
                    entry.1 = true;
                } else {
                    entry.0 = true;
                }
            }
        }

        let mut pure = Vec::new();
        for (&id, &(pos, neg)) in &polarities {
            if pos != neg {
                let lit = self
                    .working
                    .iter()
                    .flat_map(|clause| clause.literals.iter())
                    .find(|l| l.id == id && !l.impossible);
                if let Some(&lit) = lit {
                    pure.push(lit);
                }
            }
        }
        if pure.is_empty() {
            return false;
        }

        for lit in pure {
            trace!("pure literal {lit}");
            self.assignment.push(lit);
            self.working.retain(|clause| !clause.contains_open(lit));
        }
        true
    }

    /// Branches on the most-used open variable.
    ///
    /// Saves a checkpoint carrying the opposite polarity, commits the
    /// decision on the live frame and reduces. Returns false only when
    /// no branch candidate exists.
    pub fn split(&mut self) -> bool {
        let Some(decision) = pick_branch_literal(&self.working) else {
            trace!("no split candidate despite open clauses");
            return false;
        };
        trace!("split candidate: {decision}");

        let mut checkpoint = Checkpoint {
            working: self.working.clone(),
            assignment: self.assignment.clone(),
        };
        checkpoint.assignment.push(decision.negation());
        trace!("checkpoint assignment: {}", checkpoint.assignment);
        self.checkpoints.push(checkpoint);

        self.assignment.push(decision);
        reduce(&mut self.working, decision);
        true
    }

    /// Restores the most recent checkpoint and commits its pre-staged
    /// sibling decision. Returns false when no checkpoint is left.
    pub fn backtrack(&mut self) -> bool {
        let Some(checkpoint) = self.checkpoints.pop() else {
            trace!("no more checkpoints to backtrack to");
            return false;
        };

        self.working = checkpoint.working;
        self.assignment = checkpoint.assignment;

        match self.assignment.last() {
            Some(decision) => {
                trace!("resuming sibling branch on {decision}");
                reduce(&mut self.working, decision);
            }
            // Checkpoints are always pushed with the sibling decision
            // appended; an empty assignment here is an upstream bug.
            None => trace!("restored checkpoint carries no decision"),
        }
        true
    }

    fn render_working(&self) -> String {
        let clauses: Vec<String> = self.working.iter().map(ToString::to_string).collect();
        clauses.join(" ")
    }
}
