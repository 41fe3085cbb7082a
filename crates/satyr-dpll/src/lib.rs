//! # satyr-dpll
//!
//! The DPLL core algorithm.
//!
//! Implements:
//! - Working-set reduction for committed decisions
//! - Unit propagation and pure-literal elimination
//! - Branch selection with a most-used-variable heuristic
//! - Contradiction detection and checkpoint-based backtracking

pub mod checkpoint;
pub mod decision;
pub mod engine;
pub mod reduce;

pub use checkpoint::{Checkpoint, CheckpointStack};
pub use decision::pick_branch_literal;
pub use engine::{Solver, StepCounters, Verdict};
pub use reduce::reduce;
