//! # satyr-worker
//!
//! The parallel search engine.
//!
//! - Work items are self-contained search frames transferred by value
//!   through a bounded blocking LIFO queue
//! - A pool of homogeneous worker threads drives the DPLL state machine
//!   on popped items, splitting into new work items while the queue has
//!   room and falling back to sequential checkpoints when it does not
//! - Quiescence (no busy workers, empty queue) closes the queue and
//!   triggers single-shot result publication

pub mod item;
pub mod pool;
pub mod queue;

pub use item::WorkItem;
pub use pool::{default_workers, ParallelConfig, ParallelSolver};
pub use queue::WorkQueue;
