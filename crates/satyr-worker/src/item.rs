//! Work item definitions.

use satyr_base::{Assignment, Clause};

/// A self-contained state in the search tree awaiting exploration.
///
/// Carries everything a worker needs: no state is shared with the
/// producer. Clause data is deep-copied before enqueuing, so ownership
/// transfers cleanly from producer to queue to consumer.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Clauses still open on this branch.
    pub working: Vec<Clause>,
    /// Literals committed on this branch.
    pub assignment: Assignment,
    /// Number of parallel splits on the ancestor chain.
    pub depth: u32,
}

impl WorkItem {
    /// Creates the root work item for a fresh search.
    #[must_use]
    pub fn root(working: Vec<Clause>) -> Self {
        Self {
            working,
            assignment: Assignment::new(),
            depth: 0,
        }
    }
}
