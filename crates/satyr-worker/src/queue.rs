//! Blocking work queue.

use crate::item::WorkItem;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A thread-safe LIFO of work items with blocking consumers.
///
/// LIFO order exploits depth-first locality: freshly produced siblings
/// share most of their clause structure with whatever the consumer
/// touched last. The `closed` flag is the shutdown mechanism; closing
/// wakes every blocked consumer so it can observe termination.
///
/// The queue also counts items that have been popped but not yet
/// retired with [`WorkQueue::task_done`]. Popping and becoming busy are
/// one atomic step under the queue lock, so quiescence (`empty` and no
/// item in flight) can never be observed while a worker holds
/// unprocessed work.
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<State>,
    cond: Condvar,
}

#[derive(Debug, Default)]
struct State {
    items: Vec<WorkItem>,
    in_flight: usize,
    closed: bool,
}

impl State {
    fn quiescent(&self) -> bool {
        self.items.is_empty() && self.in_flight == 0
    }
}

impl WorkQueue {
    /// Creates an open, empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item and wakes one waiting consumer.
    pub fn push(&self, item: WorkItem) {
        let mut state = self.lock();
        state.items.push(item);
        self.cond.notify_one();
    }

    /// Takes the most recently pushed item, blocking while the queue is
    /// empty and open. The popped item counts as in flight until
    /// [`WorkQueue::task_done`] retires it. Returns `None` once the
    /// queue is closed and drained.
    pub fn pop(&self) -> Option<WorkItem> {
        let mut state = self.lock();
        while state.items.is_empty() && !state.closed {
            state = self
                .cond
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let item = state.items.pop();
        if item.is_some() {
            state.in_flight += 1;
        }
        item
    }

    /// Retires one in-flight item. Returns true when the queue became
    /// quiescent: nothing queued and nothing in flight.
    pub fn task_done(&self) -> bool {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.quiescent()
    }

    /// True when nothing is queued and nothing is in flight.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.lock().quiescent()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// True when no items are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes the queue and wakes all waiting consumers. Idempotent.
    pub fn close(&self) {
        let mut state = self.lock();
        if !state.closed {
            state.closed = true;
            self.cond.notify_all();
        }
    }

    /// Wakes all waiting consumers without closing, so they can re-check
    /// termination conditions.
    pub fn wake_all(&self) {
        let _state = self.lock();
        self.cond.notify_all();
    }
}
