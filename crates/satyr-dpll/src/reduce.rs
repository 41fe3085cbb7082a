//! Working-set reduction.

use satyr_base::{Clause, Literal};

/// Applies a committed decision literal to the working set.
///
/// Every clause containing an open occurrence of `decision` is satisfied
/// and removed; every open occurrence of its negation is marked
/// impossible. Returns whether anything changed.
///
/// Reducing twice with the same literal leaves the set unchanged on the
/// second call. Reducing with a literal and then its negation is a logic
/// error upstream; the resulting contradiction is caught by the engine's
/// next contradiction check.
pub fn reduce(working: &mut Vec<Clause>, decision: Literal) -> bool {
    let mut did_work = false;

    working.retain(|clause| {
        if clause.contains_open(decision) {
            did_work = true;
            false
        } else {
            true
        }
    });

    for clause in working.iter_mut() {
        for lit in clause.literals.iter_mut() {
            if !lit.impossible && lit.is_opposite(decision) {
                lit.impossible = true;
                did_work = true;
            }
        }
    }

    did_work
}
