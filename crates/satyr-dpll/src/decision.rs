//! Branch literal selection.

use satyr_base::{Clause, Literal};
use std::collections::BTreeMap;

/// Picks the literal to branch on.
///
/// The variable with the most open occurrences wins; ties go to the
/// smallest id so repeated runs take identical decisions. The decision
/// polarity is read from the first occurrence of that variable in
/// working-set order.
///
/// Returns `None` when no open occurrence exists at all.
#[must_use]
pub fn pick_branch_literal(working: &[Clause]) -> Option<Literal> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for clause in working {
        for lit in &clause.literals {
            if !lit.impossible {
                *counts.entry(lit.id).or_default() += 1;
            }
        }
    }

    // Ascending iteration keeps the smallest id on equal counts.
    let mut best: Option<(u32, usize)> = None;
    for (&id, &count) in &counts {
        match best {
            Some((_, max)) if count <= max => {}
            _ => best = Some((id, count)),
        }
    }
    let (id, _) = best?;

    working
        .iter()
        .flat_map(|clause| clause.literals.iter())
        .find(|lit| lit.id == id)
        .copied()
}
