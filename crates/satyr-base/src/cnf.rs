//! CNF problem model.
//!
//! These types are shared by the parser, the sequential DPLL engine and
//! the parallel worker pool. Clause data is value-typed: every branch of
//! the search owns its clauses outright and frames are deep-copied at
//! checkpoint and work-item boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A propositional literal: a variable id with a polarity.
///
/// `impossible` marks a literal that has been ruled out by a decision
/// made earlier on the current branch. It stays inside its clause for
/// bookkeeping but no longer counts as a disjunct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    /// Variable id, always >= 1.
    pub id: u32,
    /// True for the negative polarity (`-n` in DIMACS).
    pub negated: bool,
    /// Ruled out on this branch.
    pub impossible: bool,
}

impl Literal {
    /// Creates a literal with the given polarity.
    #[must_use]
    pub const fn new(id: u32, negated: bool) -> Self {
        Self {
            id,
            negated,
            impossible: false,
        }
    }

    /// Creates a literal from a signed DIMACS integer.
    #[must_use]
    pub const fn from_dimacs(lit: i32) -> Self {
        Self {
            id: lit.unsigned_abs(),
            negated: lit < 0,
            impossible: false,
        }
    }

    /// Returns the signed DIMACS representation.
    #[must_use]
    pub const fn to_dimacs(self) -> i32 {
        if self.negated {
            -(self.id as i32)
        } else {
            self.id as i32
        }
    }

    /// Same variable, same polarity.
    #[must_use]
    pub const fn matches(self, other: Self) -> bool {
        self.id == other.id && self.negated == other.negated
    }

    /// Same variable, opposite polarity.
    #[must_use]
    pub const fn is_opposite(self, other: Self) -> bool {
        self.id == other.id && self.negated != other.negated
    }

    /// The opposite-polarity literal. The `impossible` flag is carried
    /// over unchanged.
    #[must_use]
    pub const fn negation(self) -> Self {
        Self {
            id: self.id,
            negated: !self.negated,
            impossible: self.impossible,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.impossible {
            write!(f, "~")?;
        }
        write!(f, "{}", self.to_dimacs())
    }
}

/// A disjunction of literals.
///
/// An open clause becomes contradictory when it is non-empty and every
/// literal in it is impossible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// The literals, in input order.
    pub literals: Vec<Literal>,
}

impl Clause {
    /// Creates a clause from signed DIMACS integers.
    #[must_use]
    pub fn from_dimacs(lits: &[i32]) -> Self {
        Self {
            literals: lits.iter().map(|&l| Literal::from_dimacs(l)).collect(),
        }
    }

    /// True when every literal has been ruled out and the clause cannot
    /// be satisfied on this branch.
    #[must_use]
    pub fn is_contradictory(&self) -> bool {
        !self.literals.is_empty() && self.literals.iter().all(|l| l.impossible)
    }

    /// Returns the single remaining literal if exactly one is still
    /// open, i.e. this is a unit clause.
    #[must_use]
    pub fn unit_literal(&self) -> Option<Literal> {
        let mut open = self.literals.iter().filter(|l| !l.impossible);
        let unit = open.next()?;
        if open.next().is_some() {
            None
        } else {
            Some(*unit)
        }
    }

    /// True if the clause contains an open literal with the same id and
    /// polarity as `lit`.
    #[must_use]
    pub fn contains_open(&self, lit: Literal) -> bool {
        self.literals
            .iter()
            .any(|l| !l.impossible && l.matches(lit))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{lit}")?;
        }
        write!(f, ")")
    }
}

/// The ordered sequence of literals committed on the current branch.
///
/// Insertion order is preserved: the last element is the most recent
/// branch decision, which backtracking relies on. The engine never
/// commits two opposite literals on one branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    literals: Vec<Literal>,
}

impl Assignment {
    /// Creates an empty assignment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            literals: Vec::new(),
        }
    }

    /// Commits a literal.
    pub fn push(&mut self, lit: Literal) {
        self.literals.push(lit);
    }

    /// The most recently committed literal.
    #[must_use]
    pub fn last(&self) -> Option<Literal> {
        self.literals.last().copied()
    }

    /// Committed literals in commit order.
    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Number of committed literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// True when nothing has been committed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Committed literals sorted by variable id, for `v`-line output.
    #[must_use]
    pub fn sorted_by_id(&self) -> Vec<Literal> {
        let mut lits = self.literals.clone();
        lits.sort_by_key(|l| l.id);
        lits
    }

    /// True if the assignment satisfies the clause, i.e. some literal of
    /// the clause was committed with the same polarity.
    #[must_use]
    pub fn satisfies(&self, clause: &Clause) -> bool {
        clause
            .literals
            .iter()
            .any(|cl| self.literals.iter().any(|al| al.matches(*cl)))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{lit}")?;
        }
        write!(f, "]")
    }
}

/// A parsed CNF problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    /// Format name from the problem line (typically "cnf").
    pub name: String,
    /// Declared variable count.
    pub num_vars: u32,
    /// Declared clause count.
    pub num_clauses: usize,
    /// The parsed clauses.
    pub clauses: Vec<Clause>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_dimacs_roundtrip() {
        let pos = Literal::from_dimacs(4);
        assert_eq!(pos.id, 4);
        assert!(!pos.negated);
        assert_eq!(pos.to_dimacs(), 4);

        let neg = Literal::from_dimacs(-17);
        assert_eq!(neg.id, 17);
        assert!(neg.negated);
        assert_eq!(neg.to_dimacs(), -17);
    }

    #[test]
    fn test_literal_opposite() {
        let a = Literal::new(3, false);
        let b = Literal::new(3, true);
        assert!(a.is_opposite(b));
        assert!(!a.is_opposite(a));
        assert!(a.matches(b.negation()));
    }

    #[test]
    fn test_clause_unit_literal() {
        let mut clause = Clause::from_dimacs(&[1, -2]);
        assert_eq!(clause.unit_literal(), None);

        clause.literals[0].impossible = true;
        assert_eq!(clause.unit_literal(), Some(Literal::new(2, true)));

        clause.literals[1].impossible = true;
        assert_eq!(clause.unit_literal(), None);
        assert!(clause.is_contradictory());
    }

    #[test]
    fn test_empty_clause_not_contradictory() {
        assert!(!Clause::default().is_contradictory());
    }

    #[test]
    fn test_assignment_satisfies() {
        let mut assignment = Assignment::new();
        assignment.push(Literal::new(2, true));

        assert!(assignment.satisfies(&Clause::from_dimacs(&[1, -2])));
        assert!(!assignment.satisfies(&Clause::from_dimacs(&[1, 2])));
    }

    #[test]
    fn test_assignment_sorted_output() {
        let mut assignment = Assignment::new();
        assignment.push(Literal::new(3, false));
        assignment.push(Literal::new(1, true));
        assignment.push(Literal::new(2, false));

        let sorted: Vec<i32> = assignment
            .sorted_by_id()
            .iter()
            .map(|l| l.to_dimacs())
            .collect();
        assert_eq!(sorted, vec![-1, 2, 3]);
    }
}
