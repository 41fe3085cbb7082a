//! # satyr-base
//!
//! Core types and utilities for the satyr SAT solver.
//!
//! This crate provides the foundational building blocks used across all
//! other satyr crates:
//!
//! - **CNF Model**: literals, clauses, formulas, and partial assignments
//! - **Error Types**: unified error handling across the solver

pub mod cnf;
pub mod error;

pub use cnf::{Assignment, Clause, Formula, Literal};
pub use error::{Error, Result};
