//! # satyr-format
//!
//! Input handling for satyr.
//!
//! - **DIMACS CNF**: tolerant parser for the standard SAT competition
//!   format, including the `%` terminator found in the `uf20-*`
//!   benchmark corpora
//! - **Dump**: pretty-printed JSON dump of the parsed formula for
//!   debugging parser behaviour

pub mod dimacs;
pub mod dump;

pub use dimacs::{parse_reader, parse_str, validate};
pub use dump::write_dump;
