//! Debug dump of the parsed formula.
//!
//! Written next to the working directory as `parser.out` so parser
//! behaviour on a given input can be inspected without a debugger.

use satyr_base::{Error, Formula, Result};
use std::fs;
use std::path::Path;

/// Writes a pretty-printed JSON representation of the formula.
pub fn write_dump<P: AsRef<Path>>(path: P, formula: &Formula) -> Result<()> {
    let json = serde_json::to_string_pretty(formula)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}
