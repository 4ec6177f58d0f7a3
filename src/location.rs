//! Source locations attached to every token and AST node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A single point in a source file.
///
/// Immutable once constructed; every [`crate::token::Token`] and every AST
/// node carries one. `line`/`column` are 1-indexed, matching how compilers
/// report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filename: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(filename: Rc<str>, line: u32, column: u32) -> Self {
        Self {
            filename,
            line,
            column,
        }
    }

    /// A placeholder location for synthesized nodes that do not trace back
    /// to a specific source span (e.g. the implicit global scope).
    pub fn synthetic() -> Self {
        Self {
            filename: Rc::from("<synthetic>"),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}
