//! Result rendering types.
//!
//! Cells are kept as raw bytes so nothing the engine hands back is lost
//! before it is written to the response.

use std::fmt;

/// Text written in place of a NULL cell.
const NULL_SENTINEL: &str = "\\N";

/// One value from a result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    /// The engine's text form of the value.
    Raw(Vec<u8>),
}

impl From<Option<Vec<u8>>> for Cell {
    fn from(value: Option<Vec<u8>>) -> Self {
        value.map_or(Cell::Null, Cell::Raw)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str(NULL_SENTINEL),
            Cell::Raw(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

/// What a mutating statement did.
///
/// Rendered through its `Debug` form; the exact text is not a stable format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationSummary {
    pub rows_affected: u64,
    pub last_insert_rowid: i64,
}

impl MutationSummary {
    /// Returns the summary as one output line.
    pub fn to_line(&self) -> String {
        format!("{self:?}\n")
    }
}

/// Renders a sequence as one output line: `[a b c]\n`.
///
/// No escaping is applied; a cell containing a space or `]` is
/// indistinguishable from two cells.
pub fn render_line<T: fmt::Display>(items: &[T]) -> String {
    let mut line = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&item.to_string());
    }
    line.push_str("]\n");
    line
}
