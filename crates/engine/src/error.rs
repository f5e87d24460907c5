use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Row index past the end of the table.
    IndexOutOfBounds { index: usize, len: usize },
    /// Value cannot be used by the requested operation (e.g. increment on text).
    InvalidOperand(String),
    /// No column with this name.
    ColumnNotFound(String),
    /// Branch duplication without any source segment.
    EmptySourcePath,
    /// Table carries none of the n1..n11 path columns.
    NoPathColumns,
    /// Variable name or path element with forbidden characters.
    InvalidName(String),
    /// Path plus variable name exceeds the hierarchy depth.
    PathTooLong { len: usize, max: usize },
    /// Clipboard text is empty or not a tab-separated block.
    ClipboardEmptyOrMalformed,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "row {index} out of bounds (table has {len} rows)")
            }
            Self::InvalidOperand(value) => write!(f, "invalid operand '{value}'"),
            Self::ColumnNotFound(name) => write!(f, "column not found: {name}"),
            Self::EmptySourcePath => write!(f, "source branch is empty; specify at least n1"),
            Self::NoPathColumns => write!(f, "no path column (n1, n2, ...) in this table"),
            Self::InvalidName(name) => {
                write!(f, "invalid name '{name}': only letters, digits and '_' are allowed")
            }
            Self::PathTooLong { len, max } => {
                write!(f, "path and variable name have {len} elements (max {max})")
            }
            Self::ClipboardEmptyOrMalformed => write!(f, "clipboard is empty or not a tab-separated block"),
        }
    }
}

impl std::error::Error for EditError {}
