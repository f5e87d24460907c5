//! CLI Exit Code Registry
//!
//! Single source of truth for all `datedit` exit codes.
//! Scripts rely on them, so codes are never reused for a different meaning.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 2       | Universal  | CLI usage error (bad args, bad row spec) |
//! | 3-9     | file       | Loading and saving files                 |
//! | 10-19   | edit       | Edits rejected by the engine             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in `file_exit_code` / `edit_exit_code`

use datedit_engine::EditError;
use datedit_io::IoError;

// =============================================================================
// Universal (0, 2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, malformed row spec, unknown column name.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// File (3-9)
// =============================================================================

/// Input file does not exist.
pub const EXIT_FILE_NOT_FOUND: u8 = 3;

/// File exists but cannot be read, or the output cannot be written.
pub const EXIT_FILE_IO: u8 = 4;

/// File content could not be parsed (bad CSV, empty varexp, bad workbook).
pub const EXIT_FILE_PARSE: u8 = 5;

// =============================================================================
// Edit (10-19)
// =============================================================================

/// Row or column index outside the table.
pub const EXIT_EDIT_BOUNDS: u8 = 10;

/// Operand rejected (non-numeric increment seed, unknown variable class).
pub const EXIT_EDIT_OPERAND: u8 = 11;

/// Named column missing from the table.
pub const EXIT_EDIT_COLUMN: u8 = 12;

/// Branch duplication impossible (empty source path, no n1..n11 columns).
pub const EXIT_EDIT_BRANCH: u8 = 13;

/// Variable name or path rejected.
pub const EXIT_EDIT_NAME: u8 = 14;

/// Pasted text empty or not tab-separated.
pub const EXIT_EDIT_PASTE: u8 = 15;

pub fn file_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::FileNotFound(_) => EXIT_FILE_NOT_FOUND,
        IoError::FileUnreadable { .. } | IoError::FileUnwritable { .. } => EXIT_FILE_IO,
        IoError::Spreadsheet { .. } | IoError::EmptyFile(_) | IoError::Parse { .. } => EXIT_FILE_PARSE,
    }
}

pub fn edit_exit_code(err: &EditError) -> u8 {
    match err {
        EditError::IndexOutOfBounds { .. } => EXIT_EDIT_BOUNDS,
        EditError::InvalidOperand(_) => EXIT_EDIT_OPERAND,
        EditError::ColumnNotFound(_) => EXIT_EDIT_COLUMN,
        EditError::EmptySourcePath | EditError::NoPathColumns => EXIT_EDIT_BRANCH,
        EditError::InvalidName(_) | EditError::PathTooLong { .. } => EXIT_EDIT_NAME,
        EditError::ClipboardEmptyOrMalformed => EXIT_EDIT_PASTE,
    }
}
