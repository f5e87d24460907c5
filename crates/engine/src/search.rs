//! Incremental find / replace over a fixed row scope.
//!
//! The cursor walks the scope one matching row at a time. Reaching the end
//! resets it, so the following `find_next` starts over from the top.

use crate::bulk::{Matcher, ReplaceOptions};
use crate::history::CellDelta;
use crate::table::Table;

/// Result of one replace-next step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceStep {
    /// Cells rewritten in the row the cursor was on, with their old values
    pub changes: Vec<CellDelta>,
    /// Row the cursor moved to, if another match exists
    pub next: Option<usize>,
}

pub struct FindCursor {
    find: String,
    matcher: Matcher,
    scope: Vec<usize>,
    columns: Option<Vec<usize>>,
    /// Position in `scope` of the current match
    position: Option<usize>,
}

impl FindCursor {
    /// Search `find` over `scope` (usually the visible rows at the time the
    /// search starts). `columns: None` searches every column.
    pub fn new(find: &str, scope: Vec<usize>, columns: Option<Vec<usize>>, options: ReplaceOptions) -> Self {
        Self {
            find: find.to_string(),
            matcher: Matcher::new(find, options),
            scope,
            columns,
            position: None,
        }
    }

    pub fn find(&self) -> &str {
        &self.find
    }

    /// Row under the cursor
    pub fn current(&self) -> Option<usize> {
        self.position.and_then(|p| self.scope.get(p).copied())
    }

    pub fn reset(&mut self) {
        self.position = None;
    }

    /// Move to the next row containing the search text.
    pub fn find_next(&mut self, table: &Table) -> Option<usize> {
        if self.find.is_empty() {
            return None;
        }
        let start = self.position.map(|p| p + 1).unwrap_or(0);
        for pos in start..self.scope.len() {
            let row = self.scope[pos];
            if self.row_matches(table, row) {
                self.position = Some(pos);
                return Some(row);
            }
        }
        self.position = None;
        None
    }

    /// Rewrite the matches in the current row, then advance.
    ///
    /// With no current row this only advances (first press selects the
    /// first match, the next press replaces it).
    pub fn replace_next(&mut self, table: &mut Table, with: &str) -> ReplaceStep {
        let mut changes = Vec::new();
        if let Some(row) = self.current() {
            for col in self.columns_for(table) {
                let cell = table.cell(row, col);
                if !self.matcher.is_match(cell) {
                    continue;
                }
                let updated = self.matcher.replace(cell, with);
                if updated == cell {
                    continue;
                }
                if let Ok(previous) = table.set_cell(row, col, updated) {
                    changes.push(CellDelta { row, col, previous });
                }
            }
        }
        let next = self.find_next(table);
        ReplaceStep { changes, next }
    }

    fn columns_for(&self, table: &Table) -> Vec<usize> {
        match &self.columns {
            Some(cols) => cols.clone(),
            None => (0..table.column_count()).collect(),
        }
    }

    fn row_matches(&self, table: &Table, row: usize) -> bool {
        match &self.columns {
            Some(cols) => cols.iter().any(|&c| self.matcher.is_match(table.cell(row, c))),
            None => table
                .row(row)
                .map(|cells| cells.iter().any(|c| self.matcher.is_match(c)))
                .unwrap_or(false),
        }
    }
}
