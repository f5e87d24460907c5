//! Row store: ordered string rows under an ordered set of column names.
//!
//! Invariants:
//! - column names are unique
//! - every row is at least `columns.len()` cells wide
//! - reads past the end of a row (or the table) yield ""

use serde::{Deserialize, Serialize};

use crate::error::EditError;

pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, reconciling header count with the widest row.
    ///
    /// Missing headers are synthesized as `Col_N` (1-based) and short rows
    /// are padded with empty cells.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Self { columns: Vec::new(), rows: Vec::new() };
        table.load(rows, columns);
        table
    }

    /// Table with generated `Col_N` headers sized to the widest row.
    pub fn headerless(rows: Vec<Row>) -> Self {
        Self::new(Vec::new(), rows)
    }

    /// Replace the whole state.
    pub fn load(&mut self, rows: Vec<Row>, columns: Vec<String>) {
        let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
        let width = widest.max(columns.len());

        let mut columns = columns;
        for i in columns.len()..width {
            columns.push(format!("Col_{}", i + 1));
        }

        self.columns = dedup_names(columns);
        self.rows = rows;
        for row in &mut self.rows {
            pad(row, width);
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact column lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Case-insensitive column lookup (e.g. "tagname" finds "Tagname")
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.column_index(name).or_else(|| {
            let wanted = name.to_lowercase();
            self.columns.iter().position(|c| c.to_lowercase() == wanted)
        })
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn get(&self, row: usize, column: &str) -> &str {
        match self.column_index(column) {
            Some(col) => self.cell(row, col),
            None => "",
        }
    }

    /// Write one cell, growing the row if needed. Returns the previous value.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<String, EditError> {
        let len = self.rows.len();
        let target = self
            .rows
            .get_mut(row)
            .ok_or(EditError::IndexOutOfBounds { index: row, len })?;
        if target.len() <= col {
            target.resize(col + 1, String::new());
        }
        Ok(std::mem::replace(&mut target[col], value.into()))
    }

    /// Drop empty cells past the last column, left behind when a write
    /// beyond the header width is undone.
    pub fn trim_row(&mut self, row: usize) {
        let width = self.columns.len();
        if let Some(target) = self.rows.get_mut(row) {
            while target.len() > width && target.last().is_some_and(String::is_empty) {
                target.pop();
            }
        }
    }

    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<String, EditError> {
        let col = self
            .column_index(column)
            .ok_or_else(|| EditError::ColumnNotFound(column.to_string()))?;
        self.set_cell(row, col, value)
    }

    /// Insert rows before `at` (clamped to the end of the table).
    pub fn insert_rows(&mut self, at: usize, rows: Vec<Row>) {
        let at = at.min(self.rows.len());
        let width = self.columns.len();
        let padded = rows.into_iter().map(|mut r| {
            pad(&mut r, width);
            r
        });
        self.rows.splice(at..at, padded);
    }

    pub fn insert_blank_rows(&mut self, at: usize, count: usize) {
        let blank = vec![String::new(); self.columns.len()];
        self.insert_rows(at, vec![blank; count]);
    }

    /// Delete rows by index. Indices are deduplicated and removed from the
    /// highest down so earlier removals never shift later ones.
    ///
    /// Returns the removed rows in removal (descending) order; out-of-range
    /// indices are ignored.
    pub fn delete_rows(&mut self, indices: &[usize]) -> Vec<(usize, Row)> {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.rows.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        sorted
            .into_iter()
            .rev()
            .map(|i| (i, self.rows.remove(i)))
            .collect()
    }

    /// Remove a single row (used by undo of an insertion).
    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Replace a whole row, returning the previous one.
    pub fn replace_row(&mut self, index: usize, mut row: Row) -> Result<Row, EditError> {
        let len = self.rows.len();
        pad(&mut row, self.columns.len());
        let slot = self
            .rows
            .get_mut(index)
            .ok_or(EditError::IndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, row))
    }

    /// Append a row, returning its index.
    pub fn append_row(&mut self, mut row: Row) -> usize {
        pad(&mut row, self.columns.len());
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Swap in a full set of rows (snapshot restore). Returns the old rows.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Vec<Row> {
        let width = self.columns.len();
        let mut rows = rows;
        for row in &mut rows {
            pad(row, width);
        }
        std::mem::replace(&mut self.rows, rows)
    }

    /// Blank row sized to the current columns
    pub fn blank_row(&self) -> Row {
        vec![String::new(); self.columns.len()]
    }

    pub fn check_row(&self, index: usize) -> Result<(), EditError> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(EditError::IndexOutOfBounds { index, len: self.rows.len() })
        }
    }
}

fn pad(row: &mut Row, width: usize) {
    if row.len() < width {
        row.resize(width, String::new());
    }
}

/// Make header names unique by suffixing repeats with " (2)", " (3)", ...
fn dedup_names(columns: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for name in columns {
        if !out.contains(&name) {
            out.push(name);
            continue;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{name} ({n})");
            if !out.contains(&candidate) {
                out.push(candidate);
                break;
            }
            n += 1;
        }
    }
    out
}
