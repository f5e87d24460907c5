//! Undo history for table edits
//!
//! Each entry is tagged at push time with the shape of the state it holds,
//! so undo never has to guess between a full snapshot and a list of deltas.

use crate::table::{Row, Table};

/// Default number of undo steps kept
pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellDelta {
    pub row: usize,
    pub col: usize,
    pub previous: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowChange {
    /// Row was added at `index`; undo removes it
    Inserted { index: usize },
    /// Row was removed from `index`; undo puts it back
    Removed { index: usize, row: Row },
    /// Row at `index` was overwritten; undo restores `previous`
    Replaced { index: usize, previous: Row },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoEntry {
    FullSnapshot(Vec<Row>),
    SparseDelta(Vec<CellDelta>),
    RowDelta(Vec<RowChange>),
}

/// What an undo step did to the table
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    /// Stack was empty
    Nothing,
    /// All rows were replaced; any visible set is stale
    FullRestore,
    /// Only these rows changed (cell or row deltas)
    Patched { rows: Vec<usize> },
}

pub struct UndoStack {
    entries: Vec<UndoEntry>,
    capacity: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Deep copy of every row
    pub fn snapshot_full(&mut self, table: &Table) {
        self.push(UndoEntry::FullSnapshot(table.rows().to_vec()));
    }

    /// Record per-cell previous values
    pub fn snapshot_sparse(&mut self, changes: Vec<CellDelta>) {
        if changes.is_empty() {
            return;
        }
        self.push(UndoEntry::SparseDelta(changes));
    }

    /// Record whole-row changes
    pub fn record_rows(&mut self, changes: Vec<RowChange>) {
        if changes.is_empty() {
            return;
        }
        self.push(UndoEntry::RowDelta(changes));
    }

    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);

        // Limit history size
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    /// Revert the most recent entry
    pub fn undo(&mut self, table: &mut Table) -> UndoOutcome {
        match self.pop() {
            None => UndoOutcome::Nothing,
            Some(entry) => revert(table, entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Apply an entry's stored state back onto the table.
///
/// Deltas replay in reverse declaration order; indices that no longer exist
/// are skipped.
pub fn revert(table: &mut Table, entry: UndoEntry) -> UndoOutcome {
    match entry {
        UndoEntry::FullSnapshot(rows) => {
            table.replace_rows(rows);
            UndoOutcome::FullRestore
        }
        UndoEntry::SparseDelta(changes) => {
            let mut touched = Vec::with_capacity(changes.len());
            for change in changes.into_iter().rev() {
                if table.set_cell(change.row, change.col, change.previous).is_ok() {
                    touched.push(change.row);
                }
            }
            let touched = dedup(touched);
            for &row in &touched {
                table.trim_row(row);
            }
            UndoOutcome::Patched { rows: touched }
        }
        UndoEntry::RowDelta(changes) => {
            let mut touched = Vec::with_capacity(changes.len());
            for change in changes.into_iter().rev() {
                match change {
                    RowChange::Inserted { index } => {
                        if table.remove_row(index).is_some() {
                            touched.push(index);
                        }
                    }
                    RowChange::Removed { index, row } => {
                        table.insert_rows(index, vec![row]);
                        touched.push(index.min(table.row_count() - 1));
                    }
                    RowChange::Replaced { index, previous } => {
                        if table.replace_row(index, previous).is_ok() {
                            touched.push(index);
                        }
                    }
                }
            }
            UndoOutcome::Patched { rows: dedup(touched) }
        }
    }
}

fn dedup(mut rows: Vec<usize>) -> Vec<usize> {
    rows.sort_unstable();
    rows.dedup();
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            vec!["A".into(), "B".into()],
            rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect(),
        )
    }

    #[test]
    fn test_empty_undo_is_noop() {
        let mut stack = UndoStack::new();
        let mut t = table(&[&["1", "2"]]);
        assert_eq!(stack.undo(&mut t), UndoOutcome::Nothing);
        assert_eq!(t.rows().len(), 1);
    }

    #[test]
    fn test_full_snapshot_restores_exactly() {
        let mut stack = UndoStack::new();
        let mut t = table(&[&["1", "2"], &["3", "4"]]);
        let original = t.clone();

        stack.snapshot_full(&t);
        t.set_cell(0, 0, "changed").unwrap();
        t.delete_rows(&[1]);
        t.append_row(vec!["x".into()]);

        assert_eq!(stack.undo(&mut t), UndoOutcome::FullRestore);
        assert_eq!(t, original);
    }

    #[test]
    fn test_sparse_delta_reverse_order() {
        let mut stack = UndoStack::new();
        let mut t = table(&[&["a", "b"]]);

        // Same cell edited twice within one entry: first previous value wins
        let first = t.set_cell(0, 0, "x").unwrap();
        let second = t.set_cell(0, 0, "y").unwrap();
        stack.snapshot_sparse(vec![
            CellDelta { row: 0, col: 0, previous: first },
            CellDelta { row: 0, col: 0, previous: second },
        ]);

        assert_eq!(stack.undo(&mut t), UndoOutcome::Patched { rows: vec![0] });
        assert_eq!(t.cell(0, 0), "a");
    }

    #[test]
    fn test_sparse_delta_undoes_widening_write() {
        let mut stack = UndoStack::new();
        let mut t = table(&[&["a", "b"], &["c", "d"]]);
        let original = t.clone();

        let previous = t.set_cell(0, 3, "wide").unwrap();
        assert_eq!(t.rows()[0].len(), 4);
        stack.snapshot_sparse(vec![CellDelta { row: 0, col: 3, previous }]);

        assert_eq!(stack.undo(&mut t), UndoOutcome::Patched { rows: vec![0] });
        assert_eq!(t, original);
    }

    #[test]
    fn test_row_delta_reinserts_deleted_rows() {
        let mut stack = UndoStack::new();
        let mut t = table(&[&["a", ""], &["b", ""], &["c", ""], &["d", ""], &["e", ""]]);
        let original = t.clone();

        let removed = t.delete_rows(&[1, 3]);
        stack.record_rows(
            removed
                .into_iter()
                .map(|(index, row)| RowChange::Removed { index, row })
                .collect(),
        );
        assert_eq!(t.row_count(), 3);

        stack.undo(&mut t);
        assert_eq!(t, original);
    }

    #[test]
    fn test_row_delta_removes_inserted_rows() {
        let mut stack = UndoStack::new();
        let mut t = table(&[&["a", ""]]);
        let i1 = t.append_row(vec!["b".into()]);
        let i2 = t.append_row(vec!["c".into()]);
        stack.record_rows(vec![
            RowChange::Inserted { index: i1 },
            RowChange::Inserted { index: i2 },
        ]);

        assert_eq!(stack.undo(&mut t), UndoOutcome::Patched { rows: vec![1, 2] });
        assert_eq!(t.row_count(), 1);
    }

    #[test]
    fn test_empty_row_snapshot_is_not_misclassified() {
        // A snapshot of an empty table stays a snapshot
        let mut stack = UndoStack::new();
        let mut t = table(&[]);
        stack.snapshot_full(&t);
        t.append_row(vec!["new".into()]);
        assert_eq!(stack.undo(&mut t), UndoOutcome::FullRestore);
        assert!(t.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut stack = UndoStack::with_capacity(3);
        let mut t = table(&[&["0", ""]]);
        for i in 1..=5 {
            stack.snapshot_full(&t);
            t.set_cell(0, 0, i.to_string()).unwrap();
        }
        assert_eq!(stack.len(), 3);

        while stack.can_undo() {
            stack.undo(&mut t);
        }
        // Snapshots of "0" and "1" were evicted
        assert_eq!(t.cell(0, 0), "2");
    }
}
