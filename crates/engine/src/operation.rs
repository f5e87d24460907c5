//! Edit operations.
//!
//! Every mutation of a `Table` goes through an `Operation`. An operation
//! captures the state it needs to be undone *before* it mutates, and hands
//! that entry over through `invert` once `apply` succeeded.

use crate::branch::{duplicate, BranchDuplication, DuplicationReport};
use crate::bulk::{self, ReplaceOptions, ReplaceSummary};
use crate::clipboard::paste_block;
use crate::error::EditError;
use crate::history::{CellDelta, RowChange, UndoEntry};
use crate::table::{Row, Table};

pub trait Operation {
    /// Short human-readable name, used in logs and status messages
    fn label(&self) -> &str;

    /// Mutate the table. Returns the number of cells or rows affected.
    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError>;

    /// Undo entry captured by the last successful `apply`
    fn invert(&mut self) -> Option<UndoEntry>;
}

fn snapshot(table: &Table) -> UndoEntry {
    UndoEntry::FullSnapshot(table.rows().to_vec())
}

// ── Cell edit ───────────────────────────────────────────────────────

pub struct EditCell {
    pub row: usize,
    pub col: usize,
    pub value: String,
    undo: Option<UndoEntry>,
}

impl EditCell {
    pub fn new(row: usize, col: usize, value: impl Into<String>) -> Self {
        Self { row, col, value: value.into(), undo: None }
    }
}

impl Operation for EditCell {
    fn label(&self) -> &str {
        "edit cell"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        if table.cell(self.row, self.col) == self.value {
            table.check_row(self.row)?;
            return Ok(0);
        }
        let previous = table.set_cell(self.row, self.col, self.value.clone())?;
        self.undo = Some(UndoEntry::SparseDelta(vec![CellDelta {
            row: self.row,
            col: self.col,
            previous,
        }]));
        Ok(1)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

// ── Column fills ────────────────────────────────────────────────────

pub struct Propagate {
    pub source_row: usize,
    pub column: String,
    pub targets: Vec<usize>,
    undo: Option<UndoEntry>,
}

impl Propagate {
    pub fn new(source_row: usize, column: impl Into<String>, targets: Vec<usize>) -> Self {
        Self { source_row, column: column.into(), targets, undo: None }
    }
}

impl Operation for Propagate {
    fn label(&self) -> &str {
        "propagate"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        let before = snapshot(table);
        let n = bulk::propagate(table, self.source_row, &self.column, &self.targets)?;
        self.undo = Some(before);
        Ok(n)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

pub struct Increment {
    pub source_row: usize,
    pub column: String,
    pub targets: Vec<usize>,
    undo: Option<UndoEntry>,
}

impl Increment {
    pub fn new(source_row: usize, column: impl Into<String>, targets: Vec<usize>) -> Self {
        Self { source_row, column: column.into(), targets, undo: None }
    }
}

impl Operation for Increment {
    fn label(&self) -> &str {
        "increment"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        let before = snapshot(table);
        let n = bulk::increment(table, self.source_row, &self.column, &self.targets)?;
        self.undo = Some(before);
        Ok(n)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

// ── Replace ─────────────────────────────────────────────────────────

pub struct ReplaceAll {
    pub rows: Vec<usize>,
    /// `None` searches every column
    pub column: Option<String>,
    pub find: String,
    pub replace: String,
    pub options: ReplaceOptions,
    summary: ReplaceSummary,
    undo: Option<UndoEntry>,
}

impl ReplaceAll {
    pub fn new(rows: Vec<usize>, column: Option<String>, find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            rows,
            column,
            find: find.into(),
            replace: replace.into(),
            options: ReplaceOptions::default(),
            summary: ReplaceSummary::default(),
            undo: None,
        }
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.options.case_insensitive = yes;
        self
    }

    /// Cell and row counts of the last apply
    pub fn summary(&self) -> &ReplaceSummary {
        &self.summary
    }
}

impl Operation for ReplaceAll {
    fn label(&self) -> &str {
        "replace all"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        let before = snapshot(table);
        self.summary = bulk::scoped_replace(
            table,
            &self.rows,
            self.column.as_deref(),
            &self.find,
            &self.replace,
            self.options,
        )?;
        self.undo = Some(before);
        Ok(self.summary.cells)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

// ── Row structure ───────────────────────────────────────────────────

pub struct InsertBlankRows {
    pub at: usize,
    pub count: usize,
    undo: Option<UndoEntry>,
}

impl InsertBlankRows {
    pub fn new(at: usize, count: usize) -> Self {
        Self { at, count, undo: None }
    }
}

impl Operation for InsertBlankRows {
    fn label(&self) -> &str {
        "insert rows"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        if self.count == 0 {
            return Ok(0);
        }
        self.undo = Some(snapshot(table));
        table.insert_blank_rows(self.at, self.count);
        Ok(self.count)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

pub struct DeleteRows {
    pub indices: Vec<usize>,
    undo: Option<UndoEntry>,
}

impl DeleteRows {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices, undo: None }
    }
}

impl Operation for DeleteRows {
    fn label(&self) -> &str {
        "delete rows"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        let removed = table.delete_rows(&self.indices);
        let n = removed.len();
        self.undo = Some(UndoEntry::RowDelta(
            removed
                .into_iter()
                .map(|(index, row)| RowChange::Removed { index, row })
                .collect(),
        ));
        Ok(n)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

/// Append whole rows at the end (row paste, record creation)
pub struct AppendRows {
    pub rows: Vec<Row>,
    undo: Option<UndoEntry>,
}

impl AppendRows {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, undo: None }
    }
}

impl Operation for AppendRows {
    fn label(&self) -> &str {
        "append rows"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        let changes: Vec<RowChange> = self
            .rows
            .iter()
            .map(|row| RowChange::Inserted { index: table.append_row(row.clone()) })
            .collect();
        let n = changes.len();
        self.undo = Some(UndoEntry::RowDelta(changes));
        Ok(n)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

// ── Clipboard / branch ──────────────────────────────────────────────

pub struct PasteBlock {
    pub row: usize,
    pub col: usize,
    pub block: Vec<Vec<String>>,
    undo: Option<UndoEntry>,
}

impl PasteBlock {
    pub fn new(row: usize, col: usize, block: Vec<Vec<String>>) -> Self {
        Self { row, col, block, undo: None }
    }
}

impl Operation for PasteBlock {
    fn label(&self) -> &str {
        "paste block"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        let before = snapshot(table);
        let written = paste_block(table, self.row, self.col, &self.block)?;
        self.undo = Some(before);
        Ok(written.len())
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

pub struct DuplicateBranch {
    pub request: BranchDuplication,
    report: Option<DuplicationReport>,
    undo: Option<UndoEntry>,
}

impl DuplicateBranch {
    pub fn new(request: BranchDuplication) -> Self {
        Self { request, report: None, undo: None }
    }

    pub fn report(&self) -> Option<&DuplicationReport> {
        self.report.as_ref()
    }
}

impl Operation for DuplicateBranch {
    fn label(&self) -> &str {
        "duplicate branch"
    }

    fn apply(&mut self, table: &mut Table) -> Result<usize, EditError> {
        let report = duplicate(table, &self.request)?;
        let n = report.copied;
        self.undo = Some(UndoEntry::RowDelta(
            report.appended.clone().map(|index| RowChange::Inserted { index }).collect(),
        ));
        self.report = Some(report);
        Ok(n)
    }

    fn invert(&mut self) -> Option<UndoEntry> {
        self.undo.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::revert;

    fn table() -> Table {
        Table::new(
            vec!["Nom".into(), "Tagname".into(), "n1".into(), "n2".into()],
            vec![
                vec!["P_1".into(), "1".into(), "A".into(), "B".into()],
                vec!["P_2".into(), "2".into(), "A".into(), "C".into()],
                vec!["V".into(), "3".into(), "Z".into(), "".into()],
            ],
        )
    }

    fn run_and_revert(op: &mut dyn Operation) {
        let mut t = table();
        let original = t.clone();
        let n = op.apply(&mut t).unwrap();
        assert!(n > 0, "{} changed nothing", op.label());
        assert_ne!(t, original);
        let entry = op.invert().unwrap();
        revert(&mut t, entry);
        assert_eq!(t, original, "{} did not revert", op.label());
    }

    #[test]
    fn test_every_operation_reverts() {
        run_and_revert(&mut EditCell::new(0, 0, "X"));
        run_and_revert(&mut EditCell::new(1, 6, "past the last column"));
        run_and_revert(&mut Propagate::new(0, "Nom", vec![1, 2]));
        run_and_revert(&mut Increment::new(0, "Nom", vec![0, 1, 2]));
        run_and_revert(&mut ReplaceAll::new(vec![0, 1, 2], None, "P_", "Q_"));
        run_and_revert(&mut InsertBlankRows::new(1, 2));
        run_and_revert(&mut DeleteRows::new(vec![2, 0]));
        run_and_revert(&mut AppendRows::new(vec![vec!["new".into()]]));
        run_and_revert(&mut PasteBlock::new(1, 1, vec![vec!["9".into(), "9".into()]]));
        run_and_revert(&mut DuplicateBranch::new(BranchDuplication {
            source: crate::branch::PathAddress::new(["A"]),
            dest: crate::branch::PathAddress::new(["K"]),
            ..Default::default()
        }));
    }

    #[test]
    fn test_failed_apply_leaves_no_undo() {
        let mut t = table();
        let mut op = Increment::new(2, "Nom", vec![0, 1]);
        assert!(op.apply(&mut t).is_err());
        assert!(op.invert().is_none());
    }

    #[test]
    fn test_edit_cell_same_value_is_noop() {
        let mut t = table();
        let mut op = EditCell::new(0, 0, "P_1");
        assert_eq!(op.apply(&mut t).unwrap(), 0);
        assert!(op.invert().is_none());
    }

    #[test]
    fn test_replace_all_summary() {
        let mut t = table();
        let mut op = ReplaceAll::new(vec![0, 1, 2], Some("Nom".into()), "p_", "Q_").case_insensitive(true);
        assert_eq!(op.apply(&mut t).unwrap(), 2);
        assert_eq!(op.summary().rows, 2);
        assert_eq!(t.cell(1, 0), "Q_2");
    }
}
