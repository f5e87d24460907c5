//! Editing session over one loaded table.

use crate::bulk::ReplaceOptions;
use crate::error::EditError;
use crate::filter::{self, CombineMode, FilterSpec, SortDirection, VisibleSet};
use crate::history::{UndoEntry, UndoOutcome, UndoStack, DEFAULT_CAPACITY};
use crate::operation::Operation;
use crate::search::{FindCursor, ReplaceStep};
use crate::table::Table;

/// Owns the table with its undo history, filter and visible set.
///
/// A new `Editor` is created for every loaded file.
pub struct Editor {
    table: Table,
    undo: UndoStack,
    filter: FilterSpec,
    sort: Option<(usize, SortDirection)>,
    visible: VisibleSet,
    modified: bool,
}

impl Editor {
    pub fn new(table: Table) -> Self {
        Self::with_capacity(table, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(table: Table, undo_capacity: usize) -> Self {
        let visible = VisibleSet::all(table.row_count());
        Self {
            table,
            undo: UndoStack::with_capacity(undo_capacity),
            filter: FilterSpec::default(),
            sort: None,
            visible,
            modified: false,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Run an operation; its undo entry is kept only if something changed.
    pub fn execute(&mut self, op: &mut dyn Operation) -> Result<usize, EditError> {
        let affected = op.apply(&mut self.table)?;
        let entry = op.invert();
        if affected == 0 {
            log::debug!("{}: nothing changed", op.label());
            return Ok(0);
        }
        if let Some(entry) = entry {
            self.undo.push(entry);
        }
        self.modified = true;
        log::info!("{}: {affected} affected", op.label());
        self.refresh();
        Ok(affected)
    }

    /// Revert the latest operation.
    ///
    /// After a full restore the filter is cleared and every row is visible.
    pub fn undo(&mut self) -> UndoOutcome {
        let outcome = self.undo.undo(&mut self.table);
        match &outcome {
            UndoOutcome::Nothing => log::debug!("nothing to undo"),
            UndoOutcome::FullRestore => {
                self.filter.clear();
                self.sort = None;
                self.visible = VisibleSet::all(self.table.row_count());
                self.modified = true;
            }
            UndoOutcome::Patched { .. } => {
                self.modified = true;
                self.refresh();
            }
        }
        outcome
    }

    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.filter = spec;
        self.refresh();
    }

    /// Build the filter from `(column name, text)` pairs
    pub fn filter_by_names(&mut self, pairs: &[(&str, &str)], mode: CombineMode) {
        let spec = FilterSpec::from_names(&self.table, pairs, mode);
        self.set_filter(spec);
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.refresh();
    }

    pub fn sort(&mut self, col: usize, direction: SortDirection) {
        self.sort = Some((col, direction));
        self.refresh();
    }

    /// Find / replace cursor over the rows visible right now
    pub fn find_cursor(&self, find: &str, columns: Option<Vec<usize>>, options: ReplaceOptions) -> FindCursor {
        FindCursor::new(find, self.visible.indices().to_vec(), columns, options)
    }

    /// One replace-next step, recorded as a single-cell undo entry.
    pub fn replace_next(&mut self, cursor: &mut FindCursor, with: &str) -> ReplaceStep {
        let step = cursor.replace_next(&mut self.table, with);
        if !step.changes.is_empty() {
            self.undo.push(UndoEntry::SparseDelta(step.changes.clone()));
            self.modified = true;
        }
        step
    }

    fn refresh(&mut self) {
        self.visible = filter::apply(&self.table, &self.filter);
        if let Some((col, direction)) = self.sort {
            filter::sort_visible(&self.table, &mut self.visible, col, direction);
        }
        log::debug!("visible {}/{}", self.visible.len(), self.visible.total());
    }
}
