//! Row filtering and sorting - the visible set
//!
//! The grid never shows `Table.rows` directly; it shows a `VisibleSet`, the
//! ordered list of row indices that pass the active `FilterSpec`.
//!
//! Key invariants:
//! - every index in a VisibleSet is < the table's row count
//! - unsorted visible sets preserve table order
//! - an empty predicate is inactive, it never means "match everything"

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Number of predicate slots offered by the filter bar
pub const FILTER_SLOTS: usize = 3;

// =============================================================================
// VisibleSet
// =============================================================================

/// Rows currently passing the filter, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    indices: Vec<usize>,
    total: usize,
}

impl VisibleSet {
    /// Identity set: every row visible, table order
    pub fn all(row_count: usize) -> Self {
        Self {
            indices: (0..row_count).collect(),
            total: row_count,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row count of the table this set was computed from
    pub fn total(&self) -> usize {
        self.total
    }

    /// Is any row hidden?
    pub fn is_filtered(&self) -> bool {
        self.indices.len() < self.total
    }

    pub fn contains(&self, row: usize) -> bool {
        self.indices.contains(&row)
    }

    /// Table row shown at display position `n`
    pub fn nth(&self, n: usize) -> Option<usize> {
        self.indices.get(n).copied()
    }

    /// Display position of a table row
    pub fn position_of(&self, row: usize) -> Option<usize> {
        self.indices.iter().position(|&r| r == row)
    }
}

// =============================================================================
// FilterSpec
// =============================================================================

/// How active predicates combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    #[default]
    And,
    Or,
}

/// Case-insensitive substring test on one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: usize,
    pub text: String,
}

impl Predicate {
    pub fn new(column: usize, text: impl Into<String>) -> Self {
        Self { column, text: text.into() }
    }

    /// Empty (or whitespace-only) text disables the predicate
    pub fn is_active(&self) -> bool {
        !self.text.trim().is_empty()
    }

    fn needle(&self) -> String {
        self.text.trim().to_lowercase()
    }
}

/// Filter bar state: three predicate slots and a combine mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    slots: [Option<Predicate>; FILTER_SLOTS],
    pub mode: CombineMode,
}

impl FilterSpec {
    pub fn new(mode: CombineMode) -> Self {
        Self { slots: Default::default(), mode }
    }

    /// Set one slot. Slots past `FILTER_SLOTS` are ignored.
    pub fn set(&mut self, slot: usize, predicate: Predicate) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(predicate);
        }
    }

    pub fn clear_slot(&mut self, slot: usize) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = None;
        }
    }

    /// Fill slots from (column name, text) pairs.
    ///
    /// Unknown column names leave their slot empty: a typo in one predicate
    /// must not abort the whole filter.
    pub fn from_names(table: &Table, pairs: &[(&str, &str)], mode: CombineMode) -> Self {
        let mut spec = Self::new(mode);
        for (slot, (name, text)) in pairs.iter().take(FILTER_SLOTS).enumerate() {
            match table.column_index(name) {
                Some(col) => spec.set(slot, Predicate::new(col, *text)),
                None => log::debug!("filter slot {slot}: unknown column '{name}', skipped"),
            }
        }
        spec
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.slots.iter().flatten()
    }

    pub fn active_predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates().filter(|p| p.is_active())
    }

    pub fn is_active(&self) -> bool {
        self.active_predicates().next().is_some()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

/// Evaluate a filter over the whole table.
///
/// AND: a row passes iff every active predicate matches.
/// OR: a row passes iff at least one active predicate matches.
/// No active predicate: every row passes (no scan).
pub fn apply(table: &Table, spec: &FilterSpec) -> VisibleSet {
    let active: Vec<(usize, String)> = spec
        .active_predicates()
        .map(|p| (p.column, p.needle()))
        .collect();

    if active.is_empty() {
        return VisibleSet::all(table.row_count());
    }

    let indices = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let mut hits = active.iter().map(|(col, needle)| {
                row.get(*col)
                    .map(|cell| cell.to_lowercase().contains(needle.as_str()))
                    .unwrap_or(false)
            });
            match spec.mode {
                CombineMode::And => hits.all(|m| m),
                CombineMode::Or => hits.any(|m| m),
            }
        })
        .map(|(i, _)| i)
        .collect();

    VisibleSet {
        indices,
        total: table.row_count(),
    }
}

// =============================================================================
// Sorting
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort key for a cell: numbers < text < blank
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(OrderedFloat<f64>),
    Text(String),
    Blank,
}

impl SortKey {
    fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return SortKey::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => SortKey::Number(OrderedFloat(n)),
            _ => SortKey::Text(trimmed.to_lowercase()),
        }
    }
}

/// Stable sort of the visible rows by one column.
///
/// Blanks stay at the end in both directions.
pub fn sort_visible(table: &Table, visible: &mut VisibleSet, col: usize, direction: SortDirection) {
    let mut keyed: Vec<(SortKey, usize)> = visible
        .indices
        .iter()
        .map(|&row| (SortKey::from_cell(table.cell(row, col)), row))
        .collect();

    keyed.sort_by(|a, b| {
        let ord = a.0.cmp(&b.0);
        match (direction, &a.0, &b.0) {
            (SortDirection::Descending, SortKey::Blank, _) | (SortDirection::Descending, _, SortKey::Blank) => ord,
            (SortDirection::Descending, _, _) => ord.reverse(),
            (SortDirection::Ascending, _, _) => ord,
        }
    });

    visible.indices = keyed.into_iter().map(|(_, row)| row).collect();
}

// =============================================================================
// Tests
// =============================================================================
