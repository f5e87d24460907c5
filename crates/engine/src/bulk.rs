//! Column-scoped bulk edits on a selection of rows.
//!
//! These functions mutate the table directly and return how many cells they
//! touched. Undo capture lives one level up, in `operation`.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::error::EditError;
use crate::table::Table;

fn trailing_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)$").expect("static pattern"))
}

// ── Propagate ───────────────────────────────────────────────────────

/// Copy the source cell into the same column of every target row.
///
/// An unknown column is skipped (returns 0).
pub fn propagate(table: &mut Table, source_row: usize, column: &str, targets: &[usize]) -> Result<usize, EditError> {
    let Some(col) = table.column_index(column) else {
        log::debug!("propagate: column '{column}' not found, skipped");
        return Ok(0);
    };
    table.check_row(source_row)?;
    check_rows(table, targets)?;

    let value = table.cell(source_row, col).to_string();
    for &row in targets {
        table.set_cell(row, col, value.clone())?;
    }
    Ok(targets.len())
}

// ── Increment ───────────────────────────────────────────────────────

/// How an increment series is generated from its seed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncrementPattern {
    /// Seed is all digits: "7" -> 7, 8, 9
    Numeric { start: u64 },
    /// Seed ends with digits: "Capteur_7" -> Capteur_7, Capteur_8
    Suffix { prefix: String, start: u64 },
}

impl IncrementPattern {
    pub fn detect(seed: &str) -> Result<Self, EditError> {
        let invalid = || EditError::InvalidOperand(seed.to_string());

        if !seed.is_empty() && seed.chars().all(|c| c.is_ascii_digit()) {
            let start = seed.parse().map_err(|_| invalid())?;
            return Ok(IncrementPattern::Numeric { start });
        }

        let caps = trailing_digits().captures(seed).ok_or_else(invalid)?;
        let digits = caps.get(1).ok_or_else(invalid)?;
        let start = digits.as_str().parse().map_err(|_| invalid())?;
        Ok(IncrementPattern::Suffix {
            prefix: seed[..digits.start()].to_string(),
            start,
        })
    }

    /// Value at position `offset` in the series
    pub fn value_at(&self, offset: u64) -> Option<String> {
        match self {
            IncrementPattern::Numeric { start } => start.checked_add(offset).map(|n| n.to_string()),
            IncrementPattern::Suffix { prefix, start } => {
                start.checked_add(offset).map(|n| format!("{prefix}{n}"))
            }
        }
    }
}

/// Fill targets with a series seeded by the source cell, in selection order.
///
/// Fails with `InvalidOperand` before touching anything if the seed is not
/// numeric and has no numeric suffix.
pub fn increment(table: &mut Table, source_row: usize, column: &str, targets: &[usize]) -> Result<usize, EditError> {
    let Some(col) = table.column_index(column) else {
        log::debug!("increment: column '{column}' not found, skipped");
        return Ok(0);
    };
    table.check_row(source_row)?;
    check_rows(table, targets)?;

    let seed = table.cell(source_row, col).to_string();
    let pattern = IncrementPattern::detect(&seed)?;

    let values = (0..targets.len() as u64)
        .map(|offset| pattern.value_at(offset))
        .collect::<Option<Vec<String>>>()
        .ok_or_else(|| EditError::InvalidOperand(seed.clone()))?;

    for (&row, value) in targets.iter().zip(values) {
        table.set_cell(row, col, value)?;
    }
    Ok(targets.len())
}

// ── Search / replace ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub cells: usize,
    pub rows: usize,
}

/// Compiled find text, plain substring or case-insensitive literal
pub(crate) enum Matcher {
    Exact(String),
    Folded(Regex),
}

impl Matcher {
    pub(crate) fn new(find: &str, options: ReplaceOptions) -> Self {
        if options.case_insensitive {
            let re = RegexBuilder::new(&regex::escape(find))
                .case_insensitive(true)
                .build();
            match re {
                Ok(re) => return Matcher::Folded(re),
                Err(e) => log::warn!("case-insensitive pattern rejected ({e}); using exact match"),
            }
        }
        Matcher::Exact(find.to_string())
    }

    pub(crate) fn is_match(&self, cell: &str) -> bool {
        match self {
            Matcher::Exact(find) => cell.contains(find.as_str()),
            Matcher::Folded(re) => re.is_match(cell),
        }
    }

    pub(crate) fn replace(&self, cell: &str, with: &str) -> String {
        match self {
            Matcher::Exact(find) => cell.replace(find.as_str(), with),
            Matcher::Folded(re) => re.replace_all(cell, regex::NoExpand(with)).into_owned(),
        }
    }
}

/// Replace every occurrence of `find` in the scoped rows.
///
/// `column: None` searches all columns. An unknown column is skipped.
pub fn scoped_replace(
    table: &mut Table,
    rows: &[usize],
    column: Option<&str>,
    find: &str,
    replace: &str,
    options: ReplaceOptions,
) -> Result<ReplaceSummary, EditError> {
    let mut summary = ReplaceSummary::default();
    if find.is_empty() {
        return Ok(summary);
    }

    let cols: Vec<usize> = match column {
        Some(name) => match table.column_index(name) {
            Some(col) => vec![col],
            None => {
                log::debug!("replace: column '{name}' not found, skipped");
                return Ok(summary);
            }
        },
        None => (0..table.column_count()).collect(),
    };
    check_rows(table, rows)?;

    let matcher = Matcher::new(find, options);
    for &row in rows {
        let mut changed = false;
        for &col in &cols {
            let cell = table.cell(row, col);
            if !matcher.is_match(cell) {
                continue;
            }
            let updated = matcher.replace(cell, replace);
            if updated != cell {
                table.set_cell(row, col, updated)?;
                summary.cells += 1;
                changed = true;
            }
        }
        if changed {
            summary.rows += 1;
        }
    }
    Ok(summary)
}

/// Cells `scoped_replace` would modify, without modifying them
pub fn matching_cells(table: &Table, rows: &[usize], cols: &[usize], find: &str, options: ReplaceOptions) -> Vec<(usize, usize)> {
    if find.is_empty() {
        return Vec::new();
    }
    let matcher = Matcher::new(find, options);
    rows.iter()
        .flat_map(|&row| cols.iter().map(move |&col| (row, col)))
        .filter(|&(row, col)| matcher.is_match(table.cell(row, col)))
        .collect()
}

fn check_rows(table: &Table, rows: &[usize]) -> Result<(), EditError> {
    rows.iter().try_for_each(|&row| table.check_row(row))
}
