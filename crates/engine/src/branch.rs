//! Hierarchical paths (n1..n11) and branch duplication.
//!
//! A row's location in the plant tree is spread over up to eleven path
//! columns. Duplicating a branch copies every row under a source prefix to a
//! destination prefix, keeping the part of the path below the prefix.

use std::ops::Range;

use crate::error::EditError;
use crate::table::{Row, Table};
use crate::tag::{tag_column, TagAllocator};

/// Number of path levels (n1..n11)
pub const PATH_DEPTH: usize = 11;

/// Accepted header spellings for level `level` (1-based)
pub fn level_aliases(level: usize) -> [String; 4] {
    [
        format!("n{level}"),
        format!("Chemin n{level}"),
        format!("N{level}"),
        format!("Level {level}"),
    ]
}

// =============================================================================
// PathAddress
// =============================================================================

/// Ordered path segments; trailing empty segments are dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAddress(Vec<String>);

impl PathAddress {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        Self(segments)
    }

    /// Parse "A/B/C"
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        Self::new(text.split('/'))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PathAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

// =============================================================================
// PathColumns
// =============================================================================

/// Column index of each path level, if the table has it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathColumns {
    levels: [Option<usize>; PATH_DEPTH],
}

impl PathColumns {
    pub fn resolve(table: &Table) -> Self {
        let mut levels = [None; PATH_DEPTH];
        for (i, slot) in levels.iter_mut().enumerate() {
            *slot = level_aliases(i + 1)
                .iter()
                .find_map(|alias| table.column_index(alias));
        }
        Self { levels }
    }

    pub fn found(&self) -> usize {
        self.levels.iter().flatten().count()
    }

    pub fn is_path_column(&self, col: usize) -> bool {
        self.levels.contains(&Some(col))
    }

    pub fn column(&self, level: usize) -> Option<usize> {
        self.levels.get(level).copied().flatten()
    }

    /// All eleven segments of a row; absent levels read as ""
    pub fn path_of(&self, row: &Row) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| {
                level
                    .and_then(|col| row.get(col))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Write `path` into a row; levels past the path are blanked
    pub fn write_path(&self, row: &mut Row, path: &[String]) {
        for (level, col) in self.levels.iter().enumerate() {
            let Some(col) = *col else { continue };
            if row.len() <= col {
                row.resize(col + 1, String::new());
            }
            row[col] = path.get(level).cloned().unwrap_or_default();
        }
    }
}

/// Does `path` start with every segment of `prefix`?
pub fn matches_prefix(path: &[String], prefix: &PathAddress) -> bool {
    prefix.len() <= path.len() && path.iter().zip(prefix.segments()).all(|(a, b)| a == b)
}

// =============================================================================
// Duplication
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchDuplication {
    pub source: PathAddress,
    pub dest: PathAddress,
    /// Optional text substitution applied to non-path, non-tag cells
    pub find: String,
    pub replace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicationReport {
    pub copied: usize,
    /// Tag id of the first clone, when the table has a tag column
    pub first_tag: Option<u64>,
    /// Indices of the appended clones
    pub appended: Range<usize>,
}

/// Build the clones for a duplication without touching the table.
pub fn plan_duplication(table: &Table, request: &BranchDuplication) -> Result<(Vec<Row>, Option<u64>), EditError> {
    if request.source.is_empty() {
        return Err(EditError::EmptySourcePath);
    }
    let paths = PathColumns::resolve(table);
    if paths.found() == 0 {
        return Err(EditError::NoPathColumns);
    }

    let tag_col = tag_column(table);
    let mut tags = TagAllocator::from_table(table);
    let first_tag = tag_col.map(|_| tags.peek());
    let depth = request.source.len();

    let mut clones = Vec::new();
    for row in table.rows() {
        let path = paths.path_of(row);
        if !matches_prefix(&path, &request.source) {
            continue;
        }

        let mut clone = row.clone();
        let new_path: Vec<String> = request
            .dest
            .segments()
            .iter()
            .chain(&path[depth..])
            .take(PATH_DEPTH)
            .cloned()
            .collect();
        paths.write_path(&mut clone, &new_path);

        if !request.find.is_empty() {
            for (col, cell) in clone.iter_mut().enumerate() {
                if paths.is_path_column(col) || Some(col) == tag_col {
                    continue;
                }
                if cell.contains(request.find.as_str()) {
                    *cell = cell.replace(request.find.as_str(), &request.replace);
                }
            }
        }

        if let Some(col) = tag_col {
            if clone.len() <= col {
                clone.resize(col + 1, String::new());
            }
            clone[col] = tags.allocate().to_string();
        }
        clones.push(clone);
    }

    Ok((clones, first_tag))
}

/// Duplicate every row under `request.source` to `request.dest`.
///
/// Clones are appended in their original order. Zero matches is not an
/// error: the report simply says `copied == 0`.
pub fn duplicate(table: &mut Table, request: &BranchDuplication) -> Result<DuplicationReport, EditError> {
    let (clones, first_tag) = plan_duplication(table, request)?;
    let start = table.row_count();
    let copied = clones.len();
    for clone in clones {
        table.append_row(clone);
    }

    if copied == 0 {
        log::info!("branch {}: no matching rows", request.source);
    } else {
        log::info!("branch {} -> {}: {copied} rows duplicated", request.source, request.dest);
    }

    Ok(DuplicationReport {
        copied,
        first_tag: if copied > 0 { first_tag } else { None },
        appended: start..start + copied,
    })
}
