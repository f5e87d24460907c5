//! Argument parsing shared by the commands: row specs, `COL=VALUE` fields,
//! `COL~TEXT` predicates and column lookup.

use datedit_engine::Table;

use crate::CliError;

/// Parse a row spec like `0,3-5` (zero-based, ranges inclusive).
///
/// Order is kept and duplicates are dropped; every index must be below
/// `row_count`.
pub fn parse_rows(spec: &str, row_count: usize) -> Result<Vec<usize>, CliError> {
    let mut rows = Vec::new();
    for part in spec.split(',').map(str::trim) {
        if part.is_empty() {
            return Err(CliError::args(format!("empty item in row spec {:?}", spec)));
        }
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_index(a, spec)?, parse_index(b, spec)?),
            None => {
                let i = parse_index(part, spec)?;
                (i, i)
            }
        };
        if start > end {
            return Err(CliError::args(format!("descending range {:?} in row spec", part)));
        }
        if end >= row_count {
            return Err(CliError::args(format!(
                "row {} out of range ({} rows)",
                end, row_count
            ))
            .with_hint("rows are numbered from 0"));
        }
        for i in start..=end {
            if !rows.contains(&i) {
                rows.push(i);
            }
        }
    }
    Ok(rows)
}

fn parse_index(s: &str, spec: &str) -> Result<usize, CliError> {
    s.trim()
        .parse()
        .map_err(|_| CliError::args(format!("invalid row {:?} in row spec {:?}", s.trim(), spec)))
}

/// Parse repeated `COL=VALUE` arguments.
pub fn parse_fields(args: &[String]) -> Result<Vec<(String, String)>, CliError> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(CliError::args(format!("expected COL=VALUE, got {:?}", arg))),
        })
        .collect()
}

/// Parse a `COL~TEXT` filter predicate.
pub fn parse_predicate(expr: &str) -> Result<(String, String), CliError> {
    match expr.split_once('~') {
        Some((column, text)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), text.to_string()))
        }
        Some(_) => Err(CliError::args(format!("empty column name in --where {:?}", expr))),
        None => Err(CliError::args(format!("no '~' in --where {:?}", expr))
            .with_hint("write predicates as COLUMN~TEXT")),
    }
}

/// Column index by name, exact first then case-insensitive.
pub fn resolve_column(table: &Table, name: &str) -> Result<usize, CliError> {
    table
        .column_index(name)
        .or_else(|| table.find_column(name))
        .ok_or_else(|| {
            CliError::args(format!("unknown column {:?}", name))
                .with_hint(format!("available: {}", table.columns().join(", ")))
        })
}
