//! Read-only commands: show, next-tag, convert, search.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use datedit_config::settings::{FilterLogic, Settings};
use datedit_engine::clipboard::copy_block;
use datedit_engine::filter::{CombineMode, FilterSpec, Predicate, SortDirection, FILTER_SLOTS};
use datedit_engine::module::DatModule;
use datedit_engine::tag::next_tag_id;
use datedit_engine::{Editor, Table};
use datedit_io::project_search::{self, SearchEvent, SearchOptions};
use datedit_io::{FileFormat, OpenOptions};

use crate::rows::{parse_predicate, resolve_column};
use crate::CliError;

/// Widest cell printed in text mode
const MAX_CELL_WIDTH: usize = 32;

pub struct ShowQuery {
    pub predicates: Vec<String>,
    pub any: bool,
    pub sort: Option<String>,
    pub desc: bool,
    pub columns: Vec<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    Text,
    Json,
    Tsv,
}

// ============================================================================
// show
// ============================================================================

pub fn cmd_show(file: &Path, query: &ShowQuery, format: ShowFormat, settings: &Settings) -> Result<(), CliError> {
    if query.predicates.len() > FILTER_SLOTS {
        return Err(CliError::args(format!("at most {} --where predicates", FILTER_SLOTS)));
    }
    let doc = datedit_io::open(file, &OpenOptions::default())?;
    let mut editor = Editor::with_capacity(doc.table, settings.undo_capacity);

    let mode = if query.any || settings.filter_logic == FilterLogic::Or {
        CombineMode::Or
    } else {
        CombineMode::And
    };
    let mut spec = FilterSpec::new(mode);
    for (slot, expr) in query.predicates.iter().enumerate() {
        let (column, text) = parse_predicate(expr)?;
        let col = resolve_column(editor.table(), &column)?;
        spec.set(slot, Predicate::new(col, text));
    }
    editor.set_filter(spec);

    if let Some(name) = &query.sort {
        let col = resolve_column(editor.table(), name)?;
        let direction = if query.desc { SortDirection::Descending } else { SortDirection::Ascending };
        editor.sort(col, direction);
    }

    let table = editor.table();
    let cols: Vec<usize> = if query.columns.is_empty() {
        (0..table.column_count()).collect()
    } else {
        query
            .columns
            .iter()
            .map(|name| resolve_column(table, name.trim()))
            .collect::<Result<_, _>>()?
    };
    let visible = editor.visible();
    let rows: Vec<usize> = visible
        .indices()
        .iter()
        .copied()
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = match format {
        ShowFormat::Json => write_json(&mut out, table, &rows, &cols),
        ShowFormat::Tsv if rows.is_empty() => Ok(()),
        ShowFormat::Tsv => writeln!(out, "{}", copy_block(table, &rows, &cols)),
        ShowFormat::Text => write_text(&mut out, table, &rows, &cols),
    };
    written.map_err(|e| CliError::io(e.to_string()))?;

    if format == ShowFormat::Text {
        eprintln!("{} of {} rows", visible.len(), visible.total());
    }
    Ok(())
}

fn write_json(out: &mut impl Write, table: &Table, rows: &[usize], cols: &[usize]) -> io::Result<()> {
    let records: Vec<Value> = rows
        .iter()
        .map(|&row| {
            let cells: Map<String, Value> = cols
                .iter()
                .map(|&col| (table.columns()[col].clone(), Value::String(table.cell(row, col).to_string())))
                .collect();
            json!({ "row": row, "cells": cells })
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)
}

fn write_text(out: &mut impl Write, table: &Table, rows: &[usize], cols: &[usize]) -> io::Result<()> {
    let index_width = rows.iter().max().map(|r| r.to_string().len()).unwrap_or(1).max(3);
    let widths: Vec<usize> = cols
        .iter()
        .map(|&col| {
            let header = table.columns()[col].chars().count();
            rows.iter()
                .map(|&row| table.cell(row, col).chars().count())
                .fold(header, usize::max)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let mut line = pad_right("row", index_width);
    for (&col, &width) in cols.iter().zip(&widths) {
        line.push_str("  ");
        line.push_str(&pad_right(&table.columns()[col], width));
    }
    writeln!(out, "{}", line.trim_end())?;

    for &row in rows {
        let mut line = pad_right(&row.to_string(), index_width);
        for (&col, &width) in cols.iter().zip(&widths) {
            line.push_str("  ");
            line.push_str(&pad_right(table.cell(row, col), width));
        }
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Pad or truncate to exactly `width` characters; truncation ends in "..".
fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len > width {
        let kept: String = s.chars().take(width.saturating_sub(2)).collect();
        format!("{}..", kept)
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

// ============================================================================
// next-tag
// ============================================================================

pub fn cmd_next_tag(file: &Path) -> Result<(), CliError> {
    let doc = datedit_io::open(file, &OpenOptions::default())?;
    println!("{}", next_tag_id(&doc.table));
    Ok(())
}

// ============================================================================
// convert
// ============================================================================

pub fn cmd_convert(input: &Path, output: &Path, sheet: Option<&str>, settings: &Settings) -> Result<(), CliError> {
    let options = OpenOptions { sheet, ..Default::default() };
    let mut doc = datedit_io::open(input, &options)?;

    if FileFormat::from_path(output) == Some(FileFormat::Dat) && doc.module == DatModule::Other {
        let name = output.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        doc.module = DatModule::detect(&name);
        if doc.module == DatModule::Other {
            log::warn!("{} is not a known module file; written without header row", output.display());
        }
    }

    datedit_io::save(&doc, output, settings.csv_delimiter_byte())?;
    println!(
        "converted {} -> {} ({} rows)",
        input.display(),
        output.display(),
        doc.table.row_count()
    );
    Ok(())
}

// ============================================================================
// search
// ============================================================================

pub fn cmd_search(
    folder: PathBuf,
    text: String,
    max_hits: Option<usize>,
    json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    if text.is_empty() {
        return Err(CliError::args("search text must not be empty"));
    }
    if !folder.is_dir() {
        return Err(CliError::args(format!("{} is not a folder", folder.display())));
    }
    let options = SearchOptions {
        extensions: settings.search_extensions.iter().map(|e| e.to_lowercase()).collect(),
        max_hits,
        ..Default::default()
    };

    let handle = project_search::spawn(folder, text, options);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut hits = Vec::new();

    for event in handle.events().iter() {
        match event {
            SearchEvent::Hit(hit) => {
                if json {
                    hits.push(json!({
                        "path": hit.path.display().to_string(),
                        "line": hit.line,
                        "text": hit.text,
                    }));
                } else if writeln!(out, "{}:{}: {}", hit.path.display(), hit.line, hit.text).is_err() {
                    // stdout closed (e.g. piped into head)
                    handle.cancel();
                }
            }
            SearchEvent::Skipped { path, reason } => log::warn!("skipped {}: {}", path.display(), reason),
            SearchEvent::Finished { files, hits: count, cancelled } => {
                eprintln!(
                    "{} hits in {} files{}",
                    count,
                    files,
                    if cancelled { " (cancelled)" } else { "" }
                );
                break;
            }
        }
    }
    handle.join();

    if json {
        serde_json::to_writer_pretty(&mut out, &hits).map_err(|e| CliError::io(e.to_string()))?;
        writeln!(out).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["Nom".into(), "Description".into()],
            vec![
                vec!["PUMP_1".into(), "pompe de relevage principale du poste".into()],
                vec!["V".into(), "".into()],
            ],
        )
    }

    #[test]
    fn test_pad_right() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("étage", 5), "étage");
        assert_eq!(pad_right("abcdef", 4), "ab..");
    }

    #[test]
    fn test_write_text_aligns_and_truncates() {
        let mut buf = Vec::new();
        write_text(&mut buf, &table(), &[0, 1], &[0, 1]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("row  Nom     Description"));
        assert!(lines[1].starts_with("0    PUMP_1  pompe"));
        assert!(lines[1].ends_with(".."));
        assert_eq!(lines[2], "1    V");
    }

    #[test]
    fn test_write_json_keeps_column_order() {
        let mut buf = Vec::new();
        write_json(&mut buf, &table(), &[1], &[1, 0]).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["row"], 1);
        let keys: Vec<&String> = value[0]["cells"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["Description", "Nom"]);
    }
}
