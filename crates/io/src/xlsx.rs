// Excel import (xlsx, xlsm, xls, ods) and export (xlsx only)
//
// Every cell comes in as text; the first row of each sheet names the columns.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use datedit_engine::table::{Row, Table};

use crate::error::IoError;

/// One imported worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    pub name: String,
    pub table: Table,
}

fn spreadsheet(path: &Path, reason: String) -> IoError {
    IoError::Spreadsheet { path: path.to_path_buf(), reason }
}

/// Import every sheet of a workbook.
pub fn import(path: &Path) -> Result<Vec<NamedTable>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound(path.to_path_buf()));
    }
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| spreadsheet(path, format!("failed to open: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::EmptyFile(path.to_path_buf()));
    }

    let mut tables = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| spreadsheet(path, format!("failed to read sheet '{}': {}", sheet_name, e)))?;

        let mut rows: Vec<Row> = range
            .rows()
            .map(|cells| cells.iter().map(cell_text).collect())
            .collect();
        let columns = if rows.is_empty() { Vec::new() } else { rows.remove(0) };

        log::debug!("sheet '{}': {} rows", sheet_name, rows.len());
        tables.push(NamedTable {
            name: sheet_name.clone(),
            table: Table::new(columns, rows),
        });
    }
    Ok(tables)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integers without decimals
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => format!("{}", n),
        Data::Int(n) => format!("{}", n),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Write tables as named worksheets, headers in bold on the first row.
pub fn export(tables: &[(&str, &Table)], path: &Path) -> Result<(), IoError> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in tables {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(*name)
            .map_err(|e| spreadsheet(path, format!("failed to create sheet '{}': {}", name, e)))?;

        for (col, title) in table.columns().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, title, &header_format)
                .map_err(|e| spreadsheet(path, e.to_string()))?;
        }
        for (r, row) in table.rows().iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet
                    .write_string(r as u32 + 1, col as u16, value)
                    .map_err(|e| spreadsheet(path, e.to_string()))?;
            }
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| IoError::write(path, e))?;
    log::info!("exported {} sheet(s) to {}", tables.len(), path.display());
    Ok(())
}
