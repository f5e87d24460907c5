// Generic delimited files (CSV with ';' or ',')

use std::io::Read;
use std::path::Path;

use datedit_engine::table::{Row, Table};

use crate::error::IoError;

/// Delimiter used when sniffing finds nothing better
pub const DEFAULT_DELIMITER: u8 = b';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// `None` sniffs the delimiter from the first lines
    pub delimiter: Option<u8>,
    /// First record holds the column names
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: None, has_headers: true }
    }
}

pub fn import(path: &Path, options: CsvOptions) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    log::debug!("{}: delimiter '{}'", path.display(), delimiter as char);
    let rows = parse_records(&content, delimiter).map_err(|e| IoError::parse(path, e))?;
    Ok(into_table(rows, options.has_headers))
}

/// Pick ';' or ',' by checking consistency across the first few lines.
///
/// Each candidate is scored by (lines with the same field count as line 1)
/// times that field count. Ties go to ';'.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b';', b','];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    let mut best = DEFAULT_DELIMITER;
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must split the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read a file as UTF-8, falling back to Windows-1252 (Excel exports)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub(crate) fn parse_records(content: &str, delimiter: u8) -> Result<Vec<Row>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}

fn into_table(mut rows: Vec<Row>, has_headers: bool) -> Table {
    if has_headers && !rows.is_empty() {
        let columns = rows.remove(0);
        Table::new(columns, rows)
    } else {
        Table::headerless(rows)
    }
}

pub fn export(table: &Table, path: &Path, delimiter: u8, include_headers: bool) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IoError::write(path, e))?;

    if include_headers {
        writer.write_record(table.columns()).map_err(|e| IoError::write(path, e))?;
    }
    for row in table.rows() {
        writer.write_record(row).map_err(|e| IoError::write(path, e))?;
    }

    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}
