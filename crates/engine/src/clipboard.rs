//! Tab-separated block interchange with spreadsheets and other editors.

use crate::error::EditError;
use crate::history::CellDelta;
use crate::table::Table;

/// Render `rows` x `cols` as TSV: tabs between cells, newlines between rows.
pub fn copy_block(table: &Table, rows: &[usize], cols: &[usize]) -> String {
    rows.iter()
        .map(|&row| {
            cols.iter()
                .map(|&col| table.cell(row, col))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_cell(raw: &str) -> String {
    let value = raw.trim();
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.to_string(),
        None => value.to_string(),
    }
}

/// Parse TSV into rows of cleaned cells (trimmed, one pair of surrounding
/// quotes removed).
pub fn parse_block(text: &str) -> Result<Vec<Vec<String>>, EditError> {
    let block: Vec<Vec<String>> = text
        .lines()
        .map(|line| line.split('\t').map(clean_cell).collect())
        .collect();
    if block.is_empty() || text.trim().is_empty() {
        return Err(EditError::ClipboardEmptyOrMalformed);
    }
    Ok(block)
}

/// Write `block` with its top-left cell at (`row`, `col`).
///
/// Cells falling past the last row or column are dropped.
pub fn paste_block(table: &mut Table, row: usize, col: usize, block: &[Vec<String>]) -> Result<Vec<CellDelta>, EditError> {
    table.check_row(row)?;
    if col >= table.column_count() {
        return Err(EditError::IndexOutOfBounds { index: col, len: table.column_count() });
    }

    let mut written = Vec::new();
    for (r_off, values) in block.iter().enumerate() {
        let r = row + r_off;
        if r >= table.row_count() {
            break;
        }
        for (c_off, value) in values.iter().enumerate() {
            let c = col + c_off;
            if c >= table.column_count() {
                break;
            }
            let previous = table.set_cell(r, c, value.as_str())?;
            written.push(CellDelta { row: r, col: c, previous });
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Table {
        Table::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                vec!["a1".into(), "b1".into(), "c1".into()],
                vec!["a2".into(), "b2".into(), "c2".into()],
            ],
        )
    }

    #[test]
    fn test_copy_block() {
        let t = grid();
        assert_eq!(copy_block(&t, &[1, 0], &[1, 2]), "b2\tc2\nb1\tc1");
    }

    #[test]
    fn test_parse_block_cleans_cells() {
        let block = parse_block(" x \t\"quoted\"\r\ny\n").unwrap();
        assert_eq!(block, vec![vec!["x", "quoted"], vec!["y"]]);
    }

    #[test]
    fn test_parse_block_rejects_empty() {
        assert_eq!(parse_block(""), Err(EditError::ClipboardEmptyOrMalformed));
        assert_eq!(parse_block("\n  \n"), Err(EditError::ClipboardEmptyOrMalformed));
    }

    #[test]
    fn test_paste_clips_at_bounds() {
        let mut t = grid();
        let block = parse_block("1\t2\t3\n4\t5\t6\n7\t8\t9").unwrap();
        let written = paste_block(&mut t, 1, 1, &block).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(t.cell(1, 1), "1");
        assert_eq!(t.cell(1, 2), "2");
        assert_eq!(written[0].previous, "b2");
        assert_eq!(t.cell(0, 1), "b1");
    }

    #[test]
    fn test_paste_anchor_out_of_range() {
        let mut t = grid();
        let block = vec![vec!["x".to_string()]];
        assert!(paste_block(&mut t, 5, 0, &block).is_err());
        assert!(paste_block(&mut t, 0, 3, &block).is_err());
    }
}
