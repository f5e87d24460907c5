// File I/O: DAT modules, delimited text, Excel workbooks, project search

pub mod csv;
pub mod dat;
pub mod error;
pub mod project_search;
pub mod xlsx;

use std::path::Path;

use datedit_engine::module::DatModule;

pub use dat::DatDocument;
pub use error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Dat,
    Csv,
    /// xlsx, xlsm, xls, ods
    Spreadsheet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "dat" => Some(FileFormat::Dat),
            "csv" | "txt" => Some(FileFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(FileFormat::Spreadsheet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpenOptions<'a> {
    /// Worksheet to load; the first one when `None`
    pub sheet: Option<&'a str>,
    pub csv: csv::CsvOptions,
}

/// Load any supported file into a document. Non-DAT files come back as
/// `DatModule::Other`.
pub fn open(path: &Path, options: &OpenOptions) -> Result<DatDocument, IoError> {
    match FileFormat::from_path(path) {
        Some(FileFormat::Dat) => dat::read(path),
        Some(FileFormat::Csv) | None => {
            let table = csv::import(path, options.csv)?;
            log::info!("loaded {}: {} rows", path.display(), table.row_count());
            Ok(DatDocument::new(DatModule::Other, table))
        }
        Some(FileFormat::Spreadsheet) => {
            let mut sheets = xlsx::import(path)?;
            let index = match options.sheet {
                Some(name) => sheets.iter().position(|s| s.name == name).ok_or_else(|| {
                    IoError::Spreadsheet {
                        path: path.to_path_buf(),
                        reason: format!("no sheet named '{}'", name),
                    }
                })?,
                None => 0,
            };
            let sheet = sheets.swap_remove(index);
            Ok(DatDocument::new(DatModule::detect(&sheet.name), sheet.table))
        }
    }
}

/// Save a document in the format implied by `path`.
pub fn save(doc: &DatDocument, path: &Path, csv_delimiter: u8) -> Result<(), IoError> {
    match FileFormat::from_path(path) {
        Some(FileFormat::Dat) => dat::write(doc, path),
        Some(FileFormat::Spreadsheet) => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Sheet1".to_string());
            xlsx::export(&[(name.as_str(), &doc.table)], path)
        }
        Some(FileFormat::Csv) | None => csv::export(&doc.table, path, csv_delimiter, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datedit_engine::table::Table;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(FileFormat::from_path(Path::new("EVENT.DAT")), Some(FileFormat::Dat));
        assert_eq!(FileFormat::from_path(Path::new("a.XLSX")), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_path(Path::new("a.csv")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_convert_dat_to_xlsx_and_back() {
        let dir = tempdir().unwrap();
        let dat_path = dir.path().join("varexp.dat");
        fs::write(&dat_path, "Nom,Tagname\r\nV1,7\r\n").unwrap();

        let doc = open(&dat_path, &OpenOptions::default()).unwrap();
        let xlsx_path = dir.path().join("varexp.xlsx");
        save(&doc, &xlsx_path, b';').unwrap();

        let back = open(&xlsx_path, &OpenOptions::default()).unwrap();
        assert_eq!(back.module, DatModule::Varexp);
        assert_eq!(back.table, doc.table);
    }

    #[test]
    fn test_unknown_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let t = Table::new(vec!["A".into()], vec![vec!["1".into()]]);
        xlsx::export(&[("Data", &t)], &path).unwrap();

        let options = OpenOptions { sheet: Some("Missing"), ..Default::default() };
        assert!(matches!(open(&path, &options), Err(IoError::Spreadsheet { .. })));
    }
}
