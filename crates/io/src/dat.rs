// Module .DAT files: ',' delimited, '"' quoted, Latin-1 encoded

use std::path::Path;

use datedit_engine::module::{DatModule, HeaderRule};
use datedit_engine::table::{Row, Table};

use crate::csv::parse_records;
use crate::error::IoError;

/// A loaded module file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatDocument {
    pub module: DatModule,
    /// First line kept verbatim (COMM files)
    pub preamble: Option<Row>,
    pub table: Table,
}

impl DatDocument {
    pub fn new(module: DatModule, table: Table) -> Self {
        Self { module, preamble: None, table }
    }
}

/// Decode Latin-1 bytes. Every byte maps to a char, so this never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
}

/// Encode as Latin-1. Fails with the first character that has no Latin-1 byte.
pub fn encode_latin1(text: &str) -> Result<Vec<u8>, char> {
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    if unmappable {
        let bad = text
            .chars()
            .find(|c| {
                let mut buf = [0u8; 4];
                encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut buf)).2
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(bad);
    }
    Ok(bytes.into_owned())
}

pub fn read(path: &Path) -> Result<DatDocument, IoError> {
    let module = path
        .file_name()
        .map(|n| DatModule::detect(&n.to_string_lossy()))
        .unwrap_or(DatModule::Other);
    read_as(path, module)
}

/// Read `path` with the layout of `module`, whatever its file name.
pub fn read_as(path: &Path, module: DatModule) -> Result<DatDocument, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::read(path, e))?;
    let content = decode_latin1(&bytes);
    let mut records = parse_records(&content, b',').map_err(|e| IoError::parse(path, e))?;

    let doc = match module.header_rule() {
        HeaderRule::HeaderRow => {
            if records.is_empty() {
                return Err(IoError::EmptyFile(path.to_path_buf()));
            }
            let columns = records.remove(0);
            DatDocument::new(module, Table::new(columns, records))
        }
        HeaderRule::Preamble => {
            let preamble = (!records.is_empty()).then(|| records.remove(0));
            DatDocument {
                module,
                preamble,
                table: Table::new(default_columns(module), records),
            }
        }
        HeaderRule::DataOnly => DatDocument::new(module, Table::new(default_columns(module), records)),
    };

    log::info!(
        "loaded {} ({}): {} rows x {} columns",
        path.display(),
        module,
        doc.table.row_count(),
        doc.table.column_count()
    );
    Ok(doc)
}

fn default_columns(module: DatModule) -> Vec<String> {
    module.default_headers().iter().map(|h| h.to_string()).collect()
}

/// Serialize to DAT text: header row only for varexp, preamble if present.
pub fn to_string(doc: &DatDocument) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    if let Some(preamble) = &doc.preamble {
        writer.write_record(preamble)?;
    }
    if doc.module.header_rule() == HeaderRule::HeaderRow {
        writer.write_record(doc.table.columns())?;
    }
    for row in doc.table.rows() {
        writer.write_record(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write(doc: &DatDocument, path: &Path) -> Result<(), IoError> {
    let text = to_string(doc).map_err(|e| IoError::write(path, e))?;
    let bytes = encode_latin1(&text).map_err(|c| {
        IoError::write(path, format!("character '{}' (U+{:04X}) outside Latin-1", c, c as u32))
    })?;
    std::fs::write(path, bytes).map_err(|e| IoError::write(path, e))?;
    log::info!("saved {} ({} rows)", path.display(), doc.table.row_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_event_file_is_data_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EVENT.DAT");
        fs::write(&path, b"EVT,E1,Alarme \xe9tage,00,0\r\nEVT,E2,,00,0\r\n").unwrap();

        let doc = read(&path).unwrap();
        assert_eq!(doc.module, DatModule::Event);
        assert_eq!(doc.table.row_count(), 2);
        assert_eq!(doc.table.get(0, "Nom"), "E1");
        assert_eq!(doc.table.get(0, "Description"), "Alarme étage");
        assert_eq!(doc.table.column_count(), DatModule::Event.default_headers().len());
    }

    #[test]
    fn test_data_only_roundtrip_is_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Exprv.DAT");
        let original: &[u8] = b"EXP,X1,d\xe9bit,00,0,,,1,ACT,VAR,B1,\"a,b\",1\r\n";
        fs::write(&path, original).unwrap();

        let doc = read(&path).unwrap();
        write(&doc, &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_varexp_keeps_header_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("varexp.dat");
        fs::write(&path, "Nom,Class,Tagname\r\nV1,BIT,10\r\n").unwrap();

        let doc = read(&path).unwrap();
        assert_eq!(doc.table.columns(), &["Nom", "Class", "Tagname"]);
        assert_eq!(doc.table.row_count(), 1);

        write(&doc, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Nom,Class,Tagname\r\nV1,BIT,10\r\n");
    }

    #[test]
    fn test_comm_preamble_written_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("COMM.DAT");
        fs::write(&path, "VERSION,3\r\nEQT,1,NET,PLC1\r\n").unwrap();

        let doc = read(&path).unwrap();
        assert_eq!(doc.preamble, Some(vec!["VERSION".to_string(), "3".to_string()]));
        assert_eq!(doc.table.get(0, "Nom"), "PLC1");

        write(&doc, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("VERSION,3\r\nEQT,1,NET,PLC1,"));
    }

    #[test]
    fn test_empty_varexp_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("varexp.dat");
        fs::write(&path, "").unwrap();
        assert!(matches!(read(&path), Err(IoError::EmptyFile(_))));
    }

    #[test]
    fn test_unencodable_text_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EVENT.DAT");
        let mut table = Table::new(default_columns(DatModule::Event), vec![vec!["EVT".into(), "E1".into()]]);
        table.set(0, "Description", "flèche → nord").unwrap();
        let doc = DatDocument::new(DatModule::Event, table);

        match write(&doc, &path) {
            Err(IoError::FileUnwritable { reason, .. }) => assert!(reason.contains("U+2192"), "{reason}"),
            other => panic!("expected FileUnwritable, got {other:?}"),
        }
        assert!(!path.exists());
        assert_eq!(encode_latin1("flèche").unwrap(), b"fl\xe8che");
    }
}
