use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    FileNotFound(PathBuf),
    FileUnreadable { path: PathBuf, reason: String },
    FileUnwritable { path: PathBuf, reason: String },
    /// Workbook could not be opened, read or written
    Spreadsheet { path: PathBuf, reason: String },
    /// File (or workbook) holds nothing to load
    EmptyFile(PathBuf),
    /// Malformed delimited record
    Parse { path: PathBuf, line: Option<u64>, reason: String },
}

impl IoError {
    pub(crate) fn read(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound(path.to_path_buf())
        } else {
            IoError::FileUnreadable { path: path.to_path_buf(), reason: err.to_string() }
        }
    }

    pub(crate) fn write(path: &std::path::Path, err: impl fmt::Display) -> Self {
        IoError::FileUnwritable { path: path.to_path_buf(), reason: err.to_string() }
    }

    pub(crate) fn parse(path: &std::path::Path, err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        IoError::Parse { path: path.to_path_buf(), line, reason: err.to_string() }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            IoError::FileUnreadable { path, reason } => {
                write!(f, "cannot read {}: {}", path.display(), reason)
            }
            IoError::FileUnwritable { path, reason } => {
                write!(f, "cannot write {}: {}", path.display(), reason)
            }
            IoError::Spreadsheet { path, reason } => {
                write!(f, "spreadsheet {}: {}", path.display(), reason)
            }
            IoError::EmptyFile(path) => write!(f, "{} is empty", path.display()),
            IoError::Parse { path, line: Some(line), reason } => {
                write!(f, "{}:{}: {}", path.display(), line, reason)
            }
            IoError::Parse { path, line: None, reason } => {
                write!(f, "{}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for IoError {}
