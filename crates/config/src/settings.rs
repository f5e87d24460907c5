// Application settings
// Loaded from ~/.config/datedit/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the filter bar combines its predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLogic {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Undo
    #[serde(rename = "undo.capacity")]
    pub undo_capacity: usize,

    // Filter
    #[serde(rename = "filter.combineMode")]
    pub filter_logic: FilterLogic,

    // Search / replace
    #[serde(rename = "search.caseInsensitive")]
    pub case_insensitive: bool,

    #[serde(rename = "search.extensions")]
    pub search_extensions: Vec<String>,

    // Delimited files
    #[serde(rename = "csv.defaultDelimiter")]
    pub csv_delimiter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            undo_capacity: 20,
            filter_logic: FilterLogic::And,
            case_insensitive: false,
            search_extensions: vec!["dat".into(), "csv".into()],
            csv_delimiter: ";".into(),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Number of undo steps kept per file
    "undo.capacity": 20,

    // Filter bar: "and" = every filter must match, "or" = any filter
    "filter.combineMode": "and",

    // Replace-all case sensitivity
    "search.caseInsensitive": false,

    // Extensions scanned by the project search
    "search.extensions": ["dat", "csv"],

    // Delimiter for CSV export (";" or ",")
    "csv.defaultDelimiter": ";"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring `//` comment lines
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut settings: Settings = serde_json::from_str(&cleaned)?;
        if settings.undo_capacity == 0 {
            log::warn!("undo.capacity must be at least 1");
            settings.undo_capacity = 1;
        }
        Ok(settings)
    }

    /// Delimiter byte for CSV export; ';' unless configured as ','
    pub fn csv_delimiter_byte(&self) -> u8 {
        match self.csv_delimiter.as_str() {
            "," => b',',
            ";" => b';',
            other => {
                log::warn!("unsupported csv.defaultDelimiter '{other}', using ';'");
                b';'
            }
        }
    }
}

/// Create default settings file with comments
fn create_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("error creating config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        log::warn!("error writing default settings.json: {}", e);
    }
}
