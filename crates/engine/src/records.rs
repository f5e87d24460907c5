//! Record and variable creation.
//!
//! Generic module records are built from the column titles (some titles
//! double as default values). Varexp variables are built from a class
//! template, a path and a fresh tag id.

use std::str::FromStr;

use crate::branch::{PathColumns, PATH_DEPTH};
use crate::error::EditError;
use crate::table::{Row, Table};
use crate::tag::{next_tag_id, tag_column};

pub const NAME_COLUMN: &str = "Nom";
pub const CLASS_COLUMN: &str = "Class";

/// Path elements plus the variable name
pub const MAX_VARIABLE_DEPTH: usize = 12;

// ── Generic records ─────────────────────────────────────────────────

/// Default cell value implied by a column title
pub fn default_value_for_title(title: &str) -> &'static str {
    match title.trim().to_lowercase().as_str() {
        "=0" | "0" | "00" => "0",
        "=1" | "1" => "1",
        _ => "",
    }
}

/// New row pre-filled from the column titles
pub fn blank_record(table: &Table) -> Row {
    table
        .columns()
        .iter()
        .map(|title| default_value_for_title(title).to_string())
        .collect()
}

/// Copy of the first row whose `Nom` equals `name`
pub fn record_from_existing(table: &Table, name: &str) -> Option<Row> {
    let col = table.find_column(NAME_COLUMN)?;
    table.rows().iter().find(|row| table_cell(row, col) == name).cloned()
}

/// Sorted distinct non-blank names
pub fn existing_names(table: &Table) -> Vec<String> {
    let Some(col) = table.find_column(NAME_COLUMN) else {
        return Vec::new();
    };
    let mut names: Vec<String> = table
        .rows()
        .iter()
        .map(|row| table_cell(row, col))
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Write `column = value` pairs into a row (values are trimmed).
///
/// Returns the names that matched no column; those pairs are skipped.
pub fn set_fields(table: &Table, row: &mut Row, fields: &[(String, String)]) -> Vec<String> {
    let mut unknown = Vec::new();
    for (name, value) in fields {
        match table.column_index(name).or_else(|| table.find_column(name)) {
            Some(col) => {
                if row.len() <= col {
                    row.resize(col + 1, String::new());
                }
                row[col] = value.trim().to_string();
            }
            None => {
                log::debug!("field '{name}' has no column, skipped");
                unknown.push(name.clone());
            }
        }
    }
    unknown
}

fn table_cell(row: &Row, col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

// ── Varexp variables ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableClass {
    Cmd,
    Bit,
    Acm,
    Ala,
    Reg,
    Ctv,
    Txt,
    Cxt,
    Chr,
}

const BASE: &[(&str, &str)] = &[
    ("Source", "I"),
    ("Broadcast", "0"),
    ("StationOrAssociationNumber", "0"),
    ("UseExtendedAttributes", "1"),
    ("PermanentScan", "2"),
];

const TRAILER: &[(&str, &str)] = &[
    ("Recorder", "0"),
    ("MessageAlarm", "0"),
    ("BrowsingLevel", "0"),
    ("WithInitialValue", "0"),
    ("AlarmMaskLevel", "-2"),
    ("AlarmMaintenanceLevel", "-2"),
];

const CMD: &[(&str, &str)] = &[
    ("Log0_1", "0"), ("Log1_0", "0"), ("BitCommandLevel", "0"),
    ("ExtBinary", "0"), ("InitialValue", "0"),
];
const BIT: &[(&str, &str)] = &[
    ("Log0_1", "0"), ("Log1_0", "0"),
    ("ExtBinary", "0"), ("InitialValue", "0"),
    ("AlarmAcknowledgmentLevel", "-1"),
];
const ACM: &[(&str, &str)] = &[
    ("Log0_1", "0"), ("Log1_0", "0"), ("BitCommandLevel", "0"),
    ("AlarmLevel", "0"), ("AlarmActiveAt1", "1"), ("AlarmTemporization", "0"),
    ("ExtBinary", "0"), ("InitialValue", "0"),
];
const ALA: &[(&str, &str)] = &[
    ("Log0_1", "0"), ("Log1_0", "0"),
    ("AlarmLevel", "0"), ("AlarmActiveAt1", "1"), ("AlarmTemporization", "0"),
    ("ExtBinary", "0"), ("InitialValue", "0"),
];
const REG: &[(&str, &str)] = &[
    ("DeadbandValue", "0"), ("MinimumValue", "0"),
    ("ScaledValue", "0"), ("DeviceMinimumValue", "0"),
    ("MaximumValue", "65535"), ("DeviceMaximumValue", "65535"),
    ("DeadbandType", "0"), ("ExtBinary", "0"), ("InitialValue", "0"),
];
const CTV: &[(&str, &str)] = &[
    ("DeadbandValue", "0"), ("MinimumValue", "0"),
    ("ScaledValue", "0"), ("DeviceMinimumValue", "0"),
    ("MaximumValue", "65535"), ("DeviceMaximumValue", "65535"),
    ("ControlMinimumValue", "0"), ("RegisterCommandLevel", "0"),
    ("ControlMaximumValue", "65535"),
    ("DeadbandType", "0"), ("ExtBinary", "0"), ("InitialValue", "0"),
];
const TXT: &[(&str, &str)] = &[
    ("Textsize", "132"), ("TextCommandLevel", "0"), ("ExtBinary", "0"),
];
const CHR: &[(&str, &str)] = &[
    ("MinimumValue", "0"), ("ScaledValue", "0"), ("DeviceMinimumValue", "0"),
    ("MaximumValue", "65535"), ("DeviceMaximumValue", "65535"),
    ("Chrono_Period", "100"), ("Chrono_Type", "1"),
    ("Chrono_EnableBitName", ""), ("Chrono_EnableBitTransition", "1"),
    ("Chrono_ResetBitName", ""), ("Chrono_ResetBitTransition", "1"),
    ("DeadbandType", "0"), ("InitialValue", "0"),
];

impl VariableClass {
    pub const ALL: [VariableClass; 9] = [
        VariableClass::Cmd,
        VariableClass::Bit,
        VariableClass::Acm,
        VariableClass::Ala,
        VariableClass::Reg,
        VariableClass::Ctv,
        VariableClass::Txt,
        VariableClass::Cxt,
        VariableClass::Chr,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            VariableClass::Cmd => "CMD",
            VariableClass::Bit => "BIT",
            VariableClass::Acm => "ACM",
            VariableClass::Ala => "ALA",
            VariableClass::Reg => "REG",
            VariableClass::Ctv => "CTV",
            VariableClass::Txt => "TXT",
            VariableClass::Cxt => "CXT",
            VariableClass::Chr => "CHR",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            VariableClass::Cmd => "Etat commandable",
            VariableClass::Bit => "Etat",
            VariableClass::Acm => "Alarme commandable",
            VariableClass::Ala => "Alarme",
            VariableClass::Reg => "Registre analogique",
            VariableClass::Ctv => "Registre analogique commandable",
            VariableClass::Txt => "Texte",
            VariableClass::Cxt => "Texte commandable",
            VariableClass::Chr => "Chronomètre",
        }
    }

    /// Attribute defaults written into a new variable of this class
    pub fn template(&self) -> Vec<(&'static str, &'static str)> {
        let specific = match self {
            VariableClass::Cmd => CMD,
            VariableClass::Bit => BIT,
            VariableClass::Acm => ACM,
            VariableClass::Ala => ALA,
            VariableClass::Reg => REG,
            VariableClass::Ctv => CTV,
            VariableClass::Txt | VariableClass::Cxt => TXT,
            VariableClass::Chr => CHR,
        };
        BASE.iter().chain(specific).chain(TRAILER).copied().collect()
    }
}

impl FromStr for VariableClass {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        VariableClass::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| EditError::InvalidOperand(s.to_string()))
    }
}

impl std::fmt::Display for VariableClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariable {
    pub class: VariableClass,
    pub name: String,
    /// Branch above the variable; blank elements are ignored
    pub path: Vec<String>,
    /// Column overrides applied after the template
    pub fields: Vec<(String, String)>,
}

impl NewVariable {
    pub fn new(class: VariableClass, name: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
            path: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Full path: branch elements followed by the name
    pub fn path_elements(&self) -> Vec<String> {
        self.path
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .chain(std::iter::once(self.name.trim().to_string()))
            .collect()
    }

    pub fn validate(&self) -> Result<(), EditError> {
        let name = self.name.trim();
        if !is_identifier(name) {
            return Err(EditError::InvalidName(name.to_string()));
        }
        let elements = self.path_elements();
        if let Some(bad) = elements.iter().find(|e| !is_identifier(e)) {
            return Err(EditError::InvalidName(bad.clone()));
        }
        if elements.len() > MAX_VARIABLE_DEPTH {
            return Err(EditError::PathTooLong {
                len: elements.len(),
                max: MAX_VARIABLE_DEPTH,
            });
        }
        Ok(())
    }

    /// Build the varexp row. Columns the table lacks are skipped.
    pub fn build_row(&self, table: &Table) -> Result<Row, EditError> {
        self.validate()?;
        let mut row = table.blank_row();
        let mut put = |col: Option<usize>, value: &str| {
            if let Some(col) = col {
                row[col] = value.to_string();
            }
        };

        put(table.find_column(NAME_COLUMN), self.name.trim());
        put(table.find_column(CLASS_COLUMN), self.class.code());

        let paths = PathColumns::resolve(table);
        for (level, element) in self.path_elements().iter().take(PATH_DEPTH).enumerate() {
            put(paths.column(level), element);
        }

        for (column, value) in self.class.template() {
            put(table.column_index(column), value);
        }

        let unknown = set_fields(table, &mut row, &self.fields);
        if !unknown.is_empty() {
            log::warn!("variable {}: ignored fields {}", self.name, unknown.join(", "));
        }

        if let Some(col) = tag_column(table) {
            row[col] = next_tag_id(table).to_string();
        }
        Ok(row)
    }
}
