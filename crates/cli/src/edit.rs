//! Editing commands.
//!
//! Each command loads one file into an `Editor`, runs a single operation and
//! writes the result back in place or to `--output`.

use std::io::Read;
use std::path::{Path, PathBuf};

use datedit_config::session::Session;
use datedit_config::settings::Settings;
use datedit_engine::branch::{BranchDuplication, PathAddress};
use datedit_engine::bulk::{matching_cells, ReplaceOptions};
use datedit_engine::clipboard::parse_block;
use datedit_engine::module::DatModule;
use datedit_engine::operation::{
    AppendRows, DeleteRows, DuplicateBranch, Increment, Operation, PasteBlock, Propagate, ReplaceAll,
};
use datedit_engine::records::{self, NewVariable, VariableClass, NAME_COLUMN};
use datedit_engine::{Editor, Row};
use datedit_io::{DatDocument, OpenOptions};

use crate::rows::{parse_fields, parse_rows, resolve_column};
use crate::CliError;

/// A loaded file under edit
pub struct EditSession {
    path: PathBuf,
    module: DatModule,
    preamble: Option<Row>,
    editor: Editor,
}

impl EditSession {
    pub fn open(path: &Path, settings: &Settings) -> Result<Self, CliError> {
        let DatDocument { module, preamble, table } = datedit_io::open(path, &OpenOptions::default())?;
        Ok(Self {
            path: path.to_path_buf(),
            module,
            preamble,
            editor: Editor::with_capacity(table, settings.undo_capacity),
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn run(&mut self, op: &mut dyn Operation) -> Result<usize, CliError> {
        Ok(self.editor.execute(op)?)
    }

    /// Write back to the source file, or to `output`. An unchanged table
    /// is only written when an explicit output was asked for.
    pub fn save(self, output: Option<PathBuf>, settings: &Settings) -> Result<(), CliError> {
        if !self.editor.is_modified() && output.is_none() {
            eprintln!("note: nothing changed, {} left as is", self.path.display());
            return Ok(());
        }
        let target = output.unwrap_or_else(|| self.path.clone());
        let doc = DatDocument {
            module: self.module,
            preamble: self.preamble,
            table: self.editor.into_table(),
        };
        datedit_io::save(&doc, &target, settings.csv_delimiter_byte())?;
        log::info!("saved {}", target.display());
        remember(&target);
        Ok(())
    }
}

/// Record the file in session.json; failures only warn.
fn remember(path: &Path) {
    let mut session = Session::load().unwrap_or_default();
    session.opened(path);
    if let Err(e) = session.save() {
        log::warn!("could not update session: {}", e);
    }
}

// ============================================================================
// fill
// ============================================================================

pub fn cmd_fill(
    file: &Path,
    column: &str,
    source: usize,
    rows: &str,
    increment: bool,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    let mut session = EditSession::open(file, settings)?;
    let table = session.editor().table();
    let col = resolve_column(table, column)?;
    let column = table.columns()[col].clone();
    let targets = parse_rows(rows, table.row_count())?;

    let n = if increment {
        session.run(&mut Increment::new(source, column, targets))?
    } else {
        session.run(&mut Propagate::new(source, column, targets))?
    };
    println!("filled {} cells", n);
    session.save(output, settings)
}

// ============================================================================
// replace
// ============================================================================

pub struct ReplaceRequest {
    pub find: String,
    pub replacement: String,
    pub column: Option<String>,
    pub rows: Option<String>,
    pub ignore_case: bool,
    pub dry_run: bool,
}

pub fn cmd_replace(
    file: &Path,
    request: ReplaceRequest,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    if request.find.is_empty() {
        return Err(CliError::args("--find must not be empty"));
    }
    let mut session = EditSession::open(file, settings)?;
    let table = session.editor().table();
    let column = match &request.column {
        Some(name) => Some(resolve_column(table, name)?),
        None => None,
    };
    let rows = match &request.rows {
        Some(spec) => parse_rows(spec, table.row_count())?,
        None => (0..table.row_count()).collect(),
    };

    if request.dry_run {
        let cols: Vec<usize> = match column {
            Some(col) => vec![col],
            None => (0..table.column_count()).collect(),
        };
        let options = ReplaceOptions { case_insensitive: request.ignore_case };
        let cells = matching_cells(table, &rows, &cols, &request.find, options);
        for &(row, col) in &cells {
            println!("{}\t{}\t{}", row, table.columns()[col], table.cell(row, col));
        }
        eprintln!("would replace {} cells", cells.len());
        return Ok(());
    }

    let column = column.map(|col| table.columns()[col].clone());
    let mut op = ReplaceAll::new(rows, column, request.find, request.replacement)
        .case_insensitive(request.ignore_case);
    session.run(&mut op)?;
    let summary = op.summary();
    println!("replaced {} cells in {} rows", summary.cells, summary.rows);
    session.save(output, settings)
}

// ============================================================================
// duplicate-branch
// ============================================================================

pub fn cmd_duplicate_branch(
    file: &Path,
    from: &str,
    to: &str,
    find: Option<String>,
    replace: Option<String>,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    let mut session = EditSession::open(file, settings)?;
    let request = BranchDuplication {
        source: PathAddress::parse(from),
        dest: PathAddress::parse(to),
        find: find.unwrap_or_default(),
        replace: replace.unwrap_or_default(),
    };
    let mut op = DuplicateBranch::new(request);
    session.run(&mut op)?;

    match op.report() {
        Some(report) if report.copied > 0 => {
            print!("copied {} rows from {} to {}", report.copied, from, to);
            match report.first_tag {
                Some(tag) => println!(", first tag {}", tag),
                None => println!(),
            }
        }
        _ => {
            return Err(CliError::args(format!("no rows under {}", from))
                .with_hint("paths are matched segment by segment against n1..n11"));
        }
    }
    session.save(output, settings)
}

// ============================================================================
// create-variable / create-record
// ============================================================================

pub fn cmd_create_variable(
    file: &Path,
    class: &str,
    name: &str,
    path: Option<&str>,
    fields: &[String],
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    let class: VariableClass = class.parse().map_err(|e: datedit_engine::EditError| {
        CliError::from(e).with_hint(format!(
            "classes: {}",
            VariableClass::ALL.iter().map(|c| c.code()).collect::<Vec<_>>().join(", ")
        ))
    })?;
    let mut session = EditSession::open(file, settings)?;
    if session.module != DatModule::Varexp {
        return Err(CliError::args(format!("{} is not a varexp file", file.display()))
            .with_hint("variables are created in varexp.dat"));
    }

    let table = session.editor().table();
    if records::existing_names(table).iter().any(|n| n == name.trim()) {
        return Err(CliError::args(format!("variable {} already exists", name.trim())));
    }
    let mut variable = NewVariable::new(class, name);
    variable.path = path
        .map(|p| PathAddress::parse(p).segments().to_vec())
        .unwrap_or_default();
    variable.fields = parse_fields(fields)?;
    let row = variable.build_row(table)?;

    session.run(&mut AppendRows::new(vec![row]))?;
    println!("created {} {} at row {}", class, name.trim(), session.editor().table().row_count() - 1);
    session.save(output, settings)
}

pub fn cmd_create_record(
    file: &Path,
    like: Option<&str>,
    fields: &[String],
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    let mut session = EditSession::open(file, settings)?;
    if !session.module.supports_record_form() {
        return Err(CliError::args(format!("{} has no record form", session.module))
            .with_hint("records can be added to EVENT, EXPRV, CYCLIC and VARTREAT files"));
    }

    let table = session.editor().table();
    let mut row = match like {
        Some(name) => records::record_from_existing(table, name)
            .ok_or_else(|| CliError::args(format!("no record named {}", name)))?,
        None => records::blank_record(table),
    };
    let fields = parse_fields(fields)?;
    let unknown = records::set_fields(table, &mut row, &fields);
    if !unknown.is_empty() {
        log::warn!("ignored unknown columns: {}", unknown.join(", "));
    }

    if let (Some(original), Some(col)) = (like, table.find_column(NAME_COLUMN)) {
        if row[col].trim() == original.trim() {
            log::warn!("new record keeps the name {}; set Nom to rename it", original);
        }
    }

    session.run(&mut AppendRows::new(vec![row]))?;
    println!("appended record at row {}", session.editor().table().row_count() - 1);
    session.save(output, settings)
}

// ============================================================================
// paste / delete-rows
// ============================================================================

pub fn cmd_paste(
    file: &Path,
    row: usize,
    column: &str,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), CliError> {
    let text = match &input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io(format!("cannot read stdin: {}", e)))?;
            buf
        }
    };
    let block = parse_block(&text)?;

    let mut session = EditSession::open(file, settings)?;
    let col = resolve_column(session.editor().table(), column)?;
    let n = session.run(&mut PasteBlock::new(row, col, block))?;
    println!("pasted {} cells", n);
    session.save(output, settings)
}

pub fn cmd_delete_rows(file: &Path, rows: &str, output: Option<PathBuf>, settings: &Settings) -> Result<(), CliError> {
    let mut session = EditSession::open(file, settings)?;
    let indices = parse_rows(rows, session.editor().table().row_count())?;
    let n = session.run(&mut DeleteRows::new(indices))?;
    println!("deleted {} rows", n);
    session.save(output, settings)
}
