// datedit CLI - headless editing of DAT configuration files

mod edit;
mod exit_codes;
mod rows;
mod view;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use datedit_config::settings::Settings;
use datedit_engine::EditError;
use datedit_io::IoError;

use exit_codes::{edit_exit_code, file_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "datedit")]
#[command(about = "Edit DAT configuration files from the command line")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print rows, optionally filtered and sorted
    #[command(after_help = "\
Examples:
  datedit show varexp.dat --where Nom~PUMP --where Desc~north
  datedit show varexp.dat --where Nom~PUMP --where Nom~VALVE --any
  datedit show EVENT.DAT --sort Nom --desc --limit 20 --json")]
    Show {
        file: PathBuf,

        /// Filter predicate COLUMN~TEXT (substring, case-insensitive). Up to 3.
        #[arg(long = "where", value_name = "COL~TEXT")]
        predicates: Vec<String>,

        /// Keep rows matching any predicate instead of all
        #[arg(long)]
        any: bool,

        /// Sort visible rows by this column
        #[arg(long, value_name = "COL")]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Columns to print, comma-separated
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Print at most N rows
        #[arg(long)]
        limit: Option<usize>,

        /// Output JSON objects
        #[arg(long, conflicts_with = "tsv")]
        json: bool,

        /// Output bare tab-separated cells, ready to paste
        #[arg(long)]
        tsv: bool,
    },

    /// Print the next free tag id
    NextTag { file: PathBuf },

    /// Copy a cell down a column, or increment it
    #[command(after_help = "\
Examples:
  datedit fill COMM.DAT --column Equipement --source 0 --rows 1-9
  datedit fill varexp.dat --column Nom --source 4 --rows 4-6 --increment")]
    Fill {
        file: PathBuf,

        #[arg(long)]
        column: String,

        /// Row holding the value to copy
        #[arg(long)]
        source: usize,

        /// Target rows, e.g. 0,3-5
        #[arg(long)]
        rows: String,

        /// Write seed, seed+1, ... instead of copies
        #[arg(long)]
        increment: bool,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Replace text in a set of rows
    Replace {
        file: PathBuf,

        #[arg(long)]
        find: String,

        #[arg(long = "with")]
        replacement: String,

        /// Restrict to one column (default: every column)
        #[arg(long)]
        column: Option<String>,

        /// Rows to touch (default: every row)
        #[arg(long)]
        rows: Option<String>,

        #[arg(long)]
        ignore_case: bool,

        /// List the cells that would change; write nothing
        #[arg(long, conflicts_with = "output")]
        dry_run: bool,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Clone every row under one branch to another branch
    #[command(after_help = "\
Examples:
  datedit duplicate-branch varexp.dat --from SITE/PUMP1 --to SITE/PUMP2
  datedit duplicate-branch varexp.dat --from A/B --to X/Y --find 'pompe 1' --replace 'pompe 2'")]
    DuplicateBranch {
        file: PathBuf,

        /// Source path, segments separated by '/'
        #[arg(long)]
        from: String,

        /// Destination path
        #[arg(long)]
        to: String,

        /// Text substituted in the copied cells
        #[arg(long, requires = "replace")]
        find: Option<String>,

        #[arg(long, requires = "find")]
        replace: Option<String>,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Append a varexp variable built from its class template
    CreateVariable {
        file: PathBuf,

        /// CMD, BIT, ACM, ALA, REG, CTV, TXT, CXT or CHR
        #[arg(long)]
        class: String,

        #[arg(long)]
        name: String,

        /// Branch above the variable, e.g. SITE/PUMP1
        #[arg(long)]
        path: Option<String>,

        /// Column override COLUMN=VALUE. Repeatable.
        #[arg(long = "set", value_name = "COL=VALUE")]
        fields: Vec<String>,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Append a record to a module file
    CreateRecord {
        file: PathBuf,

        /// Start from a copy of the record with this name
        #[arg(long)]
        like: Option<String>,

        /// Field value COLUMN=VALUE. Repeatable.
        #[arg(long = "set", value_name = "COL=VALUE")]
        fields: Vec<String>,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Paste a tab-separated block at a cell
    Paste {
        file: PathBuf,

        /// Anchor row
        #[arg(long)]
        row: usize,

        /// Anchor column name
        #[arg(long)]
        column: String,

        /// TSV file to paste (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Delete rows
    DeleteRows {
        file: PathBuf,

        /// Rows to delete, e.g. 0,3-5
        #[arg(long)]
        rows: String,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Convert between DAT, CSV and spreadsheet files
    #[command(after_help = "\
Examples:
  datedit convert varexp.dat varexp.xlsx
  datedit convert plant.xlsx EVENT.DAT --sheet EVENT
  datedit convert COMM.DAT comm.csv")]
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Worksheet to read (default: first)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Search every DAT/CSV file under a folder
    Search {
        folder: PathBuf,
        text: String,

        /// Stop after N hits
        #[arg(long)]
        max_hits: Option<usize>,

        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  datedit-engine ", env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("DATEDIT_LOG", "warn")).init();

    let cli = Cli::parse();
    let settings = Settings::load();

    let result = match cli.command {
        Commands::Show { file, predicates, any, sort, desc, columns, limit, json, tsv } => {
            let query = view::ShowQuery { predicates, any, sort, desc, columns, limit };
            let format = if json {
                view::ShowFormat::Json
            } else if tsv {
                view::ShowFormat::Tsv
            } else {
                view::ShowFormat::Text
            };
            view::cmd_show(&file, &query, format, &settings)
        }
        Commands::NextTag { file } => view::cmd_next_tag(&file),
        Commands::Fill { file, column, source, rows, increment, output } => {
            edit::cmd_fill(&file, &column, source, &rows, increment, output, &settings)
        }
        Commands::Replace { file, find, replacement, column, rows, ignore_case, dry_run, output } => {
            let request = edit::ReplaceRequest {
                find,
                replacement,
                column,
                rows,
                ignore_case: ignore_case || settings.case_insensitive,
                dry_run,
            };
            edit::cmd_replace(&file, request, output, &settings)
        }
        Commands::DuplicateBranch { file, from, to, find, replace, output } => {
            edit::cmd_duplicate_branch(&file, &from, &to, find, replace, output, &settings)
        }
        Commands::CreateVariable { file, class, name, path, fields, output } => {
            edit::cmd_create_variable(&file, &class, &name, path.as_deref(), &fields, output, &settings)
        }
        Commands::CreateRecord { file, like, fields, output } => {
            edit::cmd_create_record(&file, like.as_deref(), &fields, output, &settings)
        }
        Commands::Paste { file, row, column, input, output } => {
            edit::cmd_paste(&file, row, &column, input, output, &settings)
        }
        Commands::DeleteRows { file, rows, output } => edit::cmd_delete_rows(&file, &rows, output, &settings),
        Commands::Convert { input, output, sheet } => view::cmd_convert(&input, &output, sheet.as_deref(), &settings),
        Commands::Search { folder, text, max_hits, json } => {
            view::cmd_search(folder, text, max_hits, json, &settings)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_FILE_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::EmptyFile(_) => Some("varexp files need at least their header row".to_string()),
            IoError::Spreadsheet { .. } => Some("supported workbooks: .xlsx .xlsm .xls .ods".to_string()),
            _ => None,
        };
        Self { code: file_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<EditError> for CliError {
    fn from(err: EditError) -> Self {
        let hint = match &err {
            EditError::NoPathColumns => Some("branch columns are n1..n11 (also 'Chemin n1', N1, 'Level 1')".to_string()),
            EditError::InvalidName(_) => Some("names use letters, digits and '_' only".to_string()),
            EditError::ClipboardEmptyOrMalformed => Some("expected tab-separated lines".to_string()),
            _ => None,
        };
        Self { code: edit_exit_code(&err), message: err.to_string(), hint }
    }
}
