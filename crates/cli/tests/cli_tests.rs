// Integration tests for the `datedit` binary.
// Run with: cargo test -p datedit-cli --test cli_tests -- --nocapture

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const VAREXP: &str = "\
Nom,Class,Tagname,n1,n2,n3,Description\r
PUMP_1,BIT,10,SITE,PUMP1,RUN,pompe 1 marche\r
PUMP_1_DEF,ALA,20,SITE,PUMP1,FAULT,pompe 1 defaut\r
VALVE_1,BIT,5,SITE,VALVE1,OPEN,vanne 1\r
";

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        Project { dir }
    }

    fn file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn datedit(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_datedit"));
        cmd.env("DATEDIT_CONFIG_DIR", self.dir.path().join("config"));
        cmd.env_remove("DATEDIT_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.datedit().args(args).output().expect("run datedit")
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn read_latin1(path: &Path) -> String {
    fs::read(path).unwrap().iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// show / next-tag
// ---------------------------------------------------------------------------

#[test]
fn show_filters_and_sorts() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["show", arg(&file), "--where", "Nom~pump", "--sort", "Tagname", "--desc", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["row"], 1);
    assert_eq!(rows[0]["cells"]["Tagname"], "20");
    assert_eq!(rows[1]["cells"]["Nom"], "PUMP_1");
}

#[test]
fn show_any_mode_is_union() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&[
        "show", arg(&file), "--where", "n3~run", "--where", "n3~open", "--any", "--columns", "Nom", "--tsv",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "PUMP_1\nVALVE_1\n");

    let output = p.run(&["show", arg(&file), "--where", "n3~run", "--where", "n3~open", "--tsv"]);
    assert_eq!(stdout(&output), "");
}

#[test]
fn show_unknown_column_is_usage_error() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["show", arg(&file), "--where", "Nope~x"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("error: unknown column"), "{}", err);
    assert!(err.contains("hint:"), "{}", err);
}

#[test]
fn next_tag_is_max_plus_one() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["next-tag", arg(&file)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "21");
}

#[test]
fn missing_file_exit_code() {
    let p = Project::new();
    let output = p.run(&["next-tag", arg(&p.path("varexp.dat"))]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("file not found"));
}

// ---------------------------------------------------------------------------
// edits
// ---------------------------------------------------------------------------

#[test]
fn fill_increment_writes_in_place() {
    let p = Project::new();
    let file = p.file(
        "varexp.dat",
        b"Nom,Tagname\r\nCapteur_7,1\r\nx,2\r\ny,3\r\n",
    );

    let output = p.run(&["fill", arg(&file), "--column", "Nom", "--source", "0", "--rows", "0-2", "--increment"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        read_latin1(&file),
        "Nom,Tagname\r\nCapteur_7,1\r\nCapteur_8,2\r\nCapteur_9,3\r\n"
    );
}

#[test]
fn fill_increment_on_text_is_rejected() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["fill", arg(&file), "--column", "n1", "--source", "0", "--rows", "1", "--increment"]);
    assert_eq!(output.status.code(), Some(11));
    assert_eq!(read_latin1(&file), VAREXP, "file must be untouched");
}

#[test]
fn replace_with_output_keeps_source() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());
    let out = p.path("out.dat");

    let output = p.run(&[
        "replace", arg(&file), "--find", "POMPE", "--with", "moteur", "--column", "Description",
        "--ignore-case", "-o", arg(&out),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("replaced 2 cells in 2 rows"));
    assert_eq!(read_latin1(&file), VAREXP);
    assert!(read_latin1(&out).contains("moteur 1 defaut"));
}

#[test]
fn replace_dry_run_lists_cells_and_writes_nothing() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&[
        "replace", arg(&file), "--find", "POMPE", "--with", "moteur", "--column", "Description",
        "--ignore-case", "--dry-run",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(lines, ["0\tDescription\tpompe 1 marche", "1\tDescription\tpompe 1 defaut"]);
    assert!(stderr(&output).contains("would replace 2 cells"));
    assert_eq!(read_latin1(&file), VAREXP);
}

#[test]
fn duplicate_branch_appends_with_new_tags() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&[
        "duplicate-branch", arg(&file), "--from", "SITE/PUMP1", "--to", "SITE/PUMP2",
        "--find", "pompe 1", "--replace", "pompe 2",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("copied 2 rows"));
    assert!(stdout(&output).contains("first tag 21"));

    let text = read_latin1(&file);
    assert!(text.contains("PUMP_1,BIT,21,SITE,PUMP2,RUN,pompe 2 marche\r\n"), "{}", text);
    assert!(text.contains("PUMP_1_DEF,ALA,22,SITE,PUMP2,FAULT,pompe 2 defaut\r\n"), "{}", text);
}

#[test]
fn duplicate_branch_without_match_fails() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["duplicate-branch", arg(&file), "--from", "NOPE", "--to", "X"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(read_latin1(&file), VAREXP);
}

#[test]
fn create_variable_from_template() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&[
        "create-variable", arg(&file), "--class", "bit", "--name", "PUMP_2", "--path", "SITE/PUMP2",
        "--set", "Description=pompe 2",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let show = p.run(&["show", arg(&file), "--where", "Nom~PUMP_2", "--json"]);
    let rows: serde_json::Value = serde_json::from_str(&stdout(&show)).unwrap();
    let cells = &rows[0]["cells"];
    assert_eq!(cells["Class"], "BIT");
    assert_eq!(cells["Tagname"], "21");
    assert_eq!(cells["n1"], "SITE");
    assert_eq!(cells["n2"], "PUMP2");
    assert_eq!(cells["n3"], "PUMP_2");
    assert_eq!(cells["Description"], "pompe 2");
}

#[test]
fn create_variable_rejects_bad_names_and_classes() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["create-variable", arg(&file), "--class", "BIT", "--name", "bad name"]);
    assert_eq!(output.status.code(), Some(14));

    let output = p.run(&["create-variable", arg(&file), "--class", "XYZ", "--name", "OK"]);
    assert_eq!(output.status.code(), Some(11));
    assert!(stderr(&output).contains("hint:  classes: CMD"));

    let output = p.run(&["create-variable", arg(&file), "--class", "BIT", "--name", "PUMP_1"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(read_latin1(&file), VAREXP);
}

#[test]
fn create_record_in_event_file() {
    let p = Project::new();
    let file = p.file("EVENT.DAT", b"1,EVT_1,alarme \xe9tage\r\n");

    let output = p.run(&["create-record", arg(&file), "--like", "EVT_1", "--set", "Nom=EVT_2"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let bytes = fs::read(&file).unwrap();
    let text = read_latin1(&file);
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("EVT_2"));
    // Latin-1 preserved on write
    assert!(bytes.windows(5).any(|w| w == b"\xe9tage"));
}

#[test]
fn create_record_refused_for_varexp() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["create-record", arg(&file)]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn paste_from_stdin() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let mut child = p
        .datedit()
        .args(["paste", arg(&file), "--row", "1", "--column", "n3"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"\"TRIP\"\tnew desc\textra\nSTOP\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let text = read_latin1(&file);
    assert!(text.contains("PUMP_1_DEF,ALA,20,SITE,PUMP1,TRIP,new desc\r\n"), "{}", text);
    assert!(text.contains("VALVE_1,BIT,5,SITE,VALVE1,STOP,vanne 1\r\n"), "{}", text);
}

#[test]
fn paste_empty_input_fails() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());
    let tsv = p.file("block.tsv", b"   \n");

    let output = p.run(&["paste", arg(&file), "--row", "0", "--column", "Nom", "--input", arg(&tsv)]);
    assert_eq!(output.status.code(), Some(15));
}

#[test]
fn delete_rows_and_bad_spec() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["delete-rows", arg(&file), "--rows", "0-3"]);
    assert_eq!(output.status.code(), Some(2));

    let output = p.run(&["delete-rows", arg(&file), "--rows", "2,0"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        read_latin1(&file),
        "Nom,Class,Tagname,n1,n2,n3,Description\r\nPUMP_1_DEF,ALA,20,SITE,PUMP1,FAULT,pompe 1 defaut\r\n"
    );
}

// ---------------------------------------------------------------------------
// convert / search
// ---------------------------------------------------------------------------

#[test]
fn convert_dat_to_csv_uses_configured_delimiter() {
    let p = Project::new();
    fs::write(p.path("config").join("settings.json"), r#"{ "csv.defaultDelimiter": "," }"#).unwrap();
    let file = p.file("COMM.DAT", b"NETWORK,1,ETH0\r\n");
    let csv = p.path("comm.csv");

    let output = p.run(&["convert", arg(&file), arg(&csv)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = fs::read_to_string(&csv).unwrap();
    assert!(text.lines().next().unwrap().starts_with("Type,Version,Réseau"), "{}", text);
}

#[test]
fn convert_roundtrip_through_xlsx() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());
    let xlsx = p.path("varexp.xlsx");
    let back = p.path("back_varexp.dat");

    assert!(p.run(&["convert", arg(&file), arg(&xlsx)]).status.success());
    let output = p.run(&["convert", arg(&xlsx), arg(&back)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(read_latin1(&back), VAREXP);
}

#[test]
fn search_lists_hits() {
    let p = Project::new();
    p.file("varexp.dat", VAREXP.as_bytes());
    fs::create_dir(p.path("sub")).unwrap();
    p.file("sub/EVENT.DAT", b"1,EVT_PUMP,pompe\r\n");
    p.file("notes.txt", b"pump\n");

    let output = p.run(&["search", arg(p.dir.path()), "pump", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let hits: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| !h["path"].as_str().unwrap().ends_with("notes.txt")));
    assert!(stderr(&output).contains("3 hits in 2 files"));

    let output = p.run(&["search", arg(p.dir.path()), "pump", "--max-hits", "1"]);
    assert_eq!(stdout(&output).lines().count(), 1);
}

#[test]
fn search_rejects_empty_text() {
    let p = Project::new();
    p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["search", arg(p.dir.path()), ""]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("search text must not be empty"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn session_remembers_last_file() {
    let p = Project::new();
    let file = p.file("varexp.dat", VAREXP.as_bytes());

    let output = p.run(&["delete-rows", arg(&file), "--rows", "0"]);
    assert!(output.status.success());

    let session: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(p.path("config").join("session.json")).unwrap()).unwrap();
    assert_eq!(session["current_file"], arg(&file));
}
