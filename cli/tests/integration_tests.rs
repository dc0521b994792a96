use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "usage_grammar_cli_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const DOC: &str = "Naval Fate.

Usage:
  naval ship new <name>...
  naval ship <name> move <x> <y> [--speed=<kn>]
  naval -h | --help
  naval --version

Options:
  -h --help     Show this screen.
  --version     Show version.
  --speed=<kn>  Speed in knots [default: 10].
";

fn write_doc(dir: &TempDir, doc: &str) -> PathBuf {
    let path = dir.join("usage.txt");
    fs::write(&path, doc).expect("failed to write usage doc");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_usage-grammar"))
        .args(args)
        .output()
        .expect("failed to run usage-grammar")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// match
// ---------------------------------------------------------------------------

#[test]
fn match_prints_bindings_as_json() {
    let dir = TempDir::new("match_json");
    let doc = write_doc(&dir, DOC);
    let output = run(&[
        "match",
        "--doc",
        doc.to_str().unwrap(),
        "--",
        "ship",
        "Guardian",
        "move",
        "1",
        "2",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["ship"], true);
    assert_eq!(json["move"], true);
    assert_eq!(json["<name>"], serde_json::json!(["Guardian"]));
    assert_eq!(json["--speed"], "10");
    assert_eq!(json["--help"], false);
}

#[test]
fn match_table_format() {
    let dir = TempDir::new("match_table");
    let doc = write_doc(&dir, "usage: prog [-v]...\n");
    let output = run(&[
        "match",
        "--doc",
        doc.to_str().unwrap(),
        "--format",
        "table",
        "--",
        "-vv",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "-v  2\n");
}

#[test]
fn match_failure_prints_usage_and_exits_nonzero() {
    let dir = TempDir::new("match_fail");
    let doc = write_doc(&dir, DOC);
    let output = run(&["match", "--doc", doc.to_str().unwrap(), "--", "ship"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("error: Usage:"), "{err}");
    assert!(err.contains("naval ship new <name>..."), "{err}");
}

#[test]
fn match_help_prints_document() {
    let dir = TempDir::new("match_help");
    let doc = write_doc(&dir, DOC);
    let output = run(&["match", "--doc", doc.to_str().unwrap(), "--", "--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Naval Fate."));
}

#[test]
fn match_no_help_binds_flag() {
    let dir = TempDir::new("match_no_help");
    let doc = write_doc(&dir, DOC);
    let output = run(&[
        "match",
        "--doc",
        doc.to_str().unwrap(),
        "--no-help",
        "--",
        "-h",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["--help"], true);
}

#[test]
fn match_version_text() {
    let dir = TempDir::new("match_version");
    let doc = write_doc(&dir, DOC);
    let output = run(&[
        "match",
        "--doc",
        doc.to_str().unwrap(),
        "--version-text",
        "Naval Fate 2.0",
        "--",
        "--version",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Naval Fate 2.0\n");
}

#[test]
fn match_reads_doc_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_usage-grammar"))
        .args(["match", "--doc", "-", "--format", "yaml", "--", "go", "left"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn usage-grammar");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"usage: prog go <direction>...\n")
        .expect("failed to write stdin");
    let output = child.wait_with_output().expect("failed to wait");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("go: true"), "{out}");
    assert!(out.contains("- left"), "{out}");
}

#[test]
fn match_missing_doc_file() {
    let output = run(&["match", "--doc", "/nonexistent/usage.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read"));
}

#[test]
fn match_language_error() {
    let dir = TempDir::new("match_language");
    let doc = write_doc(&dir, "no usage here\n");
    let output = run(&["match", "--doc", doc.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("\"usage:\" (case-insensitive) not found."));
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_lists_leaves() {
    let dir = TempDir::new("inspect");
    let doc = write_doc(&dir, DOC);
    let output = run(&["inspect", "--doc", doc.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let nodes = json.as_array().unwrap();
    let names = nodes
        .iter()
        .map(|node| node["name"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        ["ship", "new", "<name>", "move", "<x>", "<y>", "--speed", "--help", "--version"]
    );
    assert_eq!(nodes[2]["value_kind"], "items");
    assert_eq!(nodes[6]["kind"], "option");
}
