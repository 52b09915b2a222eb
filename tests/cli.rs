//! Driver binary tests.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_script(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create script");
    file.write_all(contents.as_bytes()).expect("write script");
    path.to_str().unwrap().to_string()
}

#[test]
fn test_help() {
    Command::cargo_bin("dosato")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--debug"));
}

#[test]
fn test_version() {
    Command::cargo_bin("dosato")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dosato"));
}

#[test]
fn test_missing_file_exits_one() {
    Command::cargo_bin("dosato")
        .unwrap()
        .arg("/definitely/not/here.to")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not open file"));
}

#[test]
fn test_runs_script() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "hello.to", r#"DO SAYLN("hello from dosato");"#);
    Command::cargo_bin("dosato")
        .unwrap()
        .arg(path)
        .assert()
        .success()
        .stdout("hello from dosato\n");
}

#[test]
fn test_empty_file_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "empty.to", "");
    Command::cargo_bin("dosato")
        .unwrap()
        .arg(path)
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_end_sets_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "end.to", "DO END(7);");
    Command::cargo_bin("dosato")
        .unwrap()
        .arg(path)
        .assert()
        .code(7);
}

#[test]
fn test_parse_error_reports_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "bad.to", "DO SAY(1);\nBAD();");
    Command::cargo_bin("dosato")
        .unwrap()
        .arg(path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_runtime_error_reports_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "boom.to", "MAKE INT x = 1 / 0;");
    Command::cargo_bin("dosato")
        .unwrap()
        .arg(path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Math domain error"));
}

#[test]
fn test_debug_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "dump.to", "DO SAY(42);");
    Command::cargo_bin("dosato")
        .unwrap()
        .args([path.as_str(), "--debug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TOKENS"))
        .stdout(predicate::str::contains("FunctionCall"))
        .stdout(predicate::str::contains("RUNNING PROGRAM"))
        .stdout(predicate::str::contains("Finished with exit code 0"));
}
