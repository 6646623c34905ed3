//! End-to-end tests for the pvlt binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn label_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn translate_defaults_to_pds3() {
    let file = label_file("a = 1\nb = two\nEND\n");
    Command::cargo_bin("pvlt")
        .unwrap()
        .arg("translate")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("A = 1\n").and(predicate::str::contains("B = two\n")));
}

#[test]
fn translate_between_dialects() {
    let file = label_file("a = 1;\nitems = (x, y);\nEND;");
    Command::cargo_bin("pvlt")
        .unwrap()
        .args(["translate", "--format", "isis"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("a     = 1\n")
                .and(predicate::str::contains("items = (x, y)\n"))
                .and(predicate::str::contains("End\n")),
        );
}

#[test]
fn translate_emits_json() {
    let file = label_file("a = 1\nq = 5 <m>\nEND\n");
    Command::cargo_bin("pvlt")
        .unwrap()
        .args(["translate", "-f", "json"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"a\": 1")
                .and(predicate::str::contains("\"units\": \"m\"")),
        );
}

#[test]
fn translate_writes_output_file() {
    let file = label_file("a = 1\nEND\n");
    let out = tempfile::NamedTempFile::new().unwrap();
    Command::cargo_bin("pvlt")
        .unwrap()
        .args(["translate", "-f", "pvl", "-o"])
        .arg(out.path())
        .arg(file.path())
        .assert()
        .success();
    let written = std::fs::read_to_string(out.path()).unwrap();
    assert_eq!(written, "a = 1;\nEND;\n");
}

#[test]
fn translate_fails_on_missing_file() {
    Command::cargo_bin("pvlt")
        .unwrap()
        .args(["translate", "/no/such/label.lbl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn validate_reports_per_dialect_verdicts() {
    // `#` comments load under ISIS but not under strict PVL.
    let file = label_file("# note\nK = V\nEND\n");
    Command::cargo_bin("pvlt")
        .unwrap()
        .arg("validate")
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("does NOT load")
                .and(predicate::str::contains("Loads"))
                .and(predicate::str::contains("PDS3"))
                .and(predicate::str::contains("ISIS")),
        );
}

#[test]
fn validate_verbose_includes_error_messages() {
    let file = label_file("K =\nEND\n");
    Command::cargo_bin("pvlt")
        .unwrap()
        .args(["validate", "-v"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("load:"));
}

#[test]
fn validate_handles_multiple_files() {
    let good = label_file("A = 1\nEND\n");
    let bad = label_file("A =\nEND\n");
    Command::cargo_bin("pvlt")
        .unwrap()
        .arg("validate")
        .arg(good.path())
        .arg(bad.path())
        .assert()
        .success();
}
