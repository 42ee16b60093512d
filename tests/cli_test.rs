//! CLI driver tests.
//!
//! The binary reads a markdown file and writes both outputs, or writes
//! nothing at all when the conversion fails.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("manweave").unwrap()
}

#[test]
fn test_writes_both_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frob.md");
    fs::write(&input, "# NAME\n\nfrob - frobnicate things\n").unwrap();

    cmd()
        .arg(&input)
        .arg("--date")
        .arg("2024-03-01")
        .assert()
        .success();

    let html = fs::read_to_string(dir.path().join("frob.html")).unwrap();
    let troff = fs::read_to_string(dir.path().join("frob.1")).unwrap();
    assert!(html.contains("<h1>NAME</h1>"));
    assert!(troff.contains(".SH \"NAME\""));
    assert!(troff.contains("2024-03-01"));
}

#[test]
fn test_section_picks_output_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frob.md");
    fs::write(&input, "# NAME\n").unwrap();

    cmd()
        .arg(&input)
        .args(["--section", "5", "--quiet"])
        .assert()
        .success();

    assert!(dir.path().join("frob.5").exists());
    assert!(!dir.path().join("frob.1").exists());
}

#[test]
fn test_program_name_defaults_to_input_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("widget.md");
    fs::write(&input, "# NAME\n").unwrap();

    cmd().arg(&input).arg("--quiet").assert().success();

    let troff = fs::read_to_string(dir.path().join("widget.1")).unwrap();
    assert!(troff.contains(".TH \"WIDGET\" \"1\""));
}

#[test]
fn test_fatal_conversion_writes_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.md");
    // A zero-started ordered list with a bare item has no term source.
    fs::write(&input, "0. \n").unwrap();

    cmd()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));

    assert!(!dir.path().join("bad.html").exists());
    assert!(!dir.path().join("bad.1").exists());
}

#[test]
fn test_missing_input_fails() {
    cmd()
        .arg("no-such-file.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
