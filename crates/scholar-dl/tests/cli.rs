//! Integration tests for the scholar-dl command line.
//!
//! None of these reach Google Scholar: they cover argument handling and the paths that end
//! before the first search.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

// Helper function to create a clean command instance
fn scholar_dl() -> Command { Command::cargo_bin("scholar-dl").unwrap() }

#[test]
fn test_no_arguments_prints_help() {
  scholar_dl()
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"))
    .stdout(predicate::str::contains("--from-file"))
    .stdout(predicate::str::contains("--bib-output"));
}

#[test]
fn test_search_conflicts_with_from_file() {
  scholar_dl()
    .arg("--search")
    .arg("deep learning")
    .arg("--from-file")
    .arg("papers.txt")
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_input_file() {
  let dir = tempdir().unwrap();
  let missing = dir.path().join("missing.txt");

  scholar_dl()
    .arg("--from-file")
    .arg(&missing)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_empty_input_file() -> anyhow::Result<()> {
  let dir = tempdir()?;
  let list = dir.path().join("papers.txt");
  std::fs::write(&list, "\n   \n")?;

  scholar_dl()
    .arg("--from-file")
    .arg(&list)
    .assert()
    .success()
    .stdout(predicate::str::contains("No queries found"));
  Ok(())
}

#[test]
fn test_invalid_base_url() {
  scholar_dl()
    .arg("--search")
    .arg("deep learning")
    .arg("--base-url")
    .arg("not a url")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("relative URL without a base"));
}

#[test]
fn test_unreachable_search_fails() {
  scholar_dl()
    .arg("--search")
    .arg("deep learning")
    .arg("--base-url")
    .arg("http://127.0.0.1:9")
    .arg("--timeout")
    .arg("3")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("error sending request"));
}
