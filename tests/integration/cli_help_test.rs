#[path = "../common/mod.rs"]
mod common;

use assert_cmd::Command as AssertCommand;
use common::{page_rotations, sample_pdf};
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn binary() -> AssertCommand {
    AssertCommand::new(assert_cmd::cargo::cargo_bin!("pdf-customizer"))
}

#[test]
fn test_top_level_help_lists_commands() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("pdf-customizer"))
        .arg("--help")
        .output()
        .expect("should run successfully");

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("COMMANDS"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("transform"));
}

#[test]
fn test_serve_help_documents_overrides() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("pdf-customizer"))
        .arg("serve")
        .arg("--help")
        .output()
        .expect("should run successfully");

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    for flag in ["--config", "--bind", "--port", "--storage-dir", "--database-url"] {
        assert!(stdout.contains(flag), "missing {}", flag);
    }
}

#[test]
fn test_version_flag() {
    binary()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(pdf_customizer::VERSION));
}

#[test]
fn test_transform_rejects_zero_copies() {
    binary()
        .args(["transform", "input.pdf", "--copies", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--copies"));
}

#[test]
fn test_transform_writes_default_output() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("report.pdf"), sample_pdf(2)).unwrap();

    binary()
        .current_dir(dir.path())
        .env("PDF_CUSTOMIZER_CONSOLE_OUTPUT", "none")
        .args(["transform", "report.pdf", "--orientation", "landscape", "--copies", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("customized_report.pdf"));

    let written = std::fs::read(dir.path().join("customized_report.pdf")).unwrap();
    assert_eq!(page_rotations(&written), vec![90; 4]);
}

#[test]
fn test_transform_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    binary()
        .current_dir(dir.path())
        .env("PDF_CUSTOMIZER_CONSOLE_OUTPUT", "none")
        .args(["transform", "absent.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.pdf"));
}
