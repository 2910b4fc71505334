//! Integration tests for the CLI: apply, status, verify.

mod common;

use common::invoice_fixture;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Helper to create a test project with a patchable component
fn setup_test_project() -> TempDir {
    let dir = TempDir::new().unwrap();

    fs::write(
        dir.path().join("package.json"),
        r#"{
  "name": "rechnung-app",
  "version": "0.1.0",
  "private": true
}
"#,
    )
    .unwrap();

    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/App.js"), invoice_fixture()).unwrap();

    dir
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_sticky-patcher"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_apply_help() {
    let output = run_cli(&["apply", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Apply the sticky-header transformation"));
}

#[test]
fn test_apply_transforms_target() {
    let project = setup_test_project();
    let target = project.path().join("src/App.js");

    let output = run_cli(&["apply", "--file", target.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "apply failed: {stdout}");
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("8 applied"));

    let patched = fs::read_to_string(&target).unwrap();
    assert!(patched.contains("data-section=\"gesamtbetraege\""));
    assert!(patched.contains("const [activeSection, setActiveSection] = useState('');"));
}

#[test]
fn test_apply_is_idempotent() {
    let project = setup_test_project();
    let target = project.path().join("src/App.js");

    let output1 = run_cli(&["apply", "--file", target.to_str().unwrap()]);
    assert!(output1.status.success());
    let after_first = fs::read_to_string(&target).unwrap();

    let output2 = run_cli(&["apply", "--file", target.to_str().unwrap()]);
    assert!(output2.status.success());
    let stdout = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout.contains("8 already applied"));

    assert_eq!(fs::read_to_string(&target).unwrap(), after_first);
}

#[test]
fn test_dry_run_leaves_target_untouched() {
    let project = setup_test_project();
    let target = project.path().join("src/App.js");
    let before = fs::read_to_string(&target).unwrap();

    let output = run_cli(&["apply", "--dry-run", "--file", target.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("Would apply"));

    assert_eq!(fs::read_to_string(&target).unwrap(), before);
}

#[test]
fn test_verify_fails_before_apply_and_passes_after() {
    let project = setup_test_project();
    let target = project.path().join("src/App.js");

    let before = run_cli(&["verify", "--file", target.to_str().unwrap()]);
    assert!(!before.status.success());

    let apply = run_cli(&["apply", "--file", target.to_str().unwrap()]);
    assert!(apply.status.success());

    let after = run_cli(&["verify", "--file", target.to_str().unwrap()]);
    assert!(after.status.success());
    let stdout = String::from_utf8_lossy(&after.stdout);
    assert!(stdout.contains("8 verified"));
}

#[test]
fn test_status_json_reports_unmatched_heading() {
    let project = setup_test_project();
    let target = project.path().join("src/App.js");

    // Break one heading so its rewrite cannot match
    let broken = fs::read_to_string(&target)
        .unwrap()
        .replace(">Gesamtbeträge<", ">Gesamtbetrag<");
    fs::write(&target, broken).unwrap();

    let output = run_cli(&["status", "--json", "--file", target.to_str().unwrap()]);
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status --json emits valid JSON");
    let rules = report["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 8);

    let totals = rules
        .iter()
        .find(|r| r["id"] == "section-gesamtbetraege")
        .unwrap();
    assert_eq!(totals["status"], "unmatched");
    assert!(totals["detail"]
        .as_str()
        .unwrap()
        .contains("Gesamtbetrag"));

    let steller = rules
        .iter()
        .find(|r| r["id"] == "section-rechnungssteller")
        .unwrap();
    assert_eq!(steller["status"], "pending");
}

#[test]
fn test_apply_exits_nonzero_on_partial_match() {
    let project = setup_test_project();
    let target = project.path().join("src/App.js");

    let broken = fs::read_to_string(&target)
        .unwrap()
        .replace(">Gesamtbeträge<", ">Gesamtbetrag<");
    fs::write(&target, broken).unwrap();

    let output = run_cli(&["apply", "--file", target.to_str().unwrap()]);
    assert!(!output.status.success());

    // The other sections were still transformed (partial success)
    let patched = fs::read_to_string(&target).unwrap();
    assert!(patched.contains("data-section=\"rechnungssteller\""));
    assert!(!patched.contains("data-section=\"gesamtbetraege\""));
}
