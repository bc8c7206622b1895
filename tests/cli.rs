mod common;

use std::{fs, path::Path, process::Output};

use assert_cmd::cargo::cargo_bin_cmd;
use common::fixtures_root;
use serde_json::Value;

fn run(workdir: &Path, args: &[&str]) -> Output {
    run_with_env(workdir, &[], args)
}

fn run_with_env(workdir: &Path, vars: &[(&str, &str)], args: &[&str]) -> Output {
    let mut cmd = cargo_bin_cmd!("tassist");
    cmd.current_dir(workdir)
        .env("CLICOLOR", "0")
        .env("NO_COLOR", "1")
        .env_remove("TASSIST_SEMICOLON_SEVERITY")
        .env_remove("TASSIST_MAX_SOURCE_BYTES")
        .env_remove("TASSIST_WORKERS")
        .env_remove("TASSIST_LOG")
        .envs(vars.iter().copied())
        .args(args);
    cmd.output().expect("failed to run command")
}

fn fixture(path: &str) -> String {
    fixtures_root().join(path).display().to_string()
}

#[test]
fn analyze_valid_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &[
        "analyze",
        "--config",
        &fixture("configs/est-majeur.json"),
        "--json",
        &fixture("java/EstMajeur.java"),
    ]);
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let result = &report[fixture("java/EstMajeur.java")];
    assert_eq!(result["is_valid"], true);
    assert_eq!(result["missing_methods"], Value::Array(vec![]));
}

#[test]
fn analyze_invalid_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &[
        "analyze",
        "-c",
        &fixture("configs/est-majeur.json"),
        &fixture("java/EstMajeur.java"),
        &fixture("java/VerifierAge.java"),
    ]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(valid)"));
    assert!(stdout.contains("(invalid)"));
    assert!(stdout.contains("Missing method `boolean estMajeur(int)`"));
}

#[test]
fn analyze_reports_unreadable_files() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &[
        "analyze",
        "-c",
        &fixture("configs/est-majeur.json"),
        "--json",
        "DoesNotExist.java",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["DoesNotExist.java"]["error"].is_string());
}

#[test]
fn bad_settings_are_reported_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_env(dir.path(), &[("TASSIST_WORKERS", "abc")], &[
        "analyze",
        "-c",
        &fixture("configs/est-majeur.json"),
        &fixture("java/EstMajeur.java"),
    ]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Ignoring TASSIST_WORKERS"), "{stderr}");
}

#[test]
fn check_config_accepts_exercises_and_assessments() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &[
        "check-config",
        &fixture("configs/est-majeur.json"),
        &fixture("configs/racine-carree.json"),
        &fixture("configs/tp1.json"),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("exercise `01-est-majeur`"));
    assert!(stdout.contains("assessment `tp1`, 2 exercise(s), 10.00 points"));
}

#[test]
fn check_config_rejects_bad_rules() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{ "id": "bad", "rules": { "allowedOperators": ["<>"] } }"#).unwrap();

    let output = run(dir.path(), &["check-config", &bad.display().to_string()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("is not a Java operator"));
}

#[test]
fn grade_writes_feedback_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    for (sub, file, source) in [
        ("configs", "01-est-majeur.json", "configs/est-majeur.json"),
        ("assessments", "tp1.json", "configs/tp1.json"),
    ] {
        fs::create_dir_all(store.join(sub)).unwrap();
        fs::copy(fixtures_root().join(source), store.join(sub).join(file)).unwrap();
    }
    let submissions = dir.path().join("submissions");
    fs::create_dir_all(submissions.join("alice")).unwrap();
    fs::copy(
        fixtures_root().join("java/EstMajeur.java"),
        submissions.join("alice/EstMajeur.java"),
    )
    .unwrap();
    let feedback = dir.path().join("feedback");

    let output = run(dir.path(), &[
        "grade",
        "--store",
        &store.display().to_string(),
        "--assessment",
        "tp1",
        "--submissions",
        &submissions.display().to_string(),
        "--policy",
        "all-or-nothing",
        "--feedback-dir",
        &feedback.display().to_string(),
        "--json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["student"], "alice");
    assert_eq!(reports[0]["grade"]["student_total"], 4.0);

    let text = fs::read_to_string(feedback.join("alice_feedback.md")).unwrap();
    assert!(text.starts_with("# TP 1"));
    assert!(text.contains("## 01-est-majeur: 4.00/4.00"));
    assert!(text.contains("## 02-racine-carree: 0.00/6.00, not submitted"));
}
