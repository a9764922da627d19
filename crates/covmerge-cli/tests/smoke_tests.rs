//! Smoke tests for the coverage_merger binary
//!
//! Exit codes, message text, and what ends up on disk.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn coverage_merger() -> Command {
    let mut cmd = Command::cargo_bin("coverage_merger").expect("coverage_merger binary should exist");
    cmd.env_remove("COVERAGE_MERGER_LOG");
    cmd
}

/// Report with one class per package, named `<package>.Main`
fn report(packages: &[(&str, &str)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\"?>\n<coverage version=\"6.5\" timestamp=\"1700000000\">\n  \
         <sources><source>/src</source></sources>\n  <packages>\n",
    );
    for (name, rate) in packages {
        xml.push_str(&format!(
            "    <package name=\"{name}\" line-rate=\"{rate}\" branch-rate=\"{rate}\" complexity=\"2\">\n      \
             <classes>\n        \
             <class name=\"{name}.Main\" filename=\"{name}/Main.java\" line-rate=\"{rate}\" branch-rate=\"{rate}\">\n          \
             <lines><line number=\"1\" hits=\"1\"/></lines>\n        \
             </class>\n      </classes>\n    </package>\n"
        ));
    }
    xml.push_str("  </packages>\n</coverage>\n");
    xml
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    coverage_merger()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    coverage_merger()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--ignore"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_no_args_is_not_enough() {
    coverage_merger()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("coverage_merger: not enough arguments"));
}

#[test]
fn test_single_path_is_not_enough() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5")]));

    coverage_merger()
        .arg(&primary)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not enough arguments"));
}

#[test]
fn test_only_flags_is_not_enough() {
    coverage_merger()
        .args(["--verbose", "--ignore=gen"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not enough arguments"));
}

#[test]
fn test_ignore_with_space_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("gen", "0.5")]));
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .args(["--ignore", "gen"])
        .arg(&primary)
        .arg(&target)
        .assert()
        .code(2);

    assert!(!target.exists());
}

#[test]
fn test_unknown_flag_is_usage_error() {
    coverage_merger()
        .args(["--frobnicate", "a.xml", "b.xml"])
        .assert()
        .code(2);
}

// ============================================================================
// Merge Tests
// ============================================================================

#[test]
fn test_primary_only_is_silent() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5"), ("dead", "0.0")]));
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .arg(&primary)
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let merged = read(&target);
    assert!(merged.starts_with("<?xml"));
    assert!(merged.contains(r#"<coverage version="6.5" timestamp="1700000000">"#));
    assert!(merged.contains("<source>/src</source>"));
    assert!(merged.contains(r#"<package name="app" complexity="2">"#));
    assert!(merged.contains(r#"name="app.Main""#));
    assert!(!merged.contains("dead"));
}

#[test]
fn test_increments_fill_gaps() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5")]));
    let first = write(&dir, "shard-1.xml", &report(&[("app", "0.9"), ("lib", "0.4")]));
    let second = write(&dir, "shard-2.xml", &report(&[("lib", "0.6"), ("util", "0.3")]));
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .args([&primary, &first, &second, &target])
        .assert()
        .success();

    let merged = read(&target);
    assert_eq!(merged.matches("<package ").count(), 3);
    // Primary app is kept over the better increment copy.
    assert!(merged.contains(r#"name="app.Main" filename="app/Main.java" line-rate="0.5""#));
    // lib comes from the second shard, which has the higher line rate.
    assert!(merged.contains(r#"name="lib.Main" filename="lib/Main.java" line-rate="0.6""#));
    assert!(merged.contains(r#"name="util""#));
}

#[test]
fn test_ignore_prefixes() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5"), ("generated", "0.9")]));
    let shard = write(&dir, "shard.xml", &report(&[("gen.api", "0.8"), ("vendor.x", "0.7")]));
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .args(["--ignore=gen", "--ignore=vendor"])
        .args([&primary, &shard, &target])
        .assert()
        .success();

    let merged = read(&target);
    assert!(merged.contains(r#"name="app""#));
    assert!(!merged.contains("generated"));
    assert!(!merged.contains("gen.api"));
    assert!(!merged.contains("vendor.x"));
}

#[test]
fn test_verbose_progress() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5")]));
    let shard = write(&dir, "shard.xml", &report(&[("lib", "0.4")]));
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .arg("--verbose")
        .args([&primary, &shard, &target])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Source file: {}", primary.display())))
        .stdout(predicate::str::contains(format!("Increment file: {}", shard.display())))
        .stdout(predicate::str::contains(format!("Target file: {}", target.display())))
        .stdout(predicate::str::contains("Documents parsed"))
        .stdout(predicate::str::contains("lib (from increment #1)"))
        .stdout(predicate::str::contains("Merged 2 packages"));
}

#[test]
fn test_flag_after_first_path_is_a_path() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5")]));
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .arg(&primary)
        .arg("--verbose")
        .arg(&target)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("--verbose"));

    assert!(!target.exists());
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_missing_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5")]));
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .arg(&primary)
        .arg(dir.path().join("absent.xml"))
        .arg(&target)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.xml"));

    assert!(!target.exists());
}

#[test]
fn test_malformed_increment_keeps_old_target() {
    let dir = TempDir::new().unwrap();
    let primary = write(&dir, "primary.xml", &report(&[("app", "0.5")]));
    let broken = write(&dir, "broken.xml", "<coverage><packages><package>");
    let target = write(&dir, "merged.xml", "old contents");

    coverage_merger()
        .args([&primary, &broken, &target])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken.xml"));

    assert_eq!(read(&target), "old contents");
}

#[test]
fn test_missing_rate_attribute_fails() {
    let dir = TempDir::new().unwrap();
    let primary = write(
        &dir,
        "primary.xml",
        r#"<coverage version="1" timestamp="0"><packages><package name="app" complexity="1"/></packages></coverage>"#,
    );
    let target = dir.path().join("merged.xml");

    coverage_merger()
        .arg(&primary)
        .arg(&target)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(!target.exists());
}
