use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn setup_test_directory() -> tempfile::TempDir {
    let dir = tempdir().unwrap();

    // Top-level droppings next to real sources
    fs::write(dir.path().join("foo.pyc"), "compiled").unwrap();
    fs::write(dir.path().join("foo.py"), "print('hi')\r\n").unwrap();
    fs::write(dir.path().join("bar~"), "backup").unwrap();
    fs::write(dir.path().join("_vf.so"), "shared object").unwrap();

    // Integrator scratch output under tests/
    fs::create_dir_all(dir.path().join("tests")).unwrap();
    fs::write(dir.path().join("tests/dop853_1.tmp"), "scratch").unwrap();
    fs::write(dir.path().join("tests/keep.txt"), "keep\r\n").unwrap();

    dir
}

#[test]
fn test_clean_removes_artifacts() {
    let dir = setup_test_directory();

    let mut cmd = Command::cargo_bin("tidyup").unwrap();
    let assert = cmd.arg("clean").arg("-C").arg(dir.path()).assert();

    assert
        .success()
        .stdout(predicate::str::contains("Removed 3 file(s)"));

    assert!(!dir.path().join("foo.pyc").exists());
    assert!(!dir.path().join("bar~").exists());
    assert!(!dir.path().join("_vf.so").exists());
    assert!(dir.path().join("foo.py").exists());
    assert!(dir.path().join("tests/dop853_1.tmp").exists());
}

#[test]
fn test_clean_twice_succeeds() {
    let dir = setup_test_directory();

    Command::cargo_bin("tidyup")
        .unwrap()
        .args(["clean", "-C"])
        .arg(dir.path())
        .assert()
        .success();

    Command::cargo_bin("tidyup")
        .unwrap()
        .args(["clean", "-C"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean."));
}

#[test]
fn test_dry_run_flag() {
    let dir = setup_test_directory();

    let mut cmd = Command::cargo_bin("tidyup").unwrap();
    let assert = cmd
        .arg("--dry-run")
        .arg("-C")
        .arg(dir.path())
        .arg("clean")
        .assert();

    assert
        .success()
        .stdout(predicate::str::contains("Would remove: foo.pyc"))
        .stdout(predicate::str::contains("Dry run mode"));

    // Verify that our artifacts still exist
    assert!(dir.path().join("foo.pyc").exists());
    assert!(dir.path().join("bar~").exists());
    assert!(dir.path().join("_vf.so").exists());
}

#[test]
fn test_cleanup_clears_tests_directory() {
    let dir = setup_test_directory();

    let mut cmd = Command::cargo_bin("tidyup").unwrap();
    cmd.arg("cleanup").arg("-C").arg(dir.path()).assert().success();

    assert!(!dir.path().join("tests/dop853_1.tmp").exists());
    assert!(dir.path().join("tests/keep.txt").exists());
    assert!(!dir.path().join("foo.pyc").exists());
    // cleanup does not touch top-level shared objects
    assert!(dir.path().join("_vf.so").exists());
}

#[test]
fn test_cleanup_without_tests_directory() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tidyup")
        .unwrap()
        .arg("cleanup")
        .arg("-C")
        .arg(dir.path())
        .assert()
        .success();
}

#[test]
fn test_unixify_converts_sources() {
    let dir = setup_test_directory();

    let mut cmd = Command::cargo_bin("tidyup").unwrap();
    let assert = cmd.arg("unixify").arg("-C").arg(dir.path()).assert();

    assert
        .success()
        .stdout(predicate::str::contains("to LF line endings"));

    assert_eq!(fs::read(dir.path().join("foo.py")).unwrap(), b"print('hi')\n");
    assert_eq!(fs::read(dir.path().join("tests/keep.txt")).unwrap(), b"keep\n");
}

#[test]
fn test_unixify_failing_converter_still_exits_zero() {
    let dir = setup_test_directory();

    let mut cmd = Command::cargo_bin("tidyup").unwrap();
    let assert = cmd
        .arg("unixify")
        .arg("-C")
        .arg(dir.path())
        .arg("--converter")
        .arg("tidyup-no-such-converter")
        .assert();

    assert
        .success()
        .stderr(predicate::str::contains("could not convert"))
        .stderr(predicate::str::contains("tidyup-no-such-converter"));

    // Nothing was rewritten
    assert_eq!(
        fs::read(dir.path().join("foo.py")).unwrap(),
        b"print('hi')\r\n"
    );
}

#[test]
fn test_verbose_flag_logs_actions() {
    let dir = setup_test_directory();

    let mut cmd = Command::cargo_bin("tidyup").unwrap();
    let assert = cmd
        .env_remove("RUST_LOG")
        .arg("clean")
        .arg("-vv")
        .arg("-C")
        .arg(dir.path())
        .assert();

    assert
        .success()
        .stderr(predicate::str::contains("Removed"))
        .stdout(predicate::str::contains("Removed: foo.pyc"));
}

#[test]
fn test_quiet_flag_suppresses_summary() {
    let dir = setup_test_directory();

    Command::cargo_bin("tidyup")
        .unwrap()
        .arg("clean")
        .arg("--quiet")
        .arg("-C")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tidyup")
        .unwrap()
        .arg("clean")
        .arg("-C")
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn test_unknown_operation_is_rejected() {
    Command::cargo_bin("tidyup")
        .unwrap()
        .arg("distclean")
        .assert()
        .failure();
}

#[test]
fn test_cleanup_with_tests_file_still_exits_zero() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tests"), "not a directory").unwrap();
    fs::write(dir.path().join("a.pyc"), "bytecode").unwrap();
    fs::write(dir.path().join(".DS_Store"), "finder").unwrap();

    let mut cmd = Command::cargo_bin("tidyup").unwrap();
    let assert = cmd.arg("cleanup").arg("-C").arg(dir.path()).assert();

    assert
        .success()
        .stderr(predicate::str::contains("could not read directory"));

    assert!(!dir.path().join("a.pyc").exists());
    assert!(!dir.path().join(".DS_Store").exists());
}
