//! Binary-level tests for fatal startup errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn missing_config_exits_nonzero_before_any_withdrawal_logic() {
    Command::cargo_bin("dripfeed")
        .unwrap()
        .arg("--config")
        .arg("/nonexistent/config.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn unreadable_targets_file_exits_nonzero() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config
        .write_all(b"[logging]\nlevel = \"error\"\n")
        .unwrap();

    Command::cargo_bin("dripfeed")
        .unwrap()
        .arg("--config")
        .arg(config.path())
        .arg("--targets")
        .arg("/nonexistent/addresses.csv")
        .assert()
        .failure();
}

#[test]
fn empty_targets_file_exits_nonzero() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config
        .write_all(b"[logging]\nlevel = \"error\"\n")
        .unwrap();

    let mut targets = tempfile::NamedTempFile::new().unwrap();
    targets.write_all(b"address,memo,id,remark\n").unwrap();

    Command::cargo_bin("dripfeed")
        .unwrap()
        .arg("--config")
        .arg(config.path())
        .arg("--targets")
        .arg(targets.path())
        .assert()
        .failure();
}
