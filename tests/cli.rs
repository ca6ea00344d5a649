//! End-to-end tests for the gitsw binary.
//!
//! Every run points `--config` and `--ssh-dir` into a temp directory so the
//! real user setup is never read or written.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn gitsw(temp: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gitsw"));
    cmd.current_dir(temp.path())
        .env("NO_COLOR", "1")
        .env_remove("GITSW_CONFIG")
        .env_remove("GITSW_SSH_DIR")
        .arg("--config")
        .arg(temp.path().join("config.json"))
        .arg("--ssh-dir")
        .arg(temp.path().join("ssh"));
    cmd
}

fn write_config(temp: &TempDir) {
    let config = r#"{
  "accounts": {
    "alice": {
      "name": "Alice",
      "email": "alice@example.com",
      "sshKey": "id_alice",
      "generatedKey": false
    }
  },
  "currentAccount": "alice"
}"#;
    fs::write(temp.path().join("config.json"), config).unwrap();
}

#[test]
fn test_list_without_accounts() {
    let temp = TempDir::new().unwrap();
    gitsw(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No accounts found."));
}

#[test]
fn test_list_marks_active_account() {
    let temp = TempDir::new().unwrap();
    write_config(&temp);
    gitsw(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("● alice"))
        .stdout(predicate::str::contains("<alice@example.com>"));
}

#[test]
fn test_remove_unknown_account_fails() {
    let temp = TempDir::new().unwrap();
    write_config(&temp);
    gitsw(&temp)
        .args(["remove", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no account named 'ghost'"));

    let saved = fs::read_to_string(temp.path().join("config.json")).unwrap();
    assert!(saved.contains("alice"));
}

#[test]
fn test_push_needs_an_account() {
    let temp = TempDir::new().unwrap();
    gitsw(&temp)
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active account"));
}

#[test]
fn test_git_without_arguments() {
    let temp = TempDir::new().unwrap();
    gitsw(&temp)
        .arg("git")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No git command provided"));
}
