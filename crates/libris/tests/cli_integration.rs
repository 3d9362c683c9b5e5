//! CLI integration tests for the Libris command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Invalid inputs are rejected with appropriate messages
//! - Session commands work offline against an isolated config directory
//!
//! Every test points `LIBRIS_CONFIG_DIR` at a temp dir so the real session
//! and logs are never touched.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the libris binary, isolated in `dir`.
fn libris(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("libris").unwrap();
    cmd.env("LIBRIS_CONFIG_DIR", dir.path()).env_remove("LIBRIS_ENV");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Libris"))
        .stdout(predicate::str::contains("borrow"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("libris"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("books"))
        .stdout(predicate::str::contains("borrows"))
        .stdout(predicate::str::contains("admin"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Flag Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_verbose_flag_accepted() {
    let dir = TempDir::new().unwrap();
    libris(&dir).args(["--verbose", "--help"]).assert().success();
}

#[test]
fn test_json_flag_accepted() {
    let dir = TempDir::new().unwrap();
    libris(&dir).args(["--json", "--help"]).assert().success();
}

#[test]
fn test_env_flag_accepts_known_environments() {
    let dir = TempDir::new().unwrap();
    libris(&dir).args(["--env", "prod", "--help"]).assert().success();
    libris(&dir)
        .args(["--env", "development", "--help"])
        .assert()
        .success();
}

#[test]
fn test_env_flag_rejects_unknown_environment() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["--env", "staging", "auth", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommand Help Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_auth_help() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_books_help() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["books", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("lookup"));
}

#[test]
fn test_borrows_help() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["borrows", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scan-return"));
}

#[test]
fn test_admin_help() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["admin", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("overdue"))
        .stdout(predicate::str::contains("batch-remind"))
        .stdout(predicate::str::contains("set-stock"));
}

#[test]
fn test_admin_list_paging_flags() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["admin", "users", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--all"))
        .stdout(predicate::str::contains("--limit"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Invalid Input Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_flag_fails() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_isbn_rejected_before_network() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["books", "lookup", "12-34"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid ISBN"));
}

#[test]
fn test_invalid_borrow_filter_rejected() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["borrows", "mine", "--status", "overdue"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Session Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_status_when_logged_out() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"logged_in\": false"))
        .stdout(predicate::str::contains("\"environment\": \"dev\""));
}

#[test]
fn test_verbose_status_shows_directories() {
    let dir = TempDir::new().unwrap();
    let session_dir = dir.path().join("session");
    libris(&dir)
        .args(["--verbose", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Timeout"))
        .stdout(predicate::str::contains(session_dir.display().to_string()));
}

#[test]
fn test_status_hides_directories_by_default() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session dir").not());
}

#[test]
fn test_logout_is_idempotent() {
    let dir = TempDir::new().unwrap();
    libris(&dir).args(["auth", "logout"]).assert().success();
    libris(&dir).args(["auth", "logout"]).assert().success();
}

#[test]
fn test_empty_login_code_is_declined() {
    let dir = TempDir::new().unwrap();
    libris(&dir)
        .args(["auth", "login"])
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("declined"));

    assert!(!dir.path().join("session").join("token").exists());
}
