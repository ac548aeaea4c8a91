//! Smoke tests to verify command wiring
//!
//! None of these reach a database: clap handles `--help` and argument
//! errors before any connection is attempted.

use assert_cmd::Command;
use predicates::prelude::*;

fn quizctl() -> Command {
    Command::cargo_bin("quizctl").unwrap()
}

#[test]
fn test_top_level_help_lists_commands() {
    quizctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("--timeout-secs"));
}

#[test]
fn test_create_help() {
    quizctl()
        .arg("create")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TEXT:BOOL"));
}

#[test]
fn test_update_help() {
    quizctl()
        .arg("update")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question id"));
}

#[test]
fn test_search_help() {
    quizctl()
        .arg("search")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--by-quiz"));
}

#[test]
fn test_create_rejects_malformed_response() {
    quizctl()
        .args(["create", "--content", "Q", "--quiz-id", "1", "--response", "Paris"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TEXT:true"));
}

#[test]
fn test_delete_rejects_non_positive_id() {
    quizctl()
        .args(["delete", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));
}

#[test]
fn test_missing_explicit_config_fails() {
    quizctl()
        .args(["--config", "/nonexistent/quizctl/typo.toml", "ping"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config not found"));
}
