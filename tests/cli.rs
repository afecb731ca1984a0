use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ledgerdesk(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ledgerdesk").unwrap();
    cmd.env("LEDGERDESK_HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("journal"))
        .stdout(predicate::str::contains("reset-password"));
}

#[test]
fn status_when_logged_out() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:8000"))
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn logout_without_token() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[test]
fn logout_removes_stored_token() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("storage.json"),
        r#"{"current_entity": "e1", "token": "abc"}"#,
    )
    .unwrap();
    ledgerdesk(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    let stored = std::fs::read_to_string(home.path().join("storage.json")).unwrap();
    assert!(!stored.contains("\"token\""));
    assert!(stored.contains("e1"));
}

#[test]
fn config_base_uri_shows_in_status() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .args(["config", "--base-uri", "https://books.example.com/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved settings"));
    ledgerdesk(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Server:     https://books.example.com"));
}

#[test]
fn config_rejects_bad_uri() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .args(["config", "--base-uri", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Settings error"));
}

#[test]
fn journal_needs_login() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .arg("journal")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn tree_rejects_unknown_key_before_any_call() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .args(["tree", "--key", "ASSETS"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown master type"));
}

#[test]
fn tree_needs_entity() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("storage.json"), r#"{"token": "abc"}"#).unwrap();
    ledgerdesk(&home)
        .arg("tree")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No entity selected"));
}

#[test]
fn completions_generate() {
    let home = TempDir::new().unwrap();
    ledgerdesk(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ledgerdesk"));
}
