//! Integration tests for basic CLI behavior.
//!
//! Everything here runs offline: flags, subcommand help, argument validation,
//! and failures that happen before any request is sent.

#![allow(deprecated)] // cargo_bin deprecation: replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `anistream` binary.
fn anistream() -> Command {
    Command::cargo_bin("anistream").expect("binary 'anistream' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    anistream()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: anistream"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("details"))
        .stdout(predicate::str::contains("streams"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn version_flag_shows_semver() {
    anistream()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^anistream \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    anistream()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: anistream"));
}

#[test]
fn invalid_subcommand_fails() {
    anistream()
        .arg("play")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn search_help() {
    anistream()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Search the source site"))
        .stdout(predicate::str::contains("<TITLES>"));
}

#[test]
fn details_help() {
    anistream()
        .args(["details", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("details page"))
        .stdout(predicate::str::contains("<ID>"));
}

#[test]
fn streams_help() {
    anistream()
        .args(["streams", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("validated streams"))
        .stdout(predicate::str::contains("<ID>"))
        .stdout(predicate::str::contains("<EPISODE>"));
}

#[test]
fn resolve_help() {
    anistream()
        .args(["resolve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve an episode"))
        .stdout(predicate::str::contains("<TITLE>"))
        .stdout(predicate::str::contains("<EPISODE>"))
        .stdout(predicate::str::contains("--episodes"));
}

// ─── Argument validation ─────────────────────────────────────────────────────

#[test]
fn search_without_title_fails() {
    anistream()
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TITLES>"));
}

#[test]
fn resolve_missing_episode_fails() {
    anistream()
        .args(["resolve", "Naruto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<EPISODE>"));
}

#[test]
fn non_numeric_episode_fails() {
    anistream()
        .args(["streams", "naruto", "first"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn episode_zero_is_rejected_before_fetching() {
    anistream()
        .args(["--config", "/nonexistent/anistream.toml", "streams", "naruto", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("episode numbers start at 1"));
}

#[test]
fn invalid_config_file_fails() {
    let path = std::env::temp_dir().join(format!("anistream-cli-{}.toml", std::process::id()));
    std::fs::write(&path, "relay = 3").unwrap();

    anistream()
        .args(["--config", path.to_str().unwrap(), "streams", "naruto", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid TOML"));

    std::fs::remove_file(&path).unwrap();
}
