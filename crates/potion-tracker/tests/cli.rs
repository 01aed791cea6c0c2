use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn tracker() -> Command {
    let mut cmd = Command::cargo_bin("potion-tracker").expect("binary builds");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn validate_config_reports_settings() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("tracker.yaml");
    fs::write(&config, "session:\n  starting_hp: 9\n").expect("write config");

    tracker()
        .arg("--config")
        .arg(&config)
        .arg("validate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("starting HP 9"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("tracker.yaml");
    fs::write(&config, "session:\n  starting_hp: 0\n").expect("write config");

    tracker()
        .arg("--config")
        .arg(&config)
        .arg("validate-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("session.starting_hp"));
}

#[test]
fn piped_game_is_recorded_and_reported() {
    let dir = tempdir().expect("temp dir");
    let store = dir.path().join("stats.json");

    tracker()
        .arg("--store")
        .arg(&store)
        .arg("play")
        .write_stdin("first love\nconfirm\nmagic boost\nconfirm\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 1: 'First Love' with 2 energy -> 1 left"))
        .stdout(predicate::str::contains("Round 3 • Opponent energy: 4"));

    tracker()
        .arg("--store")
        .arg(&store)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall (2 plays):"))
        .stdout(predicate::str::contains("First Love: 50.0% (1 play)"))
        .stdout(predicate::str::contains("With 1 energy (1 round):"));

    tracker()
        .arg("--store")
        .arg(&store)
        .args(["stats", "--energy", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("First Love: 100.0% (1/1)"));
}

#[test]
fn clear_stats_needs_yes() {
    let dir = tempdir().expect("temp dir");
    let store = dir.path().join("stats.json");

    tracker()
        .arg("--store")
        .arg(&store)
        .write_stdin("cold wall\nconfirm\n")
        .assert()
        .success();

    tracker()
        .arg("--store")
        .arg(&store)
        .arg("clear-stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    tracker()
        .arg("--store")
        .arg(&store)
        .args(["clear-stats", "--yes"])
        .assert()
        .success();

    tracker()
        .arg("--store")
        .arg(&store)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: no data yet"));
}
