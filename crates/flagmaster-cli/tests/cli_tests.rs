//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn flagmaster() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("flagmaster").unwrap()
}

/// A command isolated from any user config or API keys.
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = flagmaster();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("FLAGMASTER_GEMINI_KEY")
        .env_remove("FLAGMASTER_ANTHROPIC_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// One country per tier, each with unique attributes.
fn small_dataset(skip_tier: Option<u8>) -> String {
    let names = [
        "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India",
        "Juliet",
    ];
    names
        .iter()
        .zip(1u8..)
        .filter(|(_, tier)| Some(*tier) != skip_tier)
        .map(|(name, tier)| {
            format!(
                "[[countries]]\nname = \"{name}\"\niso_code = \"{}\"\ncapital = \"{name} City\"\ncurrency = \"{name} Coin\"\ndifficulty = {tier}\n\n",
                name[..2].to_lowercase()
            )
        })
        .collect()
}

#[test]
fn validate_builtin_dataset() {
    flagmaster()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in (100 countries)"))
        .stdout(predicate::str::contains("tier 10: 10 countries"))
        .stdout(predicate::str::contains("Dataset valid."));
}

#[test]
fn validate_small_dataset_warns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("small.toml");
    std::fs::write(&path, small_dataset(None)).unwrap();

    flagmaster()
        .arg("validate")
        .arg("--dataset")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING: tier 1 has 1 countries"))
        .stdout(predicate::str::contains("10 warning(s) found."));
}

#[test]
fn validate_missing_tier_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gap.toml");
    std::fs::write(&path, small_dataset(Some(7))).unwrap();

    flagmaster()
        .arg("validate")
        .arg("--dataset")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no countries at difficulty tier 7"));
}

#[test]
fn validate_nonexistent_file() {
    flagmaster()
        .arg("validate")
        .arg("--dataset")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn countries_filtered_by_tier() {
    flagmaster()
        .arg("countries")
        .arg("--tier")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("France"))
        .stdout(predicate::str::contains("Paris"))
        .stdout(predicate::str::contains("Nauru").not())
        .stdout(predicate::str::contains("10 countries"));
}

#[test]
fn countries_rejects_unknown_tier() {
    flagmaster()
        .arg("countries")
        .arg("--tier")
        .arg("11")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tier must be between 1 and 10"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    flagmaster()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created flagmaster.toml"))
        .stdout(predicate::str::contains("Created countries.toml"));

    assert!(dir.path().join("flagmaster.toml").exists());

    // The copied dataset is immediately usable.
    flagmaster()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--dataset")
        .arg("countries.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset valid."));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    flagmaster()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    flagmaster()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("flagmaster.toml already exists"));
}

#[test]
fn play_quit_from_menu() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .arg("play")
        .arg("--offline")
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("=== FLAGMASTER ==="))
        .stdout(predicate::str::contains("Thanks for playing!"));
}

#[test]
fn play_answers_first_question() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .args(["play", "--mode", "normal", "--seed", "5", "--offline"])
        .write_stdin("1\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[NORMAL] Level 1/10"))
        .stdout(predicate::str::contains("Identify Country"))
        .stdout(
            predicate::str::contains("Correct! +10")
                .or(predicate::str::contains("Oops! The correct answer was")),
        );
}

#[test]
fn play_blitz_shows_clock() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .args(["play", "--mode", "blitz", "--offline"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Time 60s"));
}

#[test]
fn play_menu_selects_mode() {
    let dir = TempDir::new().unwrap();

    isolated(&dir)
        .args(["play", "--offline"])
        .write_stdin("b\nm\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[BLITZ] Level 1/10"))
        .stdout(predicate::str::contains("Normal mode").count(2));
}

#[test]
fn play_rejects_unknown_mode() {
    flagmaster()
        .args(["play", "--mode", "turbo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("turbo"));
}

#[test]
fn play_rejects_unplayable_dataset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gap.toml");
    std::fs::write(&path, small_dataset(Some(3))).unwrap();

    isolated(&dir)
        .args(["play", "--offline", "--dataset"])
        .arg(&path)
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("dataset cannot be played"));
}

#[test]
fn help_output() {
    flagmaster()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Flag quiz game for the terminal"));
}

#[test]
fn version_output() {
    flagmaster()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flagmaster"));
}
