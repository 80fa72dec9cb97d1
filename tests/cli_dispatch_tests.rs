use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_escouade")
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("escouade-{name}-{stamp}.yaml"))
}

fn escouade() -> Command {
    let mut command = Command::new(bin());
    command.env_remove("ESCOUADE_CATALOG");
    command
}

#[test]
fn simulate_command_emits_json_summary() {
    let output = escouade()
        .args(["simulate", "4", "1"])
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("simulate should emit json");
    assert_eq!(payload["iterations"], 4);
    assert_eq!(payload["seed"], 1);
    assert!(payload["win_rate"].is_number());
}

#[test]
fn simulate_sequential_and_parallel_agree() {
    let run = |extra: &[&str]| {
        let output = escouade()
            .args(["simulate", "6", "42"])
            .args(extra)
            .output()
            .expect("simulate should run");
        assert_eq!(output.status.code(), Some(0));
        String::from_utf8_lossy(&output.stdout).into_owned()
    };

    assert_eq!(run(&["--sequential"]), run(&[]));
}

#[test]
fn simulate_csv_prints_turn_history() {
    let output = escouade()
        .args(["simulate", "1", "5", "--csv"])
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    let header = lines.next().expect("csv header");
    assert!(header.starts_with("combat,rank,round"));
    assert!(lines.next().is_some(), "at least one turn should be recorded");
}

#[test]
fn catalog_command_dumps_yaml_that_validates() {
    let output = escouade()
        .arg("catalog")
        .output()
        .expect("catalog should run");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Épéiste"));

    let path = unique_temp_path("catalog");
    fs::write(&path, stdout.as_bytes()).expect("catalog should be written");
    let output = escouade()
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));

    let _ = fs::remove_file(path);
}

#[test]
fn validate_command_returns_non_zero_on_invalid_catalog() {
    let path = unique_temp_path("invalid-catalog");
    fs::write(
        &path,
        "units:\n  - name: Fantôme\n    icon: x\n    damage: 1\n    multiplier: 1\n    type: Magique\n  - name: Fantôme\n    icon: y\n    damage: 2\n    multiplier: 1\n    type: Magique\nsynergies: []\nbonuses: []\nbosses: []\nboss_ranks: []\n",
    )
    .expect("fixture should be written");

    let output = escouade()
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed"));

    let _ = fs::remove_file(path);
}

#[test]
fn play_command_prints_playback_steps() {
    let output = escouade()
        .args(["play", "9"])
        .output()
        .expect("play should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-- round 1/5"));
    assert!(stdout.contains("\"step\":\"final_damage\""));
    assert!(stdout.contains("victory") || stdout.contains("defeat"));
}

#[test]
fn unknown_command_prints_usage() {
    let output = escouade()
        .arg("conquer")
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: escouade"));
}
