//! CLI end-to-end tests
//!
//! Tests for the vodforge command-line interface. None of these need
//! ffmpeg or ffprobe installed.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the vodforge binary, run from `dir` so no stray
/// `config.toml` is picked up.
#[allow(deprecated)]
fn vodforge_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vodforge").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_lists_commands() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcode"))
        .stdout(predicate::str::contains("ladder"))
        .stdout(predicate::str::contains("check-tools"));
}

#[test]
fn test_cli_version_command() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "vodforge {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_ladder_default_catalog() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .args(["ladder", "1920", "1080"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1080p"))
        .stdout(predicate::str::contains("144p"))
        .stdout(predicate::str::contains("2k").not());
}

#[test]
fn test_cli_ladder_too_small_with_three_rungs() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("three.toml");
    fs::write(
        &config,
        r#"
[[presets]]
name = "1080p"
width = 1920
height = 1080
quality_factor = 20
bitrate = "5000k"

[[presets]]
name = "720p"
width = 1280
height = 720
quality_factor = 23
bitrate = "3000k"

[[presets]]
name = "480p"
width = 854
height = 480
quality_factor = 26
bitrate = "1500k"
"#,
    )
    .unwrap();

    vodforge_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["ladder", "320", "240"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"));
}

#[test]
fn test_cli_validate_defaults() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("4k, 2k, 1080p, 720p, 480p, 360p, 144p"));
}

#[test]
fn test_cli_validate_good_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("vodforge.toml");
    fs::write(
        &config,
        "[server]\nport = 9000\n\n[storage]\nmedia_root = \"/srv/vod\"\n",
    )
    .unwrap();

    vodforge_cmd(dir.path())
        .arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("0.0.0.0:9000"))
        .stdout(predicate::str::contains("/srv/vod"));
}

#[test]
fn test_cli_validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[transcode]\nmax_concurrent_jobs = 0\n").unwrap();

    vodforge_cmd(dir.path())
        .arg("validate")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_concurrent_jobs"));
}

#[test]
fn test_cli_validate_missing_file() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .args(["validate", "/nonexistent/vodforge.toml"])
        .assert()
        .failure();
}

#[test]
fn test_cli_check_tools_runs_without_tools() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"))
        .stdout(predicate::str::contains("ffprobe"));
}

#[test]
fn test_cli_transcode_missing_input() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .args(["transcode", "does-not-exist.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_probe_missing_file() {
    let dir = tempdir().unwrap();
    vodforge_cmd(dir.path())
        .args(["probe", "does-not-exist.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
