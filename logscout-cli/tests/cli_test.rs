use anyhow::Result;
use assert_cmd::Command;
use chrono::{Duration, Local};
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Writes `recent` error lines from the last minute and `stale` ones from two hours ago
fn create_log(dir: &TempDir, name: &str, recent: usize, stale: usize) -> Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    let now = Local::now();
    for i in 0..recent {
        let ts = now - Duration::seconds(i as i64 % 60);
        writeln!(file, "{} web01 nginx: ERROR upstream timed out", ts.format("%b %e %H:%M:%S"))?;
        writeln!(file, "{} web01 nginx: INFO request {} ok", ts.format("%b %e %H:%M:%S"), i)?;
    }
    for _ in 0..stale {
        let ts = now - Duration::hours(2);
        writeln!(file, "{} web01 nginx: ERROR old failure", ts.format("%b %e %H:%M:%S"))?;
    }
    Ok(path)
}

fn check(path: &Path, warning: u64, critical: u64, time_point: u64) -> Result<Command> {
    let (warning, critical, time_point) = (
        warning.to_string(),
        critical.to_string(),
        time_point.to_string(),
    );
    let mut cmd = Command::cargo_bin("logscout-cli")?;
    cmd.env_remove("RUST_LOG").args([
        "-p",
        path.to_str().unwrap(),
        "-e",
        "error",
        "-w",
        warning.as_str(),
        "-c",
        critical.as_str(),
        "-t",
        time_point.as_str(),
    ]);
    Ok(cmd)
}

#[test]
fn test_ok_status() -> Result<()> {
    let dir = tempdir()?;
    let path = create_log(&dir, "app.log", 0, 3)?;

    check(&path, 1, 2, 3600)?
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("OK: 0 errors \"error\""));
    Ok(())
}

#[test]
fn test_warning_status() -> Result<()> {
    let dir = tempdir()?;
    let path = create_log(&dir, "app.log", 2, 5)?;

    check(&path, 2, 5, 3600)?
        .assert()
        .code(1)
        .stdout(predicate::str::contains("WARNING: 2 errors \"error\" were found"))
        .stdout(predicate::str::contains("for the last 3600 sec!"));
    Ok(())
}

#[test]
fn test_critical_status() -> Result<()> {
    let dir = tempdir()?;
    let path = create_log(&dir, "app.log", 4, 0)?;

    check(&path, 4, 4, 3600)?
        .assert()
        .code(2)
        .stdout(predicate::str::starts_with("CRITICAL: 4 errors"));
    Ok(())
}

#[test]
fn test_show_matches() -> Result<()> {
    let dir = tempdir()?;
    let path = create_log(&dir, "app.log", 1, 1)?;

    check(&path, 1, 2, 3600)?
        .arg("--show-matches")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR upstream timed out"))
        .stdout(predicate::str::contains("old failure").not());
    Ok(())
}

#[test]
fn test_warning_above_critical_is_unknown() -> Result<()> {
    let dir = tempdir()?;
    let path = create_log(&dir, "app.log", 1, 0)?;

    check(&path, 5, 2, 3600)?
        .assert()
        .code(3)
        .stdout(predicate::str::contains("UNKNOWN"))
        .stdout(predicate::str::contains("must not exceed critical"));
    Ok(())
}

#[test]
fn test_missing_file_is_unknown() -> Result<()> {
    let dir = tempdir()?;

    check(&dir.path().join("absent.log"), 1, 2, 60)?
        .assert()
        .code(3)
        .stdout(predicate::str::contains("UNKNOWN: File not found"));
    Ok(())
}

#[test]
fn test_missing_required_argument_is_unknown() -> Result<()> {
    let dir = tempdir()?;
    let path = create_log(&dir, "app.log", 1, 0)?;

    let mut cmd = Command::cargo_bin("logscout-cli")?;
    cmd.args(["-p", path.to_str().unwrap(), "-e", "error", "-w", "1"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("critical threshold is required"));
    Ok(())
}

#[test]
fn test_invalid_flag_is_unknown() -> Result<()> {
    let mut cmd = Command::cargo_bin("logscout-cli")?;
    cmd.args(["--warning", "many"]).assert().code(3);
    Ok(())
}

#[test]
fn test_log_pattern() -> Result<()> {
    let dir = tempdir()?;
    let today = Local::now().format("%Y-%m-%d").to_string();
    create_log(&dir, &format!("SpamCop-{}.log", today), 3, 0)?;

    let mut cmd = Command::cargo_bin("logscout-cli")?;
    cmd.args([
        "-p",
        dir.path().to_str().unwrap(),
        "-l",
        "SpamCop-%Y-%m-%d.log",
        "-e",
        "ERROR",
        "-w",
        "1",
        "-c",
        "10",
        "-t",
        "600",
    ])
    .assert()
    .code(1)
    .stdout(predicate::str::contains(format!("SpamCop-{}.log", today)));
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let dir = tempdir()?;
    let path = create_log(&dir, "app.log", 3, 0)?;
    let config_path = dir.path().join("check.yaml");
    std::fs::write(
        &config_path,
        format!(
            "log_path: \"{}\"\nerror_pattern: \"timed out\"\nwarning: 1\ncritical: 3\nmax_age_secs: 600\n",
            path.display()
        ),
    )?;

    let mut cmd = Command::cargo_bin("logscout-cli")?;
    cmd.args(["--config", config_path.to_str().unwrap()])
        .assert()
        .code(2)
        .stdout(predicate::str::starts_with("CRITICAL: 3 errors \"timed out\""));

    // Flags override the file
    let mut cmd = Command::cargo_bin("logscout-cli")?;
    cmd.args(["--config", config_path.to_str().unwrap(), "-c", "10"])
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn test_time_of_day_log_pattern_is_unknown() -> Result<()> {
    let dir = tempdir()?;

    let mut cmd = Command::cargo_bin("logscout-cli")?;
    cmd.args([
        "-p",
        dir.path().to_str().unwrap(),
        "-l",
        "app-%H.log",
        "-e",
        "error",
        "-w",
        "1",
        "-c",
        "2",
        "-t",
        "60",
    ])
    .assert()
    .code(3)
    .stdout(predicate::str::contains("UNKNOWN"))
    .stdout(predicate::str::contains("uses items a date cannot supply"));
    Ok(())
}
