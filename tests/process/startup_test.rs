//! Startup and lifecycle tests for the binary.

use std::io::{BufRead, BufReader};

use super::common::{run, spawn};

#[test]
fn test_missing_dsn_exits_with_usage() {
    let (code, _stdout, stderr) = run(&[]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Usage"));
    assert!(stderr.contains("required: --dsn"));
}

#[test]
fn test_unknown_flag_exits_one() {
    let (code, _stdout, stderr) = run(&["--bogus"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("--bogus"));
    assert!(stderr.contains("invalid command-line arguments"));
}

#[test]
fn test_invalid_addr_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let dsn = dir.path().join("bad-addr.db");

    let (code, _stdout, stderr) = run(&[
        "--dsn",
        dsn.to_str().unwrap(),
        "--addr",
        "not-an-address",
        "--config",
        dir.path().join("absent.toml").to_str().unwrap(),
    ]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid listen address"));
}

#[test]
fn test_invalid_config_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[database]\nclassifier = \"magic\"\n").unwrap();

    let (code, _stdout, stderr) = run(&[
        "--dsn",
        dir.path().join("x.db").to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Configuration error"));
}

/// Scenario: graceful shutdown on SIGTERM
/// Given a running server
/// When it receives SIGTERM
/// Then it logs the shutdown notice and exits with status 0
#[cfg(unix)]
#[test]
fn test_sigterm_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let dsn = dir.path().join("sigterm.db");
    let config = dir.path().join("absent.toml");

    let mut child = spawn(&[
        "--dsn",
        dsn.to_str().unwrap(),
        "--addr",
        "127.0.0.1:0",
        "--config",
        config.to_str().unwrap(),
    ]);

    let mut stderr = BufReader::new(child.stderr.take().unwrap());
    let mut log = String::new();
    let mut line = String::new();
    while stderr.read_line(&mut line).unwrap() > 0 {
        log.push_str(&line);
        if line.contains("listening on") {
            break;
        }
        line.clear();
    }
    assert!(log.contains("listening on"), "server never started: {log}");

    let status = std::process::Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let mut rest = String::new();
    std::io::Read::read_to_string(&mut stderr, &mut rest).unwrap();
    let exit = child.wait().unwrap();

    assert_eq!(exit.code(), Some(0));
    assert!(rest.contains("received signal, shutting down"));
}
