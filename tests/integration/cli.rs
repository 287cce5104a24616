//! Process-level behaviour of the command-line interface.

use std::fs::File;
use std::process::Stdio;

use crate::common::{get_free_port, run_list, waitlist_command};

#[test]
fn unknown_subcommand_exits_nonzero_with_usage() {
    let output = waitlist_command()
        .arg("frobnicate")
        .stdout(Stdio::piped())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "{stderr}");
}

#[test]
fn help_succeeds_and_lists_commands() {
    let output = waitlist_command().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["serve", "list", "demo"] {
        assert!(stdout.contains(command), "{command} missing from help: {stdout}");
    }
}

#[test]
fn list_of_missing_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");

    let output = run_list(&path, false);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "{stderr}");
    assert!(!path.exists());
}

#[test]
fn list_reads_database_path_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("from_env.db");
    File::create(&path).unwrap();

    let output = waitlist_command()
        .arg("list")
        .env("DATABASE_PATH", &path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "ID            Email  Created At\n(no entries)\n");
}

#[test]
fn serve_exits_nonzero_when_database_cannot_be_opened() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing_dir").join("waitlist.db");

    let output = waitlist_command()
        .args(["serve", "--bind", "127.0.0.1", "--port", &get_free_port().to_string()])
        .arg("-f")
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success(), "{output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("database setup failed"), "{stderr}");
    assert!(!path.exists());
}
