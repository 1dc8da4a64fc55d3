//! End-to-end coverage of the `engram` binary's line-delimited JSON
//! protocol: spawns the real process, talks to it over stdin/stdout, and
//! asserts on both response bodies and the process exit code.

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

fn spawn(data_dir: &std::path::Path) -> std::process::Child {
    Command::new(env!("CARGO_BIN_EXE_engram"))
        .arg("--data-dir")
        .arg(data_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn the engram binary")
}

fn send_line(child: &mut std::process::Child, line: &str) -> serde_json::Value {
    let stdin = child.stdin.as_mut().expect("child stdin piped");
    writeln!(stdin, "{line}").expect("write request line");
    stdin.flush().expect("flush request line");

    let stdout = child.stdout.as_mut().expect("child stdout piped");
    let mut reader = BufReader::new(stdout);
    let mut response_line = String::new();
    reader.read_line(&mut response_line).expect("read response line");
    serde_json::from_str(&response_line).unwrap_or_else(|e| panic!("response line was not valid JSON: {e}\nline: {response_line}"))
}

fn finish(mut child: std::process::Child) -> i32 {
    drop(child.stdin.take());
    let status = child.wait().expect("child process should exit");
    status.code().unwrap_or(-1)
}

#[test]
fn save_and_search_round_trip_over_the_json_protocol() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut child = spawn(temp_dir.path());

    let save_response = send_line(
        &mut child,
        r#"{"op":"save","content":"the release train ships every other Tuesday","title":"Release cadence"}"#,
    );
    assert_eq!(save_response["status"], "ok");
    assert_eq!(save_response["result"]["decision"], "CREATE");

    let search_response = send_line(&mut child, r#"{"op":"search","query":"the release train ships every other Tuesday","limit":5}"#);
    assert_eq!(search_response["status"], "ok");
    let hits = search_response["result"].as_array().expect("search result is an array");
    assert_eq!(hits.len(), 1);

    let code = finish(child);
    assert_eq!(code, 0);
}

#[test]
fn an_unknown_field_is_rejected_with_a_malformed_request_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut child = spawn(temp_dir.path());

    let response = send_line(&mut child, r#"{"op":"save","content":"x","bogus_field":true}"#);
    assert_eq!(response["status"], "error");

    let code = finish(child);
    assert_eq!(code, 20);
}

#[test]
fn a_duplicate_save_exits_with_code_two() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let mut child = spawn(temp_dir.path());

    let content = "the on-call escalation policy pages the secondary after 15 minutes";
    let first = send_line(&mut child, &format!(r#"{{"op":"save","content":"{content}","title":"Escalation"}}"#));
    assert_eq!(first["result"]["decision"], "CREATE");

    let second = send_line(&mut child, &format!(r#"{{"op":"save","content":"{content}","title":"Escalation"}}"#));
    assert_eq!(second["result"]["decision"], "REJECT");

    let code = finish(child);
    assert_eq!(code, 2);
}

#[test]
fn help_and_version_flags_exit_zero_without_touching_storage() {
    let help_status = Command::new(env!("CARGO_BIN_EXE_engram"))
        .arg("--help")
        .stdout(Stdio::null())
        .status()
        .expect("spawn --help");
    assert!(help_status.success());

    let version_status = Command::new(env!("CARGO_BIN_EXE_engram"))
        .arg("--version")
        .stdout(Stdio::null())
        .status()
        .expect("spawn --version");
    assert!(version_status.success());
}

#[test]
fn an_unknown_flag_exits_with_code_twenty() {
    let status = Command::new(env!("CARGO_BIN_EXE_engram"))
        .arg("--not-a-real-flag")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("spawn with an unknown flag");
    assert_eq!(status.code(), Some(20));
}
