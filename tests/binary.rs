//! Integration tests for the `execution-agent` binary

use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

use serde_json::Value;

fn run_agent(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_execution-agent"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn execution-agent");

    // The agent may exit before reading stdin (e.g. usage errors).
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());
    child.wait_with_output().unwrap()
}

fn envelope(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1, "stdout must hold exactly one line: {stdout:?}");
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_no_arguments_prints_usage_envelope() {
    let output = run_agent(&[], "{}");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"output\":null,\"logs\":{\"stdout\":\"\",\"stderr\":\"\"},\"error\":\"Agent Usage Error: Missing handler string argument.\"}\n"
    );
}

#[test]
fn test_extra_arguments_print_usage_envelope() {
    let output = run_agent(&["math.add", "extra"], "{}");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(envelope(&output)["error"], "Agent Usage Error: Missing handler string argument.");
}

#[test]
fn test_malformed_stdin() {
    let output = run_agent(&["math.add"], "{not json");

    let value = envelope(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(value["error"].as_str().unwrap().starts_with("Invalid event JSON input: "));
    assert_eq!(value["output"], Value::Null);
}

#[test]
fn test_missing_unit_under_function_root() {
    let output = run_agent(&["missing.run"], "{}");

    let value = envelope(&output);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(value["error"], "FileNotFoundError: Code file not found at /function/missing.rhai");
}

#[test]
fn test_diagnostics_are_tagged_on_stderr() {
    let output = run_agent(&["missing.run"], "{}");

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(!stderr.is_empty());
    assert!(stderr.lines().all(|line| line.starts_with("[AgentLog] ")));
    assert!(stderr.contains("Agent exiting with code 1."));
}
