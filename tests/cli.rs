use std::io::Write;
use std::process::{Command, Output, Stdio};

fn archscript() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_archscript"));
    command.env_remove("ARCHSCRIPT_LOG");
    command
}

fn run_once(source: &str) -> Output {
    archscript()
        .args(["--color", "never", source])
        .output()
        .expect("Failed to execute archscript")
}

fn run_session(input: &str) -> Output {
    let mut child = archscript()
        .args(["--color", "never", "--no-history"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start archscript");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write session input");
    child.wait_with_output().expect("Failed to wait for archscript")
}

#[test]
fn test_version_flag() {
    let output = archscript().arg("--version").output().expect("Failed to execute archscript");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("archscript"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_one_shot_prints_canonical_text() {
    let output = run_once("(add 1 2.0)");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "3.0\n");

    let output = run_once("(cat \"a\" \"b\")");
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "\"ab\"\n");
}

#[test]
fn test_one_shot_print_goes_to_stdout() {
    let output = run_once("(print \"side effect\")");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "side effect\nTrue\n");
}

#[test]
fn test_one_shot_error_exit_status() {
    let output = run_once("(add 1 (undefined))");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unbound symbol [undefined] ### (undefined) ### (add 1 (undefined))"));
}

#[test]
fn test_one_shot_incomplete_input_is_an_error() {
    let output = run_once("(add 1");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("mismatched open parenthesis"));
}

#[test]
fn test_max_depth_flag() {
    let output = archscript()
        .args(["--color", "never", "--max-depth", "5", "(add 1 (add 1 (add 1 (add 1 (add 1 (add 1 1))))))"])
        .output()
        .expect("Failed to execute archscript");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().contains("maximum evaluation depth exceeded"));
}

#[test]
fn test_session_survives_errors() {
    let output = run_session("(setq x 2)\n(undefined)\n(add x 1)\n");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stdout.contains('3'));
    assert!(stderr.contains("unbound symbol [undefined]"));
}

#[test]
fn test_session_continues_open_forms() {
    let output = run_session("(add 40\n2)\n");
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("42"));
}

#[test]
fn test_complete_subcommand() {
    let output = archscript().args(["complete", "bash"]).output().expect("Failed to execute archscript");
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("archscript"));
}

#[test]
fn test_invalid_color_choice() {
    let output = archscript().args(["--color", "sometimes", "1"]).output().expect("Failed to execute archscript");
    assert!(!output.status.success());
}
