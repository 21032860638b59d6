use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_orgmacro"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn orgmacro");
    child
        .stdin
        .take()
        .expect("child stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("run orgmacro")
}

#[test]
fn expands_stream_from_stdin() {
    let input = "#+MACRO: greet Hello $1!\nsay: <<<greet(World)>>>\n";
    let output = run_with_stdin(&[], input);

    assert!(output.status.success(), "process failed: {output:?}");
    assert_eq!(output.stdout, b"say: Hello World!\n");
}

#[test]
fn definition_lines_are_not_echoed() {
    let input = "#+MACRO: X y\nplain\n";
    let output = run_with_stdin(&[], input);

    assert!(output.status.success(), "process failed: {output:?}");
    assert_eq!(output.stdout, b"plain\n");
}

#[test]
fn final_line_keeps_missing_terminator() {
    let output = run_with_stdin(&[], "#+MACRO: X y\n<<<X>>>");

    assert!(output.status.success(), "process failed: {output:?}");
    assert_eq!(output.stdout, b"y");
}

#[test]
fn max_passes_aborts_runaway_expansion() {
    let input = "#+MACRO: LOOP <<<LOOP>>>x\n<<<LOOP>>>\n";
    let output = run_with_stdin(&["--max-passes", "16"], input);

    assert!(!output.status.success(), "expected failure: {output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("did not settle"),
        "expected pass-limit message, got: {stderr}"
    );
}

#[test]
fn reads_input_file_argument() {
    let dir = std::env::temp_dir().join(format!(
        "orgmacro_cli_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos())
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("input.org");
    std::fs::write(&path, "#+MACRO: v 1.0\nversion <<<v>>>\n").expect("write input");

    let output = Command::new(env!("CARGO_BIN_EXE_orgmacro"))
        .arg(&path)
        .output()
        .expect("run orgmacro");
    let _ = std::fs::remove_dir_all(&dir);

    assert!(output.status.success(), "process failed: {output:?}");
    assert_eq!(output.stdout, b"version 1.0\n");
}

#[test]
fn missing_input_file_reports_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_orgmacro"))
        .arg("/nonexistent/orgmacro-input")
        .output()
        .expect("run orgmacro");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot open"), "got: {stderr}");
}
