//! Tests for `process_runner`.

#![cfg(unix)]

use std::io;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::encoder::Charset;
use crate::error::GraphError;
use crate::process_runner::{ProcessRunner, collect_output};
use crate::test_support::{fake_program, init_tracing, process_lock};

fn sh(script: &str) -> Vec<String> {
  vec!["-c".to_string(), script.to_string()]
}

fn big_input() -> Vec<u8> {
  // larger than any pipe buffer, in both directions
  (0..300_000u32).map(|i| b'a' + (i % 26) as u8).collect()
}

#[test]
fn large_input_and_output_do_not_deadlock() {
  let _lock = process_lock();
  let input = big_input();
  let runner = ProcessRunner::new("cat");
  let result = runner.run(&[], &input).unwrap();
  assert!(result.status.success());
  assert_eq!(result.stdout.len(), input.len());
  assert_eq!(&result.stdout[..], &input[..]);
}

#[test]
fn both_streams_are_drained_while_writing() {
  let _lock = process_lock();
  let input = big_input();
  // echo every byte to both streams while stdin is still being written
  let runner = ProcessRunner::new("sh");
  let result = runner.run(&sh("tee /dev/stderr"), &input).unwrap();
  assert!(result.status.success());
  assert_eq!(result.stdout.len(), input.len());
  assert_eq!(result.stderr.len(), input.len());
}

#[test]
fn diagnostics_alongside_output_are_only_a_warning() {
  let _lock = process_lock();
  init_tracing();
  let runner = ProcessRunner::new("sh");
  let result = runner
    .run(&sh("cat; echo 'Warning: odd input' >&2"), b"graph { a }")
    .unwrap();
  assert!(result.has_warnings());
  let out = runner.check(result, Charset::Utf8).unwrap();
  assert_eq!(&out[..], b"graph { a }");
}

#[test]
fn nonzero_exit_is_a_failure_with_diagnostics() {
  let _lock = process_lock();
  let runner = ProcessRunner::new("sh");
  let result = runner
    .run(&sh("cat; echo 'Error: syntax error' >&2; exit 3"), b"x")
    .unwrap();
  match runner.check(result, Charset::Utf8).unwrap_err() {
    GraphError::ProcessFailure {
      program,
      status,
      diagnostics,
    } => {
      assert_eq!(program, "sh");
      assert_eq!(status, Some(3));
      assert_eq!(diagnostics, "Error: syntax error");
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[test]
fn empty_output_is_a_failure_even_on_success() {
  let _lock = process_lock();
  let runner = ProcessRunner::new("sh");
  let result = runner.run(&sh("cat > /dev/null"), b"graph {}").unwrap();
  assert!(result.status.success());
  let err = runner.check(result, Charset::Utf8).unwrap_err();
  match err {
    GraphError::ProcessFailure {
      status,
      diagnostics,
      ..
    } => {
      assert_eq!(status, Some(0));
      assert!(diagnostics.starts_with("no output"));
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[test]
fn program_that_ignores_stdin_is_tolerated() {
  let _lock = process_lock();
  let runner = ProcessRunner::new("sh");
  let result = runner.run(&sh("echo done"), &big_input()).unwrap();
  assert!(result.status.success());
  assert_eq!(&result.stdout[..], b"done\n");
}

#[test]
fn latin1_diagnostics_are_decoded() {
  let _lock = process_lock();
  let dir = tempfile::tempdir().unwrap();
  let script = fake_program(dir.path(), "complain", "printf 'caf\\351\\n' >&2; exit 1");
  let runner = ProcessRunner::new(&script);
  assert_eq!(runner.name(), "complain");
  let result = runner.run(&[], b"").unwrap();
  match runner.check(result, Charset::Latin1).unwrap_err() {
    GraphError::ProcessFailure { diagnostics, .. } => assert_eq!(diagnostics, "café"),
    other => panic!("unexpected error: {other:?}"),
  }
}

#[test]
fn missing_program_is_an_io_error() {
  let runner = ProcessRunner::new("/nonexistent/agraph-no-such-program");
  let err = runner.run(&[], b"").unwrap_err();
  match err {
    GraphError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn async_run_does_not_deadlock() {
  let _lock = process_lock();
  let input = Bytes::from(big_input());
  let runner = ProcessRunner::new("cat");
  let result = runner.run_async(&[], input.clone(), None).await.unwrap();
  assert!(result.status.success());
  assert_eq!(result.stdout, input);
}

#[tokio::test]
async fn async_run_times_out() {
  let _lock = process_lock();
  let runner = ProcessRunner::new("sh");
  let err = runner
    .run_async(
      &sh("exec sleep 5"),
      Bytes::new(),
      Some(Duration::from_millis(100)),
    )
    .await
    .unwrap_err();
  match err {
    GraphError::ProcessFailure {
      status,
      diagnostics,
      ..
    } => {
      assert_eq!(status, None);
      assert!(diagnostics.contains("timed out"));
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[test]
fn async_run_on_a_blocking_runtime() {
  let _lock = process_lock();
  let runner = ProcessRunner::new("sh");
  let result = tokio_test::block_on(runner.run_async(
    &sh("cat; echo note >&2"),
    Bytes::from_static(b"digraph { a -> b }"),
    Some(Duration::from_secs(10)),
  ))
  .unwrap();
  assert_eq!(&result.stdout[..], b"digraph { a -> b }");
  assert_eq!(result.diagnostics(Charset::Utf8), "note");
}

#[test]
fn failed_reader_kills_and_reaps_child() {
  let _lock = process_lock();
  let mut child = Command::new("sleep")
    .arg("5")
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .unwrap();
  let out_reader = thread::spawn(|| -> io::Result<Vec<u8>> { Err(io::Error::other("read failed")) });
  let err_reader = thread::spawn(|| -> io::Result<Vec<u8>> { Ok(Vec::new()) });
  let started = Instant::now();
  let err = collect_output(&mut child, out_reader, err_reader).unwrap_err();
  assert_eq!(err.to_string(), "read failed");
  assert!(started.elapsed() < Duration::from_secs(4));
  let status = child.try_wait().unwrap().expect("child was reaped");
  assert!(!status.success());
}
