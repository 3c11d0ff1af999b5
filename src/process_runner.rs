//! Runs an external program with the graph on stdin.
//!
//! Pipes have bounded kernel buffers: a parent that writes all input before
//! reading any output deadlocks against a child that fills its output pipe
//! first. Both output streams are therefore drained by their own reader,
//! started before the first byte of input is written.
//!
//! - [ProcessRunner::run]: one reader thread per stream.
//! - [ProcessRunner::run_async]: one tokio task per stream, with an optional
//!   wall-clock limit after which the child is killed.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, instrument, warn};

use crate::encoder::Charset;
use crate::error::{GraphError, Result};
use crate::types::ProcessResult;

/// Runner for one executable.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
  program: PathBuf,
  name: String,
}

fn drain(mut stream: impl Read) -> io::Result<Vec<u8>> {
  let mut buf = Vec::new();
  stream.read_to_end(&mut buf)?;
  Ok(buf)
}

fn join_reader(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
  handle
    .join()
    .map_err(|_| io::Error::other("pipe reader panicked"))?
}

/// Joins both pipe readers. On a read failure the child is killed and reaped
/// before the error is returned.
pub(crate) fn collect_output(
  child: &mut Child,
  out_reader: JoinHandle<io::Result<Vec<u8>>>,
  err_reader: JoinHandle<io::Result<Vec<u8>>>,
) -> io::Result<(Vec<u8>, Vec<u8>)> {
  // stderr only reaches EOF once the child is gone
  let stdout = join_reader(out_reader).inspect_err(|_| {
    let _ = child.kill();
  });
  let stderr = join_reader(err_reader);
  match (stdout, stderr) {
    (Ok(out), Ok(err)) => Ok((out, err)),
    (Err(e), _) | (_, Err(e)) => {
      let _ = child.kill();
      let _ = child.wait();
      Err(e)
    }
  }
}

fn missing_pipe(which: &str) -> GraphError {
  GraphError::Io(io::Error::other(format!("{which} was not captured")))
}

impl ProcessRunner {
  /// `program` is a path or a bare name resolved by the OS.
  pub fn new(program: impl Into<PathBuf>) -> Self {
    let program = program.into();
    let name = program
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| program.display().to_string());
    Self { program, name }
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  /// Short name used in diagnostics.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Runs the program with `args`, feeding `input` on stdin, and collects
  /// both output streams and the exit status. The result is returned as is;
  /// see [ProcessRunner::check] for the success policy.
  #[instrument(level = "trace", skip(self, input), fields(program = %self.name, input_len = input.len()))]
  pub fn run(&self, args: &[String], input: &[u8]) -> Result<ProcessResult> {
    let mut child = Command::new(&self.program)
      .args(args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()?;

    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;
    let out_reader = thread::spawn(move || drain(stdout));
    let err_reader = thread::spawn(move || drain(stderr));

    // stdin is dropped at the end of this match, closing the pipe
    let written = match child.stdin.take() {
      Some(mut stdin) => stdin.write_all(input),
      None => Ok(()),
    };
    let write_error = match written {
      Ok(()) => None,
      Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
        debug!(program = %self.name, "program closed stdin before reading all input");
        None
      }
      Err(e) => {
        let _ = child.kill();
        Some(e)
      }
    };

    let (stdout, stderr) = collect_output(&mut child, out_reader, err_reader)?;
    let status = child.wait()?;
    if let Some(e) = write_error {
      return Err(e.into());
    }
    debug!(program = %self.name, %status, stdout = stdout.len(), stderr = stderr.len(), "program finished");
    Ok(ProcessResult {
      stdout: Bytes::from(stdout),
      stderr: Bytes::from(stderr),
      status,
    })
  }

  /// Async variant of [ProcessRunner::run]. With `timeout`, a run that takes
  /// longer is killed and reported as a [GraphError::ProcessFailure].
  #[instrument(level = "trace", skip(self, input), fields(program = %self.name, input_len = input.len()))]
  pub async fn run_async(
    &self,
    args: &[String],
    input: Bytes,
    timeout: Option<Duration>,
  ) -> Result<ProcessResult> {
    let mut child = tokio::process::Command::new(&self.program)
      .args(args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()?;

    let mut stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let mut stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;
    let out_task = tokio::spawn(async move {
      let mut buf = Vec::new();
      stdout.read_to_end(&mut buf).await.map(|_| buf)
    });
    let err_task = tokio::spawn(async move {
      let mut buf = Vec::new();
      stderr.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stdin = child.stdin.take();
    let name = self.name.as_str();

    let exchange = async {
      if let Some(mut stdin) = stdin {
        match stdin.write_all(&input).await {
          Ok(()) => {}
          Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!(program = %name, "program closed stdin before reading all input");
          }
          Err(e) => return Err(GraphError::Io(e)),
        }
      }
      let stdout = out_task.await.map_err(io::Error::other)??;
      let stderr = err_task.await.map_err(io::Error::other)??;
      let status = child.wait().await?;
      Ok(ProcessResult {
        stdout: Bytes::from(stdout),
        stderr: Bytes::from(stderr),
        status,
      })
    };

    let Some(limit) = timeout else {
      return exchange.await;
    };
    match tokio::time::timeout(limit, exchange).await {
      Ok(result) => result,
      Err(_) => {
        warn!(program = %self.name, limit_ms = limit.as_millis() as u64, "program timed out, killing it");
        let _ = child.start_kill();
        let _ = child.wait().await;
        Err(GraphError::ProcessFailure {
          program: self.name.clone(),
          status: None,
          diagnostics: format!("timed out after {} ms", limit.as_millis()),
        })
      }
    }
  }

  /// Applies the success policy: the run fails when the program exits
  /// abnormally or writes nothing to stdout. Diagnostics alongside output
  /// are logged as a warning.
  pub fn check(&self, result: ProcessResult, charset: Charset) -> Result<Bytes> {
    self.check_exit(result, charset, &[0])
  }

  /// [ProcessRunner::check] for programs that report a finding through a
  /// nonzero exit code listed in `accepted`.
  pub fn check_exit(&self, result: ProcessResult, charset: Charset, accepted: &[i32]) -> Result<Bytes> {
    let diagnostics = result.diagnostics(charset);
    let exited_ok = result.status.code().is_some_and(|c| accepted.contains(&c));
    if !exited_ok || result.stdout.is_empty() {
      let diagnostics = if diagnostics.is_empty() {
        format!("no output ({})", result.status)
      } else {
        diagnostics
      };
      return Err(GraphError::ProcessFailure {
        program: self.name.clone(),
        status: result.status.code(),
        diagnostics,
      });
    }
    if result.has_warnings() {
      warn!(program = %self.name, "{diagnostics}");
    }
    Ok(result.stdout)
  }
}
