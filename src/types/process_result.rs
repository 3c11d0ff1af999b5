//! Bytes collected from one external program run.

use std::process::ExitStatus;

use bytes::Bytes;

use crate::encoder::Charset;

/// Output stream, diagnostic stream and exit status of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessResult {
  pub stdout: Bytes,
  pub stderr: Bytes,
  pub status: ExitStatus,
}

impl ProcessResult {
  /// Diagnostic stream decoded with `charset`, lossy on invalid input.
  pub fn diagnostics(&self, charset: Charset) -> String {
    charset.decode_lossy(&self.stderr).trim_end().to_string()
  }

  pub fn has_warnings(&self) -> bool {
    !self.stderr.is_empty()
  }
}
