//! Shared helpers for unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Serializes tests that write an executable and then run it. Without it a
/// concurrent fork in another test thread can still hold the script's write
/// descriptor, and exec fails with "text file busy".
pub(crate) static PROCESS_LOCK: Mutex<()> = Mutex::new(());

/// Takes [PROCESS_LOCK], ignoring poisoning from a failed test.
pub(crate) fn process_lock() -> MutexGuard<'static, ()> {
  PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Collapses whitespace runs so DOT text compares independently of layout.
pub(crate) fn squash(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Writes an executable `sh` script called `name` into `dir`.
#[cfg(unix)]
pub(crate) fn fake_program(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::io::Write;
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  {
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "#!/bin/sh").unwrap();
    writeln!(file, "{body}").unwrap();
    file.sync_all().unwrap();
  }
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Installs a test subscriber so `tracing` output shows up with `--nocapture`.
pub(crate) fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_test_writer()
    .with_max_level(tracing::Level::DEBUG)
    .try_init();
}
