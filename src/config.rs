//! Layout pipeline configuration, from a JSON file and environment overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{GraphError, Result};

/// Executable search path used instead of `PATH`.
pub const ENV_SEARCH_PATH: &str = "AGRAPH_SEARCH_PATH";
/// Wall-clock limit in milliseconds for async program runs.
pub const ENV_TIMEOUT_MS: &str = "AGRAPH_TIMEOUT_MS";
/// Program used when `layout` is not given one.
pub const ENV_DEFAULT_PROGRAM: &str = "AGRAPH_DEFAULT_PROGRAM";

/// Settings for running external layout programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
  /// Directories searched for programs, in `PATH` syntax. `None` uses `PATH`.
  pub search_path: Option<String>,
  /// Kill async runs that take longer than this.
  pub timeout_ms: Option<u64>,
  /// Node count above which layout and draw log a warning.
  pub large_graph_warning: usize,
  pub default_program: String,
}

impl Default for LayoutConfig {
  fn default() -> Self {
    Self {
      search_path: None,
      timeout_ms: None,
      large_graph_warning: 1000,
      default_program: "neato".to_string(),
    }
  }
}

impl LayoutConfig {
  /// Loads a config from `path`. Missing fields take their defaults.
  #[instrument(level = "trace", skip(path))]
  pub fn load(path: &Path) -> Result<Self> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| GraphError::Config(e.to_string()))
  }

  /// Saves the config to `path` as pretty JSON.
  #[instrument(level = "trace", skip(path, self))]
  pub fn save(&self, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(self).map_err(|e| GraphError::Config(e.to_string()))?;
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
  }

  /// Defaults overridden by the process environment.
  pub fn from_env() -> Result<Self> {
    Self::default().apply_env(|key| std::env::var(key).ok())
  }

  /// Applies overrides looked up through `lookup`. Empty values are ignored.
  pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(path) = get(ENV_SEARCH_PATH) {
      self.search_path = Some(path);
    }
    if let Some(ms) = get(ENV_TIMEOUT_MS) {
      let ms = ms
        .trim()
        .parse::<u64>()
        .map_err(|e| GraphError::Config(format!("{ENV_TIMEOUT_MS}={ms}: {e}")))?;
      self.timeout_ms = Some(ms);
    }
    if let Some(prog) = get(ENV_DEFAULT_PROGRAM) {
      self.default_program = prog.trim().to_string();
    }
    Ok(self)
  }
}
