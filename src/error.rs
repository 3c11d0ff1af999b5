//! Error taxonomy for graph construction, parsing and external programs.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by graph operations, the DOT reader and the layout pipeline.
#[derive(Debug, Error)]
pub enum GraphError {
  /// Lookup of a node, edge or subgraph that does not exist.
  #[error("{kind} {name} not in graph")]
  NotFound {
    /// What was looked up (`node`, `edge`, `subgraph`).
    kind: &'static str,
    /// Name of the missing item, as the caller spelled it.
    name: String,
  },

  /// Malformed DOT text.
  #[error("parse error at line {line}: {message}")]
  Parse {
    /// 1-based line of the offending token.
    line: usize,
    /// What the reader expected or rejected.
    message: String,
  },

  /// External program produced no output or exited abnormally.
  #[error("{program} failed{}: {diagnostics}", .status.map(|c| format!(" (exit {c})")).unwrap_or_default())]
  ProcessFailure {
    /// Program that was run.
    program: String,
    /// Exit code, when the process exited normally.
    status: Option<i32>,
    /// Captured diagnostic stream.
    diagnostics: String,
  },

  /// Program is not in the allow-list, or is not on the search path.
  #[error("program {program}: {reason}")]
  ProgramNotFound {
    /// Requested program name.
    program: String,
    /// Why it could not be used.
    reason: String,
  },

  /// API used out of order (e.g. `draw` before `layout` without a program).
  #[error("{0}")]
  Usage(String),

  /// The graph handle was closed, or the graph it referred to was replaced.
  #[error("graph handle is closed")]
  Closed,

  /// Text could not be represented in the graph's charset.
  #[error("encoding error: {0}")]
  Encoding(String),

  /// The `charset` graph attribute can only be chosen at creation time.
  #[error("graph charset is immutable")]
  ImmutableCharset,

  /// Configuration file or environment value is invalid.
  #[error("config error: {0}")]
  Config(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl GraphError {
  pub(crate) fn node_not_found(name: impl Into<String>) -> Self {
    Self::NotFound {
      kind: "node",
      name: name.into(),
    }
  }

  pub(crate) fn edge_not_found(tail: &str, head: &str, key: Option<&str>) -> Self {
    let name = match key {
      Some(k) => format!("{tail}-{head} (key {k})"),
      None => format!("{tail}-{head}"),
    };
    Self::NotFound { kind: "edge", name }
  }

  pub(crate) fn subgraph_not_found(name: impl Into<String>) -> Self {
    Self::NotFound {
      kind: "subgraph",
      name: name.into(),
    }
  }

  pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
    Self::Parse {
      line,
      message: message.into(),
    }
  }

  /// True for lookups of missing nodes, edges or subgraphs.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. })
  }
}
