//! Strictness and direction of a graph.

/// Strict graphs reject parallel edges; directed graphs use `->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphKind {
  pub strict: bool,
  pub directed: bool,
}

impl GraphKind {
  pub fn new(strict: bool, directed: bool) -> Self {
    Self { strict, directed }
  }

  /// DOT keyword for the graph header.
  pub fn keyword(&self) -> &'static str {
    if self.directed { "digraph" } else { "graph" }
  }

  /// DOT edge operator.
  pub fn edge_op(&self) -> &'static str {
    if self.directed { "->" } else { "--" }
  }
}

impl Default for GraphKind {
  fn default() -> Self {
    Self {
      strict: true,
      directed: false,
    }
  }
}
