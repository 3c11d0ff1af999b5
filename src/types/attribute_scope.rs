//! Which default table an attribute resolves against.

use std::fmt;

/// Scope of an attribute: graph, node or edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeScope {
  Graph,
  Node,
  Edge,
}

impl AttributeScope {
  /// All scopes, in the order their default statements are written.
  pub const ALL: [AttributeScope; 3] = [
    AttributeScope::Graph,
    AttributeScope::Node,
    AttributeScope::Edge,
  ];

  /// Index into per-scope tables.
  pub(crate) fn index(self) -> usize {
    match self {
      AttributeScope::Graph => 0,
      AttributeScope::Node => 1,
      AttributeScope::Edge => 2,
    }
  }

  /// DOT keyword of the default statement for this scope.
  pub fn keyword(self) -> &'static str {
    match self {
      AttributeScope::Graph => "graph",
      AttributeScope::Node => "node",
      AttributeScope::Edge => "edge",
    }
  }
}

impl fmt::Display for AttributeScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.keyword())
  }
}
