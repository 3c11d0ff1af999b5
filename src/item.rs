//! Node and edge handles returned by [`Graph`](crate::Graph) lookups.

use std::fmt;

use crate::attributes::ItemAttributeView;
use crate::engine::{EdgeId, Item, NodeId};
use crate::handle::GraphHandle;

/// A node of a graph, named by its identifier.
#[derive(Debug)]
pub struct Node {
  handle: GraphHandle,
  id: NodeId,
  name: String,
}

impl Node {
  pub(crate) fn new(handle: GraphHandle, id: NodeId, name: String) -> Self {
    Self { handle, id, name }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Attributes of this node, falling back to the graph's node defaults.
  pub fn attr(&self) -> ItemAttributeView {
    ItemAttributeView::new(self.handle.view(), Item::Node(self.id), self.name.clone())
  }
}

impl fmt::Display for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

impl PartialEq for Node {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl PartialEq<str> for Node {
  fn eq(&self, other: &str) -> bool {
    self.name == other
  }
}

impl PartialEq<&str> for Node {
  fn eq(&self, other: &&str) -> bool {
    self.name == *other
  }
}

/// An edge between two nodes, with an optional key for parallel edges.
#[derive(Debug)]
pub struct Edge {
  handle: GraphHandle,
  id: EdgeId,
  tail: String,
  head: String,
  key: Option<String>,
}

impl Edge {
  pub(crate) fn new(
    handle: GraphHandle,
    id: EdgeId,
    tail: String,
    head: String,
    key: Option<String>,
  ) -> Self {
    Self {
      handle,
      id,
      tail,
      head,
      key,
    }
  }

  pub fn tail(&self) -> &str {
    &self.tail
  }

  pub fn head(&self) -> &str {
    &self.head
  }

  pub fn key(&self) -> Option<&str> {
    self.key.as_deref()
  }

  /// `(tail, head)` as owned strings.
  pub fn endpoints(&self) -> (String, String) {
    (self.tail.clone(), self.head.clone())
  }

  /// Attributes of this edge, falling back to the graph's edge defaults.
  pub fn attr(&self) -> ItemAttributeView {
    let label = match &self.key {
      Some(k) => format!("{}-{} (key {k})", self.tail, self.head),
      None => format!("{}-{}", self.tail, self.head),
    };
    ItemAttributeView::new(self.handle.view(), Item::Edge(self.id), label)
  }
}

impl fmt::Display for Edge {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.key {
      Some(k) => write!(f, "({}, {}, {k})", self.tail, self.head),
      None => write!(f, "({}, {})", self.tail, self.head),
    }
  }
}

impl PartialEq for Edge {
  fn eq(&self, other: &Self) -> bool {
    self.tail == other.tail && self.head == other.head && self.key == other.key
  }
}
