//! In-memory graph engine.
//!
//! Stores one root graph with nested subgraphs, nodes and edges in index
//! arenas. Items live once, at the root; subgraphs record membership. Each
//! graph carries a per-scope default table: the root table holds every
//! registered attribute name, subgraph tables hold only local overrides and
//! inherit the rest from their parent. Nodes and edges hold only the values
//! explicitly set on them.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::encoder::Charset;
use crate::types::{AttributeScope, FindOrCreate, GraphKind};

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
  NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

pub(crate) type GraphId = usize;
pub(crate) type NodeId = usize;
pub(crate) type EdgeId = usize;

/// Index of the root graph.
pub(crate) const ROOT: GraphId = 0;

/// Prefix of engine-assigned names of anonymous subgraphs.
pub(crate) const ANONYMOUS_PREFIX: char = '%';

/// A node or an edge, for attribute access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Item {
  Node(NodeId),
  Edge(EdgeId),
}

impl Item {
  pub(crate) fn scope(self) -> AttributeScope {
    match self {
      Item::Node(_) => AttributeScope::Node,
      Item::Edge(_) => AttributeScope::Edge,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct GraphRec {
  pub(crate) name: String,
  pub(crate) parent: Option<GraphId>,
  pub(crate) subgraphs: Vec<GraphId>,
  nodes: Vec<NodeId>,
  node_set: HashSet<NodeId>,
  edges: Vec<EdgeId>,
  edge_set: HashSet<EdgeId>,
  defaults: [HashMap<String, String>; 3],
}

#[derive(Debug, Clone)]
pub(crate) struct NodeRec {
  pub(crate) name: String,
  out: Vec<EdgeId>,
  inn: Vec<EdgeId>,
  attrs: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeRec {
  pub(crate) tail: NodeId,
  pub(crate) head: NodeId,
  pub(crate) key: Option<String>,
  attrs: HashMap<String, String>,
}

/// Storage for one root graph and everything under it.
#[derive(Debug, Clone)]
pub(crate) struct Engine {
  epoch: u64,
  kind: GraphKind,
  graphs: Vec<Option<GraphRec>>,
  nodes: Vec<Option<NodeRec>>,
  edges: Vec<Option<EdgeRec>>,
  node_index: HashMap<String, NodeId>,
  declared: [Vec<String>; 3],
  anonymous: usize,
}

impl Engine {
  pub(crate) fn new(name: &str, kind: GraphKind) -> Self {
    Self {
      epoch: next_epoch(),
      kind,
      graphs: vec![Some(GraphRec {
        name: name.to_string(),
        ..GraphRec::default()
      })],
      nodes: Vec::new(),
      edges: Vec::new(),
      node_index: HashMap::new(),
      declared: Default::default(),
      anonymous: 0,
    }
  }

  /// Deep copy with a fresh identity.
  pub(crate) fn duplicate(&self) -> Self {
    let mut copy = self.clone();
    copy.epoch = next_epoch();
    copy
  }

  /// Identity of this storage; handles compare it to detect replacement.
  pub(crate) fn epoch(&self) -> u64 {
    self.epoch
  }

  pub(crate) fn kind(&self) -> GraphKind {
    self.kind
  }

  /// Charset named by the root `charset` attribute; UTF-8 when unset or unknown.
  pub(crate) fn charset(&self) -> Charset {
    self
      .local_default(ROOT, AttributeScope::Graph, "charset")
      .and_then(|c| c.parse::<Charset>().ok())
      .unwrap_or_default()
  }

  // ---- graphs ----

  pub(crate) fn graph(&self, g: GraphId) -> Option<&GraphRec> {
    self.graphs.get(g).and_then(Option::as_ref)
  }

  fn graph_mut(&mut self, g: GraphId) -> Option<&mut GraphRec> {
    self.graphs.get_mut(g).and_then(Option::as_mut)
  }

  pub(crate) fn contains_graph(&self, g: GraphId) -> bool {
    self.graph(g).is_some()
  }

  pub(crate) fn graph_name(&self, g: GraphId) -> &str {
    self.graph(g).map(|r| r.name.as_str()).unwrap_or_default()
  }

  /// True for the unnamed root and for subgraphs created without a name.
  pub(crate) fn is_anonymous(&self, g: GraphId) -> bool {
    let name = self.graph_name(g);
    if g == ROOT {
      name.is_empty()
    } else {
      name.starts_with(ANONYMOUS_PREFIX)
    }
  }

  pub(crate) fn parent(&self, g: GraphId) -> Option<GraphId> {
    self.graph(g).and_then(|r| r.parent)
  }

  /// `g` followed by its ancestors up to the root.
  fn lineage(&self, g: GraphId) -> Vec<GraphId> {
    let mut out = vec![g];
    let mut cur = g;
    while let Some(p) = self.parent(cur) {
      out.push(p);
      cur = p;
    }
    out
  }

  /// `g` followed by every subgraph nested under it.
  fn descendants(&self, g: GraphId) -> Vec<GraphId> {
    let mut out = vec![g];
    let mut i = 0;
    while i < out.len() {
      if let Some(rec) = self.graph(out[i]) {
        out.extend(rec.subgraphs.iter().copied());
      }
      i += 1;
    }
    out
  }

  pub(crate) fn subgraphs(&self, g: GraphId) -> &[GraphId] {
    self
      .graph(g)
      .map(|r| r.subgraphs.as_slice())
      .unwrap_or_default()
  }

  pub(crate) fn find_subgraph(&self, g: GraphId, name: &str) -> Option<GraphId> {
    self
      .subgraphs(g)
      .iter()
      .copied()
      .find(|&s| self.graph_name(s) == name)
  }

  /// Finds the named child of `g` or creates it; `None` creates an anonymous one.
  pub(crate) fn add_subgraph(&mut self, g: GraphId, name: Option<&str>) -> FindOrCreate<GraphId> {
    if let Some(existing) = name.and_then(|n| self.find_subgraph(g, n)) {
      return FindOrCreate::Found(existing);
    }
    let name = match name {
      Some(n) => n.to_string(),
      None => {
        self.anonymous += 1;
        format!("{ANONYMOUS_PREFIX}{}", self.anonymous)
      }
    };
    let id = self.graphs.len();
    self.graphs.push(Some(GraphRec {
      name,
      parent: Some(g),
      ..GraphRec::default()
    }));
    if let Some(parent) = self.graph_mut(g) {
      parent.subgraphs.push(id);
    }
    FindOrCreate::Created(id)
  }

  /// Drops `sub` and everything nested in it. Items stay in the parent.
  pub(crate) fn remove_subgraph(&mut self, sub: GraphId) {
    if sub == ROOT {
      return;
    }
    if let Some(p) = self.parent(sub)
      && let Some(parent) = self.graph_mut(p)
    {
      parent.subgraphs.retain(|&s| s != sub);
    }
    for d in self.descendants(sub) {
      self.graphs[d] = None;
    }
  }

  // ---- nodes ----

  pub(crate) fn node(&self, n: NodeId) -> Option<&NodeRec> {
    self.nodes.get(n).and_then(Option::as_ref)
  }

  pub(crate) fn node_name(&self, n: NodeId) -> &str {
    self.node(n).map(|r| r.name.as_str()).unwrap_or_default()
  }

  /// Looks up `name` among the nodes of `g`.
  pub(crate) fn find_node(&self, g: GraphId, name: &str) -> Option<NodeId> {
    let id = *self.node_index.get(name)?;
    self.node_in(g, id).then_some(id)
  }

  pub(crate) fn node_in(&self, g: GraphId, n: NodeId) -> bool {
    self.graph(g).is_some_and(|r| r.node_set.contains(&n))
  }

  pub(crate) fn nodes(&self, g: GraphId) -> &[NodeId] {
    self.graph(g).map(|r| r.nodes.as_slice()).unwrap_or_default()
  }

  pub(crate) fn node_count(&self, g: GraphId) -> usize {
    self.nodes(g).len()
  }

  /// Finds `name` in `g` or adds it there. A node that exists elsewhere in
  /// the root graph is reused and counts as found.
  pub(crate) fn add_node(&mut self, g: GraphId, name: &str) -> FindOrCreate<NodeId> {
    if let Some(&id) = self.node_index.get(name) {
      self.enlist_node(g, id);
      return FindOrCreate::Found(id);
    }
    let id = self.nodes.len();
    self.nodes.push(Some(NodeRec {
      name: name.to_string(),
      out: Vec::new(),
      inn: Vec::new(),
      attrs: HashMap::new(),
    }));
    self.node_index.insert(name.to_string(), id);
    self.enlist_node(g, id);
    self.inherit_creation_defaults(g, Item::Node(id));
    FindOrCreate::Created(id)
  }

  pub(crate) fn enlist_node(&mut self, g: GraphId, n: NodeId) {
    for l in self.lineage(g) {
      if let Some(rec) = self.graph_mut(l)
        && rec.node_set.insert(n)
      {
        rec.nodes.push(n);
      }
    }
  }

  /// Removes `n` from `g` and its subgraphs; from the root it is deleted.
  pub(crate) fn remove_node(&mut self, g: GraphId, n: NodeId) {
    let incident: Vec<EdgeId> = self
      .node(n)
      .map(|r| r.out.iter().chain(r.inn.iter()).copied().collect())
      .unwrap_or_default();
    for e in incident {
      if self.edge_in(g, e) {
        self.remove_edge(g, e);
      }
    }
    for d in self.descendants(g) {
      if let Some(rec) = self.graph_mut(d)
        && rec.node_set.remove(&n)
      {
        rec.nodes.retain(|&x| x != n);
      }
    }
    if g == ROOT
      && let Some(rec) = self.nodes[n].take()
    {
      self.node_index.remove(&rec.name);
    }
  }

  // ---- edges ----

  pub(crate) fn edge(&self, e: EdgeId) -> Option<&EdgeRec> {
    self.edges.get(e).and_then(Option::as_ref)
  }

  pub(crate) fn edge_in(&self, g: GraphId, e: EdgeId) -> bool {
    self.graph(g).is_some_and(|r| r.edge_set.contains(&e))
  }

  pub(crate) fn edge_count(&self, g: GraphId) -> usize {
    self.graph(g).map(|r| r.edges.len()).unwrap_or(0)
  }

  /// Out-edges of `n` that belong to `g`, in creation order.
  pub(crate) fn out_edges(&self, g: GraphId, n: NodeId) -> Vec<EdgeId> {
    self
      .node(n)
      .map(|r| {
        r.out
          .iter()
          .copied()
          .filter(|&e| self.edge_in(g, e))
          .collect()
      })
      .unwrap_or_default()
  }

  /// In-edges of `n` that belong to `g`, in creation order.
  pub(crate) fn in_edges(&self, g: GraphId, n: NodeId) -> Vec<EdgeId> {
    self
      .node(n)
      .map(|r| {
        r.inn
          .iter()
          .copied()
          .filter(|&e| self.edge_in(g, e))
          .collect()
      })
      .unwrap_or_default()
  }

  /// All edges of `g`, grouped by tail in node order.
  pub(crate) fn edges(&self, g: GraphId) -> Vec<EdgeId> {
    self
      .nodes(g)
      .iter()
      .flat_map(|&n| self.out_edges(g, n))
      .collect()
  }

  /// Finds an edge between `tail` and `head` in `g`. Undirected graphs match
  /// either orientation. Without a key any edge between the pair matches;
  /// strict graphs ignore keys.
  pub(crate) fn find_edge(
    &self,
    g: GraphId,
    tail: NodeId,
    head: NodeId,
    key: Option<&str>,
  ) -> Option<EdgeId> {
    let key = if self.kind.strict { None } else { key };
    let matches = |e: EdgeId| {
      self.edge(e).is_some_and(|r| {
        let forward = r.tail == tail && r.head == head;
        let backward = !self.kind.directed && r.tail == head && r.head == tail;
        (forward || backward) && key.is_none_or(|k| r.key.as_deref() == Some(k))
      })
    };
    let rec = self.node(tail)?;
    rec
      .out
      .iter()
      .chain(rec.inn.iter())
      .copied()
      .filter(|&e| self.edge_in(g, e))
      .find(|&e| matches(e))
  }

  /// Finds or creates the edge `tail`-`head` (with optional key) in `g`.
  ///
  /// Strict graphs never hold two edges between one pair: a repeat returns
  /// the existing edge. Non-strict graphs return an existing edge only for a
  /// matching key; unkeyed additions always create a parallel edge.
  pub(crate) fn add_edge(
    &mut self,
    g: GraphId,
    tail: NodeId,
    head: NodeId,
    key: Option<&str>,
  ) -> FindOrCreate<EdgeId> {
    self.enlist_node(g, tail);
    self.enlist_node(g, head);
    let existing = if self.kind.strict {
      self.find_edge(ROOT, tail, head, None)
    } else {
      key.and_then(|k| self.find_edge(ROOT, tail, head, Some(k)))
    };
    if let Some(e) = existing {
      self.enlist_edge(g, e);
      return FindOrCreate::Found(e);
    }
    let id = self.edges.len();
    self.edges.push(Some(EdgeRec {
      tail,
      head,
      key: key.map(str::to_string),
      attrs: HashMap::new(),
    }));
    if let Some(Some(t)) = self.nodes.get_mut(tail) {
      t.out.push(id);
    }
    if let Some(Some(h)) = self.nodes.get_mut(head) {
      h.inn.push(id);
    }
    self.enlist_edge(g, id);
    self.inherit_creation_defaults(g, Item::Edge(id));
    FindOrCreate::Created(id)
  }

  pub(crate) fn enlist_edge(&mut self, g: GraphId, e: EdgeId) {
    for l in self.lineage(g) {
      if let Some(rec) = self.graph_mut(l)
        && rec.edge_set.insert(e)
      {
        rec.edges.push(e);
      }
    }
  }

  /// Removes `e` from `g` and its subgraphs; from the root it is deleted.
  pub(crate) fn remove_edge(&mut self, g: GraphId, e: EdgeId) {
    for d in self.descendants(g) {
      if let Some(rec) = self.graph_mut(d)
        && rec.edge_set.remove(&e)
      {
        rec.edges.retain(|&x| x != e);
      }
    }
    if g == ROOT
      && let Some(rec) = self.edges[e].take()
    {
      if let Some(Some(t)) = self.nodes.get_mut(rec.tail) {
        t.out.retain(|&x| x != e);
      }
      if let Some(Some(h)) = self.nodes.get_mut(rec.head) {
        h.inn.retain(|&x| x != e);
      }
    }
  }

  // ---- default tables ----

  /// Registered names of `scope`, in registration order.
  pub(crate) fn declared(&self, scope: AttributeScope) -> &[String] {
    &self.declared[scope.index()]
  }

  pub(crate) fn is_declared(&self, scope: AttributeScope, name: &str) -> bool {
    self.declared[scope.index()].iter().any(|n| n == name)
  }

  /// Registers `name` with an empty root default. No-op when already known.
  pub(crate) fn register(&mut self, scope: AttributeScope, name: &str) {
    if self.is_declared(scope, name) {
      return;
    }
    self.declared[scope.index()].push(name.to_string());
    if let Some(root) = self.graph_mut(ROOT) {
      root.defaults[scope.index()].insert(name.to_string(), String::new());
    }
  }

  /// Value set on `g` itself for `name`, ignoring inheritance.
  pub(crate) fn local_default(&self, g: GraphId, scope: AttributeScope, name: &str) -> Option<&str> {
    self
      .graph(g)?
      .defaults[scope.index()]
      .get(name)
      .map(String::as_str)
  }

  /// Default of `name` as seen from `g`: the nearest table that sets it.
  pub(crate) fn default_value(&self, g: GraphId, scope: AttributeScope, name: &str) -> Option<&str> {
    self
      .lineage(g)
      .into_iter()
      .find_map(|l| self.local_default(l, scope, name))
  }

  pub(crate) fn set_default(&mut self, g: GraphId, scope: AttributeScope, name: &str, value: &str) {
    self.register(scope, name);
    if let Some(rec) = self.graph_mut(g) {
      rec.defaults[scope.index()].insert(name.to_string(), value.to_string());
    }
  }

  /// Every registered name of `scope` with its default as seen from `g`.
  pub(crate) fn defaults(&self, g: GraphId, scope: AttributeScope) -> Vec<(String, String)> {
    self
      .declared(scope)
      .iter()
      .map(|n| {
        let v = self.default_value(g, scope, n).unwrap_or_default();
        (n.clone(), v.to_string())
      })
      .collect()
  }

  /// Entries of `g`'s own table for `scope`, in registration order.
  pub(crate) fn local_defaults(&self, g: GraphId, scope: AttributeScope) -> Vec<(&str, &str)> {
    self
      .declared(scope)
      .iter()
      .filter_map(|n| {
        self
          .local_default(g, scope, n)
          .map(|v| (n.as_str(), v))
      })
      .collect()
  }

  /// Before a root default changes, items that rely on it keep their value.
  pub(crate) fn pin_current_default(&mut self, scope: AttributeScope, name: &str) {
    let current = self
      .local_default(ROOT, scope, name)
      .unwrap_or_default()
      .to_string();
    match scope {
      AttributeScope::Node => {
        for rec in self.nodes.iter_mut().flatten() {
          rec
            .attrs
            .entry(name.to_string())
            .or_insert_with(|| current.clone());
        }
      }
      AttributeScope::Edge => {
        for rec in self.edges.iter_mut().flatten() {
          rec
            .attrs
            .entry(name.to_string())
            .or_insert_with(|| current.clone());
        }
      }
      AttributeScope::Graph => {}
    }
  }

  /// Items created inside a subgraph take that subgraph's defaults.
  fn inherit_creation_defaults(&mut self, g: GraphId, item: Item) {
    if g == ROOT {
      return;
    }
    let scope = item.scope();
    let inherited: Vec<(String, String)> = self
      .declared(scope)
      .iter()
      .filter_map(|n| {
        let here = self.default_value(g, scope, n)?;
        let root = self.local_default(ROOT, scope, n).unwrap_or_default();
        (here != root).then(|| (n.clone(), here.to_string()))
      })
      .collect();
    if let Some(attrs) = self.item_attrs_mut(item) {
      for (k, v) in inherited {
        attrs.entry(k).or_insert(v);
      }
    }
  }

  // ---- item attributes ----

  fn item_attrs(&self, item: Item) -> Option<&HashMap<String, String>> {
    match item {
      Item::Node(n) => self.node(n).map(|r| &r.attrs),
      Item::Edge(e) => self.edge(e).map(|r| &r.attrs),
    }
  }

  fn item_attrs_mut(&mut self, item: Item) -> Option<&mut HashMap<String, String>> {
    match item {
      Item::Node(n) => self.nodes.get_mut(n).and_then(Option::as_mut).map(|r| &mut r.attrs),
      Item::Edge(e) => self.edges.get_mut(e).and_then(Option::as_mut).map(|r| &mut r.attrs),
    }
  }

  pub(crate) fn contains_item(&self, item: Item) -> bool {
    self.item_attrs(item).is_some()
  }

  /// Explicit value on `item`, if any.
  pub(crate) fn item_override(&self, item: Item, name: &str) -> Option<&str> {
    self.item_attrs(item)?.get(name).map(String::as_str)
  }

  /// Writes an explicit value on `item`, registering the name first.
  pub(crate) fn set_item_attr(&mut self, item: Item, name: &str, value: &str) {
    self.register(item.scope(), name);
    if let Some(attrs) = self.item_attrs_mut(item) {
      attrs.insert(name.to_string(), value.to_string());
    }
  }

  /// Current value of `name` on `item`: its override, else the root default.
  pub(crate) fn item_value(&self, item: Item, name: &str) -> String {
    self
      .item_override(item, name)
      .or_else(|| self.local_default(ROOT, item.scope(), name))
      .unwrap_or_default()
      .to_string()
  }

  /// Attributes of `item` whose value differs from the defaults seen from `g`.
  pub(crate) fn non_default_attrs(&self, g: GraphId, item: Item) -> Vec<(String, String)> {
    let scope = item.scope();
    self
      .declared(scope)
      .iter()
      .filter_map(|n| {
        let value = self.item_value(item, n);
        let default = self.default_value(g, scope, n).unwrap_or_default();
        (value != default).then(|| (n.clone(), value))
      })
      .collect()
  }
}
