//! The public graph type.
//!
//! A [`Graph`] either owns its storage (created with [`Graph::new`], parsed
//! from text, or returned by `copy`-like operations) or is a view onto a
//! graph owned elsewhere (subgraphs, `parent`, `root`). Views share the
//! owner's storage; closing them does nothing.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, instrument};

use crate::attributes::AttributeStore;
use crate::dot_parser::parse_dot;
use crate::dot_writer::write_dot;
use crate::encoder::{Charset, decode_dot};
use crate::engine::{EdgeId, Engine, GraphId, Item, NodeId, ROOT};
use crate::error::{GraphError, Result};
use crate::handle::GraphHandle;
use crate::item::{Edge, Node};
use crate::types::{AttributeScope, FindOrCreate, GraphKind, LayoutState};

/// How a new graph is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
  pub name: String,
  pub strict: bool,
  pub directed: bool,
  pub charset: Charset,
}

impl Default for GraphOptions {
  fn default() -> Self {
    Self {
      name: String::new(),
      strict: true,
      directed: false,
      charset: Charset::Utf8,
    }
  }
}

impl GraphOptions {
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn strict(mut self, strict: bool) -> Self {
    self.strict = strict;
    self
  }

  pub fn directed(mut self, directed: bool) -> Self {
    self.directed = directed;
    self
  }

  pub fn charset(mut self, charset: Charset) -> Self {
    self.charset = charset;
    self
  }
}

type EdgeParts = (EdgeId, String, String, Option<String>);

fn edge_parts(e: &Engine, id: EdgeId) -> Option<EdgeParts> {
  let rec = e.edge(id)?;
  Some((
    id,
    e.node_name(rec.tail).to_string(),
    e.node_name(rec.head).to_string(),
    rec.key.clone(),
  ))
}

fn no_attrs() -> std::iter::Empty<(&'static str, &'static str)> {
  std::iter::empty()
}

/// An attributed graph with nested subgraphs.
#[derive(Debug)]
pub struct Graph {
  handle: GraphHandle,
  graph_attr: AttributeStore,
  node_attr: AttributeStore,
  edge_attr: AttributeStore,
  layout_state: LayoutState,
}

impl Default for Graph {
  fn default() -> Self {
    Self::new(GraphOptions::default())
  }
}

impl Graph {
  /// Creates an empty graph.
  pub fn new(options: GraphOptions) -> Self {
    let mut engine = Engine::new(
      &options.name,
      GraphKind::new(options.strict, options.directed),
    );
    if options.charset != Charset::default() {
      engine.set_default(ROOT, AttributeScope::Graph, "charset", options.charset.name());
    }
    Self::from_engine(engine)
  }

  pub(crate) fn from_engine(engine: Engine) -> Self {
    Self::from_handle(GraphHandle::owned(engine))
  }

  fn from_handle(handle: GraphHandle) -> Self {
    Self {
      graph_attr: AttributeStore::new(handle.view(), AttributeScope::Graph),
      node_attr: AttributeStore::new(handle.view(), AttributeScope::Node),
      edge_attr: AttributeStore::new(handle.view(), AttributeScope::Edge),
      handle,
      layout_state: LayoutState::NoLayout,
    }
  }

  /// Parses DOT text.
  #[instrument(level = "trace", skip(text))]
  pub fn from_string(text: &str) -> Result<Self> {
    Ok(Self::from_engine(parse_dot(text)?))
  }

  /// Parses DOT bytes, decoding them with the charset the text declares.
  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let (text, charset) = decode_dot(bytes)?;
    debug!(%charset, "decoded graph text");
    Self::from_string(&text)
  }

  /// Builds a graph from `node -> neighbours` pairs. Nodes without
  /// neighbours are added on their own.
  pub fn from_adjacency<I, K, N, V>(adjacency: I, options: GraphOptions) -> Result<Self>
  where
    I: IntoIterator<Item = (K, N)>,
    K: ToString,
    N: IntoIterator<Item = V>,
    V: ToString,
  {
    let graph = Self::new(options);
    for (node, neighbours) in adjacency {
      let node = node.to_string();
      graph.add_node(&node)?;
      for nbr in neighbours {
        graph.add_edge(&node, nbr)?;
      }
    }
    Ok(graph)
  }

  fn view_of(&self, g: GraphId) -> Graph {
    Self::from_handle(self.handle.view_of(g))
  }

  /// Swaps the storage behind this graph. A view becomes an owner.
  pub(crate) fn replace_engine(&mut self, engine: Engine) {
    self.handle.replace(engine);
    self.graph_attr = AttributeStore::new(self.handle.view(), AttributeScope::Graph);
    self.node_attr = AttributeStore::new(self.handle.view(), AttributeScope::Node);
    self.edge_attr = AttributeStore::new(self.handle.view(), AttributeScope::Edge);
  }

  fn try_write<R>(&self, f: impl FnOnce(&mut Engine, GraphId) -> Result<R>) -> Result<R> {
    self.handle.write(f)?
  }

  fn try_read<R>(&self, f: impl FnOnce(&Engine, GraphId) -> Result<R>) -> Result<R> {
    self.handle.read(f)?
  }

  fn node_of(&self, id: NodeId, name: String) -> Node {
    Node::new(self.handle.view_of(ROOT), id, name)
  }

  fn edge_of(&self, (id, tail, head, key): EdgeParts) -> Edge {
    Edge::new(self.handle.view_of(ROOT), id, tail, head, key)
  }

  fn lookup_node(e: &Engine, g: GraphId, name: &str) -> Result<NodeId> {
    e.find_node(g, name)
      .ok_or_else(|| GraphError::node_not_found(name))
  }

  fn lookup_edge(e: &Engine, g: GraphId, u: &str, v: &str, key: Option<&str>) -> Result<EdgeId> {
    let missing = || GraphError::edge_not_found(u, v, key);
    let tail = e.find_node(g, u).ok_or_else(missing)?;
    let head = e.find_node(g, v).ok_or_else(missing)?;
    e.find_edge(g, tail, head, key).ok_or_else(missing)
  }

  // ---- graph properties ----

  /// Graph name; engine-assigned (`%N`) for anonymous subgraphs.
  pub fn name(&self) -> Result<String> {
    self.handle.read(|e, g| e.graph_name(g).to_string())
  }

  pub fn kind(&self) -> Result<GraphKind> {
    self.handle.read(|e, _| e.kind())
  }

  pub fn is_strict(&self) -> Result<bool> {
    Ok(self.kind()?.strict)
  }

  pub fn is_directed(&self) -> Result<bool> {
    Ok(self.kind()?.directed)
  }

  pub fn charset(&self) -> Result<Charset> {
    self.handle.read(|e, _| e.charset())
  }

  /// Graph attributes: this graph's own values, inherited by subgraphs.
  pub fn graph_attr(&self) -> &AttributeStore {
    &self.graph_attr
  }

  /// Node defaults of this graph.
  pub fn node_attr(&self) -> &AttributeStore {
    &self.node_attr
  }

  /// Edge defaults of this graph.
  pub fn edge_attr(&self) -> &AttributeStore {
    &self.edge_attr
  }

  pub fn layout_state(&self) -> LayoutState {
    self.layout_state
  }

  pub(crate) fn set_layout_state(&mut self, state: LayoutState) {
    self.layout_state = state;
  }

  // ---- nodes ----

  /// Adds node `n`, or finds it when it already exists.
  pub fn add_node(&self, n: impl ToString) -> Result<FindOrCreate<Node>> {
    self.add_node_with(n, no_attrs())
  }

  /// Adds node `n` and sets `attrs` on it, whether it was found or created.
  pub fn add_node_with<K, V>(
    &self,
    n: impl ToString,
    attrs: impl IntoIterator<Item = (K, V)>,
  ) -> Result<FindOrCreate<Node>>
  where
    K: AsRef<str>,
    V: ToString,
  {
    let name = n.to_string();
    let attrs: Vec<(String, String)> = attrs
      .into_iter()
      .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
      .collect();
    let outcome = self.try_write(|e, g| {
      let charset = e.charset();
      charset.encode(&name)?;
      for (_, v) in &attrs {
        charset.encode(v)?;
      }
      let outcome = e.add_node(g, &name);
      let id = *outcome.get();
      for (k, v) in &attrs {
        e.set_item_attr(Item::Node(id), k, v);
      }
      Ok(outcome)
    })?;
    Ok(outcome.map(|id| self.node_of(id, name)))
  }

  pub fn add_nodes_from<I>(&self, nodes: I) -> Result<()>
  where
    I: IntoIterator,
    I::Item: ToString,
  {
    for n in nodes {
      self.add_node(n)?;
    }
    Ok(())
  }

  /// Removes `n` from this graph. From the root graph the node and its
  /// edges are deleted; from a subgraph they stay in the parent.
  pub fn remove_node(&self, n: impl ToString) -> Result<()> {
    let name = n.to_string();
    self.try_write(|e, g| {
      let id = Self::lookup_node(e, g, &name)?;
      e.remove_node(g, id);
      Ok(())
    })
  }

  pub fn remove_nodes_from<I>(&self, nodes: I) -> Result<()>
  where
    I: IntoIterator,
    I::Item: ToString,
  {
    for n in nodes {
      self.remove_node(n)?;
    }
    Ok(())
  }

  pub fn get_node(&self, n: impl ToString) -> Result<Node> {
    let name = n.to_string();
    let id = self.try_read(|e, g| Self::lookup_node(e, g, &name))?;
    Ok(self.node_of(id, name))
  }

  pub fn has_node(&self, n: impl ToString) -> Result<bool> {
    let name = n.to_string();
    self.handle.read(|e, g| e.find_node(g, &name).is_some())
  }

  pub fn nodes(&self) -> Result<Vec<Node>> {
    let ids: Vec<(NodeId, String)> = self.handle.read(|e, g| {
      e.nodes(g)
        .iter()
        .map(|&n| (n, e.node_name(n).to_string()))
        .collect()
    })?;
    Ok(ids.into_iter().map(|(id, name)| self.node_of(id, name)).collect())
  }

  pub fn number_of_nodes(&self) -> Result<usize> {
    self.handle.read(|e, g| e.node_count(g))
  }

  // ---- edges ----

  /// Adds edge `u`-`v`, creating missing endpoints.
  pub fn add_edge(&self, u: impl ToString, v: impl ToString) -> Result<FindOrCreate<Edge>> {
    self.add_edge_with(u, v, None, no_attrs())
  }

  /// Adds edge `u`-`v` with an optional key and sets `attrs` on it.
  ///
  /// Strict graphs return the existing edge between the pair, ignoring the
  /// key. Non-strict graphs return an existing edge only when `key` names
  /// one; otherwise a parallel edge is created.
  pub fn add_edge_with<K, V>(
    &self,
    u: impl ToString,
    v: impl ToString,
    key: Option<&str>,
    attrs: impl IntoIterator<Item = (K, V)>,
  ) -> Result<FindOrCreate<Edge>>
  where
    K: AsRef<str>,
    V: ToString,
  {
    let (u, v) = (u.to_string(), v.to_string());
    let attrs: Vec<(String, String)> = attrs
      .into_iter()
      .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
      .collect();
    let outcome = self.try_write(|e, g| {
      let charset = e.charset();
      for text in [u.as_str(), v.as_str()].into_iter().chain(key) {
        charset.encode(text)?;
      }
      for (_, val) in &attrs {
        charset.encode(val)?;
      }
      let tail = e.add_node(g, &u).into_inner();
      let head = e.add_node(g, &v).into_inner();
      let outcome = e.add_edge(g, tail, head, key);
      let id = *outcome.get();
      for (k, val) in &attrs {
        e.set_item_attr(Item::Edge(id), k, val);
      }
      Ok(outcome.map(|id| edge_parts(e, id)))
    })?;
    match outcome {
      FindOrCreate::Found(Some(parts)) => Ok(FindOrCreate::Found(self.edge_of(parts))),
      FindOrCreate::Created(Some(parts)) => Ok(FindOrCreate::Created(self.edge_of(parts))),
      _ => Err(GraphError::edge_not_found(&u, &v, key)),
    }
  }

  pub fn add_edges_from<I, U, V>(&self, edges: I) -> Result<()>
  where
    I: IntoIterator<Item = (U, V)>,
    U: ToString,
    V: ToString,
  {
    for (u, v) in edges {
      self.add_edge(u, v)?;
    }
    Ok(())
  }

  /// Removes edge `u`-`v`; with a key only the edge carrying that key.
  pub fn remove_edge(&self, u: impl ToString, v: impl ToString, key: Option<&str>) -> Result<()> {
    let (u, v) = (u.to_string(), v.to_string());
    self.try_write(|e, g| {
      let id = Self::lookup_edge(e, g, &u, &v, key)?;
      e.remove_edge(g, id);
      Ok(())
    })
  }

  /// The edge `u`-`v`; without a key the first one between the pair.
  pub fn get_edge(&self, u: impl ToString, v: impl ToString, key: Option<&str>) -> Result<Edge> {
    let (u, v) = (u.to_string(), v.to_string());
    let parts = self.try_read(|e, g| {
      let id = Self::lookup_edge(e, g, &u, &v, key)?;
      edge_parts(e, id).ok_or_else(|| GraphError::edge_not_found(&u, &v, key))
    })?;
    Ok(self.edge_of(parts))
  }

  pub fn has_edge(&self, u: impl ToString, v: impl ToString, key: Option<&str>) -> Result<bool> {
    let (u, v) = (u.to_string(), v.to_string());
    self.handle.read(|e, g| Self::lookup_edge(e, g, &u, &v, key).is_ok())
  }

  fn collect_edges(&self, f: impl FnOnce(&Engine, GraphId) -> Result<Vec<EdgeId>>) -> Result<Vec<Edge>> {
    let parts: Vec<EdgeParts> = self.try_read(|e, g| {
      Ok(f(e, g)?.into_iter().filter_map(|id| edge_parts(e, id)).collect())
    })?;
    Ok(parts.into_iter().map(|p| self.edge_of(p)).collect())
  }

  pub fn edges(&self) -> Result<Vec<Edge>> {
    self.collect_edges(|e, g| Ok(e.edges(g)))
  }

  /// Edges leaving `n`; every incident edge in an undirected graph.
  pub fn out_edges(&self, n: impl ToString) -> Result<Vec<Edge>> {
    let name = n.to_string();
    self.collect_edges(|e, g| {
      let id = Self::lookup_node(e, g, &name)?;
      Ok(Self::incident(e, g, id, true))
    })
  }

  /// Edges entering `n`; every incident edge in an undirected graph.
  pub fn in_edges(&self, n: impl ToString) -> Result<Vec<Edge>> {
    let name = n.to_string();
    self.collect_edges(|e, g| {
      let id = Self::lookup_node(e, g, &name)?;
      Ok(Self::incident(e, g, id, false))
    })
  }

  fn incident(e: &Engine, g: GraphId, n: NodeId, outgoing: bool) -> Vec<EdgeId> {
    if !e.kind().directed {
      let mut seen = HashSet::new();
      return e
        .out_edges(g, n)
        .into_iter()
        .chain(e.in_edges(g, n))
        .filter(|id| seen.insert(*id))
        .collect();
    }
    if outgoing {
      e.out_edges(g, n)
    } else {
      e.in_edges(g, n)
    }
  }

  pub fn number_of_edges(&self) -> Result<usize> {
    self.handle.read(|e, g| e.edge_count(g))
  }

  /// Adds edges along consecutive pairs of `nodes`.
  pub fn add_path<I>(&self, nodes: I) -> Result<()>
  where
    I: IntoIterator,
    I::Item: ToString,
  {
    let names: Vec<String> = nodes.into_iter().map(|n| n.to_string()).collect();
    if let [only] = names.as_slice() {
      self.add_node(only)?;
    }
    for pair in names.windows(2) {
      self.add_edge(&pair[0], &pair[1])?;
    }
    Ok(())
  }

  /// Adds a path through `nodes` closed back to the first node.
  pub fn add_cycle<I>(&self, nodes: I) -> Result<()>
  where
    I: IntoIterator,
    I::Item: ToString,
  {
    let mut names: Vec<String> = nodes.into_iter().map(|n| n.to_string()).collect();
    if let Some(first) = names.first().cloned() {
      names.push(first);
    }
    self.add_path(names)
  }

  // ---- adjacency ----

  fn adjacent(&self, n: &str, outgoing: Option<bool>) -> Result<Vec<Node>> {
    let found: Vec<(NodeId, String)> = self.try_read(|e, g| {
      let id = Self::lookup_node(e, g, n)?;
      let directed = e.kind().directed;
      let edges = match outgoing {
        Some(out) if directed => Self::incident(e, g, id, out),
        _ => {
          let mut all = e.out_edges(g, id);
          all.extend(e.in_edges(g, id));
          all
        }
      };
      let mut seen = HashSet::new();
      Ok(
        edges
          .into_iter()
          .filter_map(|edge| e.edge(edge))
          .map(|rec| if rec.tail == id { rec.head } else { rec.tail })
          .filter(|other| seen.insert(*other))
          .map(|other| (other, e.node_name(other).to_string()))
          .collect(),
      )
    })?;
    Ok(found.into_iter().map(|(id, name)| self.node_of(id, name)).collect())
  }

  /// Nodes sharing an edge with `n`, each listed once.
  pub fn neighbors(&self, n: impl ToString) -> Result<Vec<Node>> {
    self.adjacent(&n.to_string(), None)
  }

  /// Heads of edges leaving `n`; neighbours in an undirected graph.
  pub fn successors(&self, n: impl ToString) -> Result<Vec<Node>> {
    self.adjacent(&n.to_string(), Some(true))
  }

  /// Tails of edges entering `n`; neighbours in an undirected graph.
  pub fn predecessors(&self, n: impl ToString) -> Result<Vec<Node>> {
    self.adjacent(&n.to_string(), Some(false))
  }

  /// Number of edge ends at `n`; a self-loop counts twice.
  pub fn degree(&self, n: impl ToString) -> Result<usize> {
    let name = n.to_string();
    self.try_read(|e, g| {
      let id = Self::lookup_node(e, g, &name)?;
      Ok(e.out_edges(g, id).len() + e.in_edges(g, id).len())
    })
  }

  /// Edges entering `n`; the degree in an undirected graph.
  pub fn in_degree(&self, n: impl ToString) -> Result<usize> {
    let name = n.to_string();
    if !self.is_directed()? {
      return self.degree(name);
    }
    self.try_read(|e, g| Ok(e.in_edges(g, Self::lookup_node(e, g, &name)?).len()))
  }

  /// Edges leaving `n`; the degree in an undirected graph.
  pub fn out_degree(&self, n: impl ToString) -> Result<usize> {
    let name = n.to_string();
    if !self.is_directed()? {
      return self.degree(name);
    }
    self.try_read(|e, g| Ok(e.out_edges(g, Self::lookup_node(e, g, &name)?).len()))
  }

  // ---- subgraphs ----

  /// Adds a subgraph holding `nodes` and every edge of this graph between
  /// them. An existing subgraph of the same name is reused.
  pub fn add_subgraph<I, K, V>(
    &self,
    nodes: I,
    name: Option<&str>,
    attrs: impl IntoIterator<Item = (K, V)>,
  ) -> Result<Graph>
  where
    I: IntoIterator,
    I::Item: ToString,
    K: AsRef<str>,
    V: ToString,
  {
    let names: Vec<String> = nodes.into_iter().map(|n| n.to_string()).collect();
    let sub = self.try_write(|e, g| {
      let charset = e.charset();
      for text in names.iter().map(String::as_str).chain(name) {
        charset.encode(text)?;
      }
      let sub = e.add_subgraph(g, name).into_inner();
      let members: HashSet<NodeId> = names
        .iter()
        .map(|n| e.add_node(sub, n).into_inner())
        .collect();
      for edge in e.edges(g) {
        if let Some(rec) = e.edge(edge)
          && members.contains(&rec.tail)
          && members.contains(&rec.head)
        {
          e.enlist_edge(sub, edge);
        }
      }
      Ok(sub)
    })?;
    let view = self.view_of(sub);
    view.graph_attr.update(attrs)?;
    Ok(view)
  }

  pub fn get_subgraph(&self, name: &str) -> Result<Graph> {
    let sub = self.try_read(|e, g| {
      e.find_subgraph(g, name)
        .ok_or_else(|| GraphError::subgraph_not_found(name))
    })?;
    Ok(self.view_of(sub))
  }

  /// Removes the named subgraph; its nodes and edges stay in this graph.
  pub fn remove_subgraph(&self, name: &str) -> Result<()> {
    self.try_write(|e, g| {
      let sub = e
        .find_subgraph(g, name)
        .ok_or_else(|| GraphError::subgraph_not_found(name))?;
      e.remove_subgraph(sub);
      Ok(())
    })
  }

  pub fn subgraphs(&self) -> Result<Vec<Graph>> {
    let subs = self.handle.read(|e, g| e.subgraphs(g).to_vec())?;
    Ok(subs.into_iter().map(|s| self.view_of(s)).collect())
  }

  /// Enclosing graph; `None` for the root.
  pub fn parent(&self) -> Result<Option<Graph>> {
    let parent = self.handle.read(|e, g| e.parent(g))?;
    Ok(parent.map(|p| self.view_of(p)))
  }

  pub fn root(&self) -> Result<Graph> {
    self.handle.read(|_, _| ())?;
    Ok(self.view_of(ROOT))
  }

  // ---- lifecycle ----

  /// Releases the storage if this graph owns it. Views are unaffected.
  pub fn close(&mut self) {
    self.handle.close();
    self.layout_state = LayoutState::NoLayout;
  }

  pub fn is_closed(&self) -> bool {
    self.handle.is_closed()
  }

  /// True for graphs that own their storage, false for views.
  pub fn is_owned(&self) -> bool {
    self.handle.is_owned()
  }

  /// Empties the graph: nodes, edges, subgraphs and all attribute tables.
  /// Name, kind and charset are kept.
  pub fn clear(&mut self) -> Result<()> {
    let fresh = self.try_read(|e, g| {
      let name = if e.is_anonymous(g) { "" } else { e.graph_name(g) };
      let mut fresh = Engine::new(name, e.kind());
      let charset = e.charset();
      if charset != Charset::default() {
        fresh.set_default(ROOT, AttributeScope::Graph, "charset", charset.name());
      }
      Ok(fresh)
    })?;
    self.replace_engine(fresh);
    self.layout_state = LayoutState::NoLayout;
    Ok(())
  }

  /// Independent deep copy. A subgraph copies into a new root graph.
  pub fn copy(&self) -> Result<Graph> {
    let engine = self.try_read(|e, g| {
      if g == ROOT {
        Ok(e.duplicate())
      } else {
        parse_dot(&write_dot(e, g))
      }
    })?;
    let mut copy = Self::from_engine(engine);
    copy.layout_state = self.layout_state;
    Ok(copy)
  }

  fn rebuild(&self, kind: GraphKind, reverse: bool) -> Result<Graph> {
    let engine = self.handle.read(|e, g| {
      let name = if e.is_anonymous(g) { "" } else { e.graph_name(g) };
      let mut out = Engine::new(name, kind);
      for scope in AttributeScope::ALL {
        for (k, v) in e.defaults(g, scope) {
          out.set_default(ROOT, scope, &k, &v);
        }
      }
      for &n in e.nodes(g) {
        let id = out.add_node(ROOT, e.node_name(n)).into_inner();
        for (k, v) in e.non_default_attrs(g, Item::Node(n)) {
          out.set_item_attr(Item::Node(id), &k, &v);
        }
      }
      for edge in e.edges(g) {
        let Some(rec) = e.edge(edge) else { continue };
        let (t, h) = if reverse {
          (rec.head, rec.tail)
        } else {
          (rec.tail, rec.head)
        };
        let tail = out.add_node(ROOT, e.node_name(t)).into_inner();
        let head = out.add_node(ROOT, e.node_name(h)).into_inner();
        let id = out.add_edge(ROOT, tail, head, rec.key.as_deref()).into_inner();
        for (k, v) in e.non_default_attrs(g, Item::Edge(edge)) {
          out.set_item_attr(Item::Edge(id), &k, &v);
        }
      }
      out
    })?;
    Ok(Self::from_engine(engine))
  }

  /// Copy with every edge reversed; a plain copy for undirected graphs.
  pub fn reverse(&self) -> Result<Graph> {
    let kind = self.kind()?;
    if !kind.directed {
      return self.copy();
    }
    self.rebuild(kind, true)
  }

  /// Directed copy of this graph. Subgraphs are not carried over.
  pub fn to_directed(&self) -> Result<Graph> {
    let kind = self.kind()?;
    self.rebuild(GraphKind::new(kind.strict, true), false)
  }

  /// Undirected copy of this graph. Subgraphs are not carried over.
  pub fn to_undirected(&self) -> Result<Graph> {
    let kind = self.kind()?;
    self.rebuild(GraphKind::new(kind.strict, false), false)
  }

  // ---- text ----

  /// DOT text of this graph.
  pub fn to_dot_string(&self) -> Result<String> {
    self.handle.read(write_dot)
  }

  /// DOT text encoded with the graph charset.
  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    self.try_read(|e, g| e.charset().encode(&write_dot(e, g)))
  }
}

impl fmt::Display for Graph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.to_dot_string() {
      Ok(text) => f.write_str(&text),
      Err(_) => Ok(()),
    }
  }
}

impl PartialEq for Graph {
  /// Graphs are equal when they serialize to the same text.
  fn eq(&self, other: &Self) -> bool {
    match (self.to_dot_string(), other.to_dot_string()) {
      (Ok(a), Ok(b)) => a == b,
      _ => false,
    }
  }
}
