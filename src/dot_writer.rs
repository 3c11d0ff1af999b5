//! DOT writer.
//!
//! Produces canonical text: default statements first, then subgraphs, then
//! nodes and edges. A node gets its own statement only when it has no edges
//! at that level or carries non-default attributes; items that belong to a
//! subgraph are written inside it.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write;

use tracing::instrument;

use crate::engine::{EdgeId, Engine, GraphId, Item, NodeId, ROOT};
use crate::types::AttributeScope;

const KEYWORDS: [&str; 6] = ["strict", "graph", "digraph", "node", "edge", "subgraph"];

fn is_keyword(s: &str) -> bool {
  KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s))
}

fn is_id(s: &str) -> bool {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) if c.is_ascii_digit() => false,
    Some(c) if c == '_' || c.is_alphabetic() || !c.is_ascii() => {
      chars.all(|c| c == '_' || c.is_alphanumeric() || !c.is_ascii())
    }
    _ => false,
  }
}

/// Matches `-?(\.[0-9]+|[0-9]+(\.[0-9]*)?)`.
fn is_numeral(s: &str) -> bool {
  let s = s.strip_prefix('-').unwrap_or(s);
  if let Some(frac) = s.strip_prefix('.') {
    return !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit());
  }
  let (int, frac) = match s.split_once('.') {
    Some((i, f)) => (i, f),
    None => (s, ""),
  };
  !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) && frac.bytes().all(|b| b.is_ascii_digit())
}

/// True for `<...>` values, which are written without quotes.
pub(crate) fn is_html(s: &str) -> bool {
  s.len() >= 2 && s.starts_with('<') && s.ends_with('>')
}

/// Writes `s` as a DOT identifier, quoting when it is not a bare ID or numeral.
pub(crate) fn canonical(s: &str) -> Cow<'_, str> {
  if s.is_empty() {
    return Cow::Borrowed("\"\"");
  }
  if is_html(s) || ((is_id(s) || is_numeral(s)) && !is_keyword(s)) {
    return Cow::Borrowed(s);
  }
  Cow::Owned(quote(s))
}

/// Double-quotes `s`. Backslashes before a quote, a line break or the closing
/// quote are doubled so they read back literally.
fn quote(s: &str) -> String {
  let mut out = String::with_capacity(s.len() + 2);
  out.push('"');
  let mut run = 0;
  let mut chars = s.chars().peekable();
  while let Some(c) = chars.next() {
    if c == '\\' {
      run += 1;
      continue;
    }
    let guarded = c == '"' || c == '\n' || (c == '\r' && chars.peek() == Some(&'\n'));
    let width = if guarded { run * 2 } else { run };
    out.extend(std::iter::repeat_n('\\', width));
    if c == '"' {
      out.push('\\');
    }
    out.push(c);
    run = 0;
  }
  out.extend(std::iter::repeat_n('\\', run * 2));
  out.push('"');
  out
}

fn indent(level: usize) -> String {
  "\t".repeat(level)
}

struct Writer<'a> {
  engine: &'a Engine,
  out: String,
  written: HashSet<NodeId>,
}

/// Serializes graph `g` of `engine` as a standalone DOT graph.
#[instrument(level = "trace", skip(engine))]
pub(crate) fn write_dot(engine: &Engine, g: GraphId) -> String {
  let mut w = Writer {
    engine,
    out: String::new(),
    written: HashSet::new(),
  };
  let kind = engine.kind();
  if kind.strict {
    w.out.push_str("strict ");
  }
  w.out.push_str(kind.keyword());
  if !engine.is_anonymous(g) {
    let _ = write!(w.out, " {}", canonical(engine.graph_name(g)));
  }
  w.out.push_str(" {\n");
  w.write_root_dicts(g);
  w.write_body(g, 1);
  w.out.push_str("}\n");
  w.out
}

impl Writer<'_> {
  fn write_dict(&mut self, scope: AttributeScope, entries: &[(String, String)], level: usize) {
    if entries.is_empty() {
      return;
    }
    let pad = indent(level);
    let _ = write!(self.out, "{pad}{} [", scope.keyword());
    let sep = format!(",\n{pad}\t");
    let body: Vec<String> = entries
      .iter()
      .map(|(k, v)| format!("{}={}", canonical(k), canonical(v)))
      .collect();
    self.out.push_str(&body.join(&sep));
    if entries.len() > 1 {
      let _ = write!(self.out, "\n{pad}");
    }
    self.out.push_str("];\n");
  }

  /// Defaults of the graph being written, as seen from it.
  fn write_root_dicts(&mut self, g: GraphId) {
    for scope in AttributeScope::ALL {
      let entries: Vec<(String, String)> = self
        .engine
        .defaults(g, scope)
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect();
      self.write_dict(scope, &entries, 1);
    }
  }

  /// Local defaults of a subgraph that differ from what its parent provides.
  fn write_sub_dicts(&mut self, sub: GraphId, level: usize) {
    let parent = self.engine.parent(sub).unwrap_or(ROOT);
    for scope in AttributeScope::ALL {
      let entries: Vec<(String, String)> = self
        .engine
        .local_defaults(sub, scope)
        .into_iter()
        .filter(|(k, v)| self.engine.default_value(parent, scope, k).unwrap_or_default() != *v)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
      self.write_dict(scope, &entries, level);
    }
  }

  fn is_empty_subgraph(&self, sub: GraphId) -> bool {
    self.engine.node_count(sub) == 0
      && self.engine.edge_count(sub) == 0
      && self.engine.subgraphs(sub).is_empty()
      && AttributeScope::ALL
        .iter()
        .all(|&s| self.engine.local_defaults(sub, s).is_empty())
  }

  fn write_subgraph(&mut self, sub: GraphId, level: usize) {
    if self.engine.is_anonymous(sub) && self.is_empty_subgraph(sub) {
      return;
    }
    let pad = indent(level);
    if self.engine.is_anonymous(sub) {
      let _ = writeln!(self.out, "{pad}{{");
    } else {
      let _ = writeln!(
        self.out,
        "{pad}subgraph {} {{",
        canonical(self.engine.graph_name(sub))
      );
    }
    self.write_sub_dicts(sub, level + 1);
    // a node shared by sibling subgraphs is written in each of them
    let outer = std::mem::take(&mut self.written);
    self.write_body(sub, level + 1);
    self.written = outer;
    let _ = writeln!(self.out, "{pad}}}");
  }

  fn in_child(&self, g: GraphId, contains: impl Fn(GraphId) -> bool) -> bool {
    self.engine.subgraphs(g).iter().any(|&s| contains(s))
  }

  fn write_body(&mut self, g: GraphId, level: usize) {
    let engine = self.engine;
    for &sub in engine.subgraphs(g) {
      self.write_subgraph(sub, level);
    }
    for &n in engine.nodes(g) {
      if self.node_wanted(g, n) {
        self.write_node(g, n, level);
      }
      for e in engine.out_edges(g, n) {
        if self.in_child(g, |s| engine.edge_in(s, e)) {
          continue;
        }
        if let Some(head) = engine.edge(e).map(|r| r.head)
          && head != n
          && self.node_wanted(g, head)
          && !engine.non_default_attrs(g, Item::Node(head)).is_empty()
        {
          self.write_node(g, head, level);
        }
        self.write_edge(g, e, level);
      }
    }
  }

  fn node_wanted(&self, g: GraphId, n: NodeId) -> bool {
    if self.written.contains(&n) || self.in_child(g, |s| self.engine.node_in(s, n)) {
      return false;
    }
    let no_edges = self.engine.out_edges(g, n).is_empty() && self.engine.in_edges(g, n).is_empty();
    no_edges || !self.engine.non_default_attrs(g, Item::Node(n)).is_empty()
  }

  fn write_attrs(&mut self, attrs: &[(String, String)], level: usize) {
    if attrs.is_empty() {
      return;
    }
    let sep = format!(",\n{}", indent(level + 1));
    let body: Vec<String> = attrs
      .iter()
      .map(|(k, v)| format!("{}={}", canonical(k), canonical(v)))
      .collect();
    let _ = write!(self.out, "\t[{}]", body.join(&sep));
  }

  fn write_node(&mut self, g: GraphId, n: NodeId, level: usize) {
    self.written.insert(n);
    let attrs = self.engine.non_default_attrs(g, Item::Node(n));
    let _ = write!(self.out, "{}{}", indent(level), canonical(self.engine.node_name(n)));
    self.write_attrs(&attrs, level);
    self.out.push_str(";\n");
  }

  fn endpoint(&self, n: NodeId, port: &str) -> String {
    let name = canonical(self.engine.node_name(n));
    if port.is_empty() {
      return name.into_owned();
    }
    if is_html(port) {
      return format!("{name}:{port}");
    }
    match port.split_once(':') {
      Some((p, compass)) => format!("{name}:{}:{}", canonical(p), canonical(compass)),
      None => format!("{name}:{}", canonical(port)),
    }
  }

  fn write_edge(&mut self, g: GraphId, e: EdgeId, level: usize) {
    let engine = self.engine;
    let Some(rec) = engine.edge(e) else {
      return;
    };
    let item = Item::Edge(e);
    let tail = self.endpoint(rec.tail, &engine.item_value(item, "tailport"));
    let head = self.endpoint(rec.head, &engine.item_value(item, "headport"));
    let mut attrs: Vec<(String, String)> = Vec::new();
    if let Some(key) = rec.key.as_deref().filter(|k| !k.is_empty()) {
      attrs.push(("key".to_string(), key.to_string()));
    }
    attrs.extend(
      engine
        .non_default_attrs(g, item)
        .into_iter()
        .filter(|(k, _)| k != "tailport" && k != "headport"),
    );
    let _ = write!(
      self.out,
      "{}{tail} {} {head}",
      indent(level),
      engine.kind().edge_op()
    );
    self.write_attrs(&attrs, level);
    self.out.push_str(";\n");
  }
}
