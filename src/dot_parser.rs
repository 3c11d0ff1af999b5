//! DOT reader.
//!
//! Builds an [`Engine`] from DOT text. Only the first graph in the input is
//! read; anything after its closing brace is ignored.

use crate::dot_lexer::{Spanned, Tok, tokenize};
use crate::engine::{Engine, GraphId, Item, NodeId, ROOT};
use crate::error::{GraphError, Result};
use crate::types::{AttributeScope, GraphKind};
use tracing::instrument;

/// List of key-value attribute pairs from DOT `[key=value,...]` blocks.
pub(crate) type AttrList = Vec<(String, String)>;

/// One side of an edge statement.
#[derive(Debug, Clone)]
enum Operand {
  Node { name: String, port: Option<String> },
  Subgraph(GraphId),
}

struct Parser {
  toks: Vec<Spanned>,
  pos: usize,
  kind: GraphKind,
  engine: Engine,
}

/// Parses DOT source into a graph engine.
#[instrument(level = "trace", skip(source), fields(len = source.len()))]
pub(crate) fn parse_dot(source: &str) -> Result<Engine> {
  let toks = tokenize(source)?;
  let mut pos = 0;

  let strict = matches!(toks.first(), Some(t) if t.tok.is_keyword("strict"));
  if strict {
    pos += 1;
  }
  let directed = match toks.get(pos) {
    Some(t) if t.tok.is_keyword("digraph") => true,
    Some(t) if t.tok.is_keyword("graph") => false,
    Some(t) => return Err(GraphError::parse(t.line, "expected 'graph' or 'digraph'")),
    None => return Err(GraphError::parse(1, "empty input")),
  };
  pos += 1;

  let name = match toks.get(pos).map(|t| &t.tok) {
    Some(Tok::LBrace) => String::new(),
    Some(tok) => {
      let text = tok.text().ok_or_else(|| {
        GraphError::parse(toks[pos].line, "expected graph name or '{'")
      })?;
      pos += 1;
      text.to_string()
    }
    None => String::new(),
  };

  let kind = GraphKind::new(strict, directed);
  let mut parser = Parser {
    toks,
    pos,
    kind,
    engine: Engine::new(&name, kind),
  };
  parser.expect(&Tok::LBrace, "'{'")?;
  parser.parse_stmt_list(ROOT)?;
  parser.expect(&Tok::RBrace, "'}'")?;
  Ok(parser.engine)
}

impl Parser {
  fn peek(&self) -> Option<&Tok> {
    self.toks.get(self.pos).map(|t| &t.tok)
  }

  fn peek_at(&self, offset: usize) -> Option<&Tok> {
    self.toks.get(self.pos + offset).map(|t| &t.tok)
  }

  fn line(&self) -> usize {
    self
      .toks
      .get(self.pos)
      .or_else(|| self.toks.last())
      .map(|t| t.line)
      .unwrap_or(1)
  }

  fn error(&self, message: impl Into<String>) -> GraphError {
    GraphError::parse(self.line(), message)
  }

  fn expect(&mut self, tok: &Tok, what: &str) -> Result<()> {
    if self.peek() == Some(tok) {
      self.pos += 1;
      Ok(())
    } else {
      Err(self.error(format!("expected {what}")))
    }
  }

  /// Takes an identifier, quoted or HTML string.
  fn parse_id(&mut self, what: &str) -> Result<String> {
    match self.peek().and_then(Tok::text) {
      Some(text) => {
        let text = text.to_string();
        self.pos += 1;
        Ok(text)
      }
      None => Err(self.error(format!("expected {what}"))),
    }
  }

  fn parse_stmt_list(&mut self, g: GraphId) -> Result<()> {
    loop {
      match self.peek() {
        None => return Err(self.error("unexpected end of input, expected '}'")),
        Some(Tok::RBrace) => return Ok(()),
        Some(Tok::Semi) => self.pos += 1,
        Some(_) => self.parse_statement(g)?,
      }
    }
  }

  /// Parses a single statement inside graph `g`.
  fn parse_statement(&mut self, g: GraphId) -> Result<()> {
    let tok = self.peek().cloned().ok_or_else(|| self.error("expected statement"))?;

    for scope in AttributeScope::ALL {
      if tok.is_keyword(scope.keyword()) {
        self.pos += 1;
        if self.peek() != Some(&Tok::LBracket) {
          return Err(self.error(format!("expected '[' after '{}'", scope.keyword())));
        }
        let attrs = self.parse_attr_lists()?;
        self.apply_defaults(g, scope, &attrs);
        return Ok(());
      }
    }

    if tok == Tok::LBrace || tok.is_keyword("subgraph") {
      let sub = self.parse_subgraph(g)?;
      if matches!(self.peek(), Some(Tok::EdgeOp(_))) {
        return self.parse_edge_stmt(g, Operand::Subgraph(sub));
      }
      return Ok(());
    }

    if tok.text().is_some() && self.peek_at(1) == Some(&Tok::Equals) {
      let key = self.parse_id("attribute name")?;
      self.pos += 1;
      let value = self.parse_id("attribute value")?;
      self.engine.set_default(g, AttributeScope::Graph, &key, &value);
      return Ok(());
    }

    let (name, port) = self.parse_node_id()?;
    if matches!(self.peek(), Some(Tok::EdgeOp(_))) {
      return self.parse_edge_stmt(g, Operand::Node { name, port });
    }

    let attrs = if self.peek() == Some(&Tok::LBracket) {
      self.parse_attr_lists()?
    } else {
      AttrList::new()
    };
    let n = self.engine.add_node(g, &name).into_inner();
    for (k, v) in &attrs {
      self.engine.set_item_attr(Item::Node(n), k, v);
    }
    Ok(())
  }

  /// Parses `ID [':' ID [':' ID]]`; the port is kept as written.
  fn parse_node_id(&mut self) -> Result<(String, Option<String>)> {
    let name = self.parse_id("node name")?;
    if self.peek() != Some(&Tok::Colon) {
      return Ok((name, None));
    }
    self.pos += 1;
    let mut port = self.parse_id("port")?;
    if self.peek() == Some(&Tok::Colon) {
      self.pos += 1;
      let compass = self.parse_id("compass point")?;
      port = format!("{port}:{compass}");
    }
    Ok((name, Some(port)))
  }

  /// Parses `[subgraph [ID]] '{' stmt_list '}'` and returns the subgraph.
  fn parse_subgraph(&mut self, g: GraphId) -> Result<GraphId> {
    let mut name = None;
    if self.peek().is_some_and(|t| t.is_keyword("subgraph")) {
      self.pos += 1;
      if self.peek() != Some(&Tok::LBrace) {
        name = Some(self.parse_id("subgraph name")?);
      }
    }
    let sub = self.engine.add_subgraph(g, name.as_deref()).into_inner();
    if self.peek() != Some(&Tok::LBrace) {
      return Ok(sub);
    }
    self.pos += 1;
    self.parse_stmt_list(sub)?;
    self.expect(&Tok::RBrace, "'}'")?;
    Ok(sub)
  }

  /// Parses the rest of an edge statement whose first operand is `first`.
  fn parse_edge_stmt(&mut self, g: GraphId, first: Operand) -> Result<()> {
    let mut operands = vec![first];
    while let Some(&Tok::EdgeOp(directed)) = self.peek() {
      if directed != self.kind.directed {
        let op = if directed { "->" } else { "--" };
        return Err(self.error(format!("syntax error: '{op}' in {}", self.kind.keyword())));
      }
      self.pos += 1;
      let operand = if matches!(self.peek(), Some(Tok::LBrace))
        || self.peek().is_some_and(|t| t.is_keyword("subgraph"))
      {
        Operand::Subgraph(self.parse_subgraph(g)?)
      } else {
        let (name, port) = self.parse_node_id()?;
        Operand::Node { name, port }
      };
      operands.push(operand);
    }

    let attrs = if self.peek() == Some(&Tok::LBracket) {
      self.parse_attr_lists()?
    } else {
      AttrList::new()
    };
    let key = attrs
      .iter()
      .find(|(k, _)| k == "key")
      .map(|(_, v)| v.clone());

    let ends: Vec<Vec<(NodeId, Option<String>)>> = operands
      .iter()
      .map(|op| self.resolve_operand(g, op))
      .collect();

    for pair in ends.windows(2) {
      for (tail, tail_port) in &pair[0] {
        for (head, head_port) in &pair[1] {
          let e = self
            .engine
            .add_edge(g, *tail, *head, key.as_deref())
            .into_inner();
          for (k, v) in attrs.iter().filter(|(k, _)| k != "key") {
            self.engine.set_item_attr(Item::Edge(e), k, v);
          }
          if let Some(port) = tail_port {
            self.engine.set_item_attr(Item::Edge(e), "tailport", port);
          }
          if let Some(port) = head_port {
            self.engine.set_item_attr(Item::Edge(e), "headport", port);
          }
        }
      }
    }
    Ok(())
  }

  fn resolve_operand(&mut self, g: GraphId, op: &Operand) -> Vec<(NodeId, Option<String>)> {
    match op {
      Operand::Node { name, port } => {
        vec![(self.engine.add_node(g, name).into_inner(), port.clone())]
      }
      Operand::Subgraph(s) => self.engine.nodes(*s).iter().map(|&n| (n, None)).collect(),
    }
  }

  /// Parses one or more `[key=value,...]` blocks.
  fn parse_attr_lists(&mut self) -> Result<AttrList> {
    let mut attrs = AttrList::new();
    while self.peek() == Some(&Tok::LBracket) {
      self.pos += 1;
      loop {
        match self.peek() {
          Some(Tok::RBracket) => {
            self.pos += 1;
            break;
          }
          Some(Tok::Comma) | Some(Tok::Semi) => self.pos += 1,
          Some(_) => {
            let key = self.parse_id("attribute name")?;
            self.expect(&Tok::Equals, "'='")?;
            let value = self.parse_id("attribute value")?;
            attrs.push((key, value));
          }
          None => return Err(self.error("unclosed attribute list")),
        }
      }
    }
    Ok(attrs)
  }

  /// Applies a `graph|node|edge [...]` statement to `g`'s default table.
  fn apply_defaults(&mut self, g: GraphId, scope: AttributeScope, attrs: &AttrList) {
    for (k, v) in attrs {
      if g == ROOT && scope != AttributeScope::Graph {
        self.engine.register(scope, k);
        self.engine.pin_current_default(scope, k);
      }
      self.engine.set_default(g, scope, k, v);
    }
  }
}

