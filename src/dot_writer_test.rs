//! Tests for `dot_writer`.

use crate::dot_parser::parse_dot;
use crate::dot_writer::{canonical, write_dot};
use crate::engine::{Engine, Item, ROOT};
use crate::test_support::squash;
use crate::types::{AttributeScope, GraphKind};

fn written(src: &str) -> String {
  squash(&write_dot(&parse_dot(src).unwrap(), ROOT))
}

#[test]
fn empty_strict_graph() {
  let e = Engine::new("", GraphKind::default());
  assert_eq!(squash(&write_dot(&e, ROOT)), "strict graph { }");
}

#[test]
fn canonical_quotes_only_when_needed() {
  assert_eq!(canonical("abc_1"), "abc_1");
  assert_eq!(canonical("-3.25"), "-3.25");
  assert_eq!(canonical(".5"), ".5");
  assert_eq!(canonical("1a"), "\"1a\"");
  assert_eq!(canonical("two words"), "\"two words\"");
  assert_eq!(canonical("Node"), "\"Node\"");
  assert_eq!(canonical(""), "\"\"");
  assert_eq!(canonical("say \"hi\""), "\"say \\\"hi\\\"\"");
  assert_eq!(canonical("<<b>x</b>>"), "<<b>x</b>>");
  assert_eq!(canonical("café"), "café");
}

#[test]
fn trailing_backslash_is_doubled() {
  assert_eq!(canonical(r"C:\dir\"), r#""C:\dir\\""#);
  assert_eq!(canonical(r#"a\"b"#), r#""a\\\"b""#);
  assert_eq!(canonical(r"line\l"), r#""line\l""#);
}

#[test]
fn backslash_values_read_back() {
  let mut e = Engine::new("", GraphKind::default());
  let n = e.add_node(ROOT, "a").into_inner();
  for value in [r"C:\dir\", r"\\", r#"\"quoted\"\"#, "odd\\\nline"] {
    e.set_item_attr(Item::Node(n), "label", value);
    let back = parse_dot(&write_dot(&e, ROOT)).unwrap();
    let a = back.find_node(ROOT, "a").unwrap();
    assert_eq!(back.item_value(Item::Node(a), "label"), value);
  }
}

#[test]
fn node_shared_by_sibling_subgraphs_is_written_in_each() {
  let text = write_dot(
    &parse_dot("graph { subgraph A { x } subgraph B { x } }").unwrap(),
    ROOT,
  );
  assert_eq!(squash(&text), "graph { subgraph A { x; } subgraph B { x; } }");
  let back = parse_dot(&text).unwrap();
  for name in ["A", "B"] {
    let sub = back.find_subgraph(ROOT, name).unwrap();
    assert_eq!(back.node_count(sub), 1);
  }
}

#[test]
fn node_with_attrs_and_defaults() {
  assert_eq!(
    written("digraph G { node [shape=box]; a [color=red]; b }"),
    "digraph G { node [shape=box]; a [color=red]; b; }"
  );
}

#[test]
fn multiple_defaults_share_one_statement() {
  assert_eq!(
    written("graph { graph [rankdir=LR, label=\"my graph\"] }"),
    "graph { graph [rankdir=LR, label=\"my graph\" ]; }"
  );
}

#[test]
fn nodes_covered_by_edges_are_not_repeated() {
  assert_eq!(written("digraph { a -> b; c }"), "digraph { a -> b; c; }");
}

#[test]
fn head_with_attrs_is_written_before_its_edge() {
  assert_eq!(
    written("digraph { a -> b; b [color=blue] }"),
    "digraph { b [color=blue]; a -> b; }"
  );
}

#[test]
fn keyed_edges_carry_key_first() {
  assert_eq!(
    written("digraph { a -> b [key=k1, color=red] }"),
    "digraph { a -> b [key=k1, color=red]; }"
  );
}

#[test]
fn ports_are_written_on_endpoints() {
  assert_eq!(
    written("digraph { a:p1 -> b:p2:n }"),
    "digraph { a:p1 -> b:p2:n; }"
  );
}

#[test]
fn subgraph_members_are_written_inside() {
  assert_eq!(
    written("graph { subgraph s { node [shape=box]; a -- b } c }"),
    "graph { subgraph s { node [shape=box]; a -- b; } c; }"
  );
}

#[test]
fn anonymous_subgraph_uses_bare_braces() {
  assert_eq!(written("graph { { x } }"), "graph { { x; } }");
}

#[test]
fn empty_anonymous_subgraph_is_dropped() {
  let mut e = Engine::new("", GraphKind::new(false, false));
  e.add_subgraph(ROOT, None);
  e.add_subgraph(ROOT, Some("kept"));
  assert_eq!(squash(&write_dot(&e, ROOT)), "graph { subgraph kept { } }");
}

#[test]
fn cleared_attribute_disappears() {
  let mut e = Engine::new("", GraphKind::default());
  let n = e.add_node(ROOT, "1").into_inner();
  e.set_item_attr(Item::Node(n), "color", "red");
  assert_eq!(squash(&write_dot(&e, ROOT)), "strict graph { 1 [color=red]; }");
  e.set_item_attr(Item::Node(n), "color", "");
  assert_eq!(squash(&write_dot(&e, ROOT)), "strict graph { 1; }");
}

#[test]
fn earlier_node_keeps_value_after_default_statement() {
  assert_eq!(
    written("graph { a; node [shape=box]; b }"),
    "graph { node [shape=box]; a [shape=\"\"]; b; }"
  );
}

#[test]
fn subgraph_written_as_standalone_graph() {
  let e = parse_dot("digraph { node [shape=box]; subgraph s { a -> b } c }").unwrap();
  let s = e.find_subgraph(ROOT, "s").unwrap();
  assert_eq!(
    squash(&write_dot(&e, s)),
    "digraph s { node [shape=box]; a -> b; }"
  );
  assert!(e.is_declared(AttributeScope::Node, "shape"));
}
