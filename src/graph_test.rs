//! Tests for `graph`.

use std::collections::HashSet;

use crate::encoder::Charset;
use crate::error::GraphError;
use crate::graph::{Graph, GraphOptions};
use crate::test_support::squash;
use crate::types::LayoutState;

fn names<T: ToString>(items: impl IntoIterator<Item = T>) -> HashSet<String> {
  items.into_iter().map(|i| i.to_string()).collect()
}

fn set(items: &[&str]) -> HashSet<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn digraph() -> Graph {
  Graph::new(GraphOptions::default().strict(false).directed(true))
}

#[test]
fn defaults_are_strict_undirected_unnamed() {
  let g = Graph::default();
  assert!(g.is_strict().unwrap());
  assert!(!g.is_directed().unwrap());
  assert_eq!(g.name().unwrap(), "");
  assert_eq!(g.charset().unwrap(), Charset::Utf8);
  assert_eq!(squash(&g.to_string()), "strict graph { }");
}

#[test]
fn cleared_node_attribute_is_not_serialized() {
  let g = Graph::default();
  let n = g.add_node("1").unwrap().into_inner();
  n.attr().set("color", "red").unwrap();
  assert_eq!(squash(&g.to_string()), "strict graph { 1 [color=red]; }");
  n.attr().delete("color").unwrap();
  assert_eq!(squash(&g.to_string()), "strict graph { 1; }");
}

#[test]
fn strict_duplicate_edge_is_silent_no_op() {
  let g = Graph::default();
  assert!(g.add_edge(1, 2).unwrap().was_created());
  assert!(!g.add_edge(1, 2).unwrap().was_created());
  assert!(!g.add_edge(2, 1).unwrap().was_created());
  assert_eq!(g.number_of_edges().unwrap(), 1);
}

#[test]
fn add_node_reports_found_or_created() {
  let g = Graph::default();
  assert!(g.add_node("a").unwrap().was_created());
  assert!(!g.add_node("a").unwrap().was_created());
  assert_eq!(g.number_of_nodes().unwrap(), 1);
}

#[test]
fn add_node_with_sets_attrs() {
  let g = Graph::default();
  let n = g
    .add_node_with("a", [("shape", "box"), ("width", "2")])
    .unwrap()
    .into_inner();
  assert_eq!(n.attr().get("shape").unwrap(), "box");
  assert_eq!(g.get_node("a").unwrap().attr().get("width").unwrap(), "2");
}

#[test]
fn node_lookup_errors() {
  let g = Graph::default();
  assert!(g.get_node("missing").unwrap_err().is_not_found());
  assert!(g.remove_node("missing").unwrap_err().is_not_found());
  assert!(!g.has_node("missing").unwrap());
}

#[test]
fn remove_node_drops_its_edges() {
  let g = Graph::default();
  g.add_path(["a", "b", "c"]).unwrap();
  g.remove_node("b").unwrap();
  assert_eq!(names(g.nodes().unwrap()), set(&["a", "c"]));
  assert_eq!(g.number_of_edges().unwrap(), 0);
}

#[test]
fn nodes_from_and_remove_nodes_from() {
  let g = Graph::default();
  g.add_nodes_from(1..=4).unwrap();
  g.remove_nodes_from([2, 3]).unwrap();
  assert_eq!(names(g.nodes().unwrap()), set(&["1", "4"]));
}

#[test]
fn keyed_parallel_edges_in_multigraph() {
  let g = digraph();
  let first = g
    .add_edge_with("a", "b", Some("first"), [("color", "red")])
    .unwrap();
  assert!(first.was_created());
  assert!(g.add_edge_with("a", "b", Some("second"), [("color", "blue")]).unwrap().was_created());
  assert!(!g.add_edge_with("a", "b", Some("first"), [("w", "1")]).unwrap().was_created());
  assert!(g.add_edge("a", "b").unwrap().was_created());
  assert_eq!(g.number_of_edges().unwrap(), 3);

  let e = g.get_edge("a", "b", Some("second")).unwrap();
  assert_eq!(e.key(), Some("second"));
  assert_eq!(e.attr().get("color").unwrap(), "blue");

  g.remove_edge("a", "b", Some("first")).unwrap();
  assert!(!g.has_edge("a", "b", Some("first")).unwrap());
  assert!(g.has_edge("a", "b", None).unwrap());
  assert!(g.remove_edge("a", "b", Some("first")).unwrap_err().is_not_found());
}

#[test]
fn undirected_edges_match_either_orientation() {
  let g = Graph::new(GraphOptions::default().strict(false));
  g.add_edge("a", "b").unwrap();
  assert!(g.has_edge("b", "a", None).unwrap());
  let e = g.get_edge("b", "a", None).unwrap();
  assert_eq!(e.endpoints(), ("a".to_string(), "b".to_string()));
}

#[test]
fn directed_adjacency() {
  let g = digraph();
  g.add_edges_from([("a", "b"), ("c", "a"), ("a", "a")]).unwrap();
  assert_eq!(names(g.successors("a").unwrap()), set(&["b", "a"]));
  assert_eq!(names(g.predecessors("a").unwrap()), set(&["c", "a"]));
  assert_eq!(names(g.neighbors("a").unwrap()), set(&["a", "b", "c"]));
  assert_eq!(g.out_degree("a").unwrap(), 2);
  assert_eq!(g.in_degree("a").unwrap(), 2);
  assert_eq!(g.degree("a").unwrap(), 4);
  assert_eq!(g.out_edges("a").unwrap().len(), 2);
  assert_eq!(g.in_edges("b").unwrap().len(), 1);
}

#[test]
fn undirected_adjacency() {
  let g = Graph::default();
  g.add_edges_from([("a", "b"), ("c", "a")]).unwrap();
  assert_eq!(names(g.successors("a").unwrap()), set(&["b", "c"]));
  assert_eq!(g.in_degree("a").unwrap(), 2);
  assert_eq!(g.out_edges("a").unwrap().len(), 2);
}

#[test]
fn path_and_cycle() {
  let g = digraph();
  g.add_cycle(["x", "y", "z"]).unwrap();
  assert_eq!(g.number_of_edges().unwrap(), 3);
  assert!(g.has_edge("z", "x", None).unwrap());
  g.add_path(["lonely"]).unwrap();
  assert!(g.has_node("lonely").unwrap());
}

#[test]
fn from_adjacency_builds_nodes_and_edges() {
  let g = Graph::from_adjacency(
    vec![("1", vec!["2", "3"]), ("4", vec![])],
    GraphOptions::default(),
  )
  .unwrap();
  assert_eq!(names(g.nodes().unwrap()), set(&["1", "2", "3", "4"]));
  assert_eq!(g.number_of_edges().unwrap(), 2);
}

#[test]
fn subgraph_induces_edges_and_shares_storage() {
  let g = digraph();
  g.add_path(["a", "b", "c"]).unwrap();
  let s = g.add_subgraph(["a", "b"], Some("cluster_x"), [("label", "X")]).unwrap();
  assert!(!s.is_owned());
  assert_eq!(s.number_of_edges().unwrap(), 1);
  assert_eq!(s.graph_attr().get("label").unwrap(), "X");
  assert_eq!(s.name().unwrap(), "cluster_x");

  s.add_node("d").unwrap();
  assert!(g.has_node("d").unwrap());

  let again = g.get_subgraph("cluster_x").unwrap();
  assert!(again.has_node("d").unwrap());
  assert_eq!(g.subgraphs().unwrap().len(), 1);
  assert!(s.parent().unwrap().is_some());
  assert!(g.parent().unwrap().is_none());
  assert_eq!(s.root().unwrap().number_of_nodes().unwrap(), 4);
}

#[test]
fn remove_subgraph_keeps_nodes() {
  let g = digraph();
  let s = g.add_subgraph(["a"], Some("s"), Vec::<(&str, &str)>::new()).unwrap();
  g.remove_subgraph("s").unwrap();
  assert!(s.is_closed());
  assert!(g.has_node("a").unwrap());
  assert!(g.get_subgraph("s").unwrap_err().is_not_found());
}

#[test]
fn removing_node_through_subgraph_keeps_it_in_root() {
  let g = digraph();
  let s = g.add_subgraph(["a", "b"], Some("s"), Vec::<(&str, &str)>::new()).unwrap();
  s.remove_node("a").unwrap();
  assert!(!s.has_node("a").unwrap());
  assert!(g.has_node("a").unwrap());
}

#[test]
fn subgraph_node_defaults_inherit() {
  let g = digraph();
  g.node_attr().set("shape", "box").unwrap();
  let s = g.add_subgraph(Vec::<&str>::new(), Some("s"), Vec::<(&str, &str)>::new()).unwrap();
  assert_eq!(s.node_attr().get("shape").unwrap(), "box");
  s.node_attr().set("shape", "circle").unwrap();
  assert_eq!(g.node_attr().get("shape").unwrap(), "box");
  let n = s.add_node("inside").unwrap().into_inner();
  assert_eq!(n.attr().get("shape").unwrap(), "circle");
}

#[test]
fn close_is_idempotent_and_invalidates_views() {
  let mut g = Graph::default();
  let n = g.add_node("a").unwrap().into_inner();
  let store = g.node_attr().get("x");
  assert!(store.is_ok());
  g.close();
  g.close();
  assert!(g.is_closed());
  assert!(matches!(g.number_of_nodes(), Err(GraphError::Closed)));
  assert!(matches!(n.attr().get("color"), Err(GraphError::Closed)));
  assert_eq!(g.to_string(), "");
}

#[test]
fn closing_a_view_leaves_owner_open() {
  let g = digraph();
  let mut s = g.add_subgraph(["a"], Some("s"), Vec::<(&str, &str)>::new()).unwrap();
  s.close();
  assert!(!g.is_closed());
  assert!(!s.is_closed());
}

#[test]
fn clear_resets_content_and_state() {
  let mut g = Graph::new(GraphOptions::default().name("G").charset(Charset::Latin1));
  g.add_edge("a", "b").unwrap();
  g.node_attr().set("shape", "box").unwrap();
  g.clear().unwrap();
  assert_eq!(g.number_of_nodes().unwrap(), 0);
  assert_eq!(g.name().unwrap(), "G");
  assert_eq!(g.charset().unwrap(), Charset::Latin1);
  assert!(!g.node_attr().contains("shape").unwrap());
  assert_eq!(g.layout_state(), LayoutState::NoLayout);
}

#[test]
fn copy_is_independent() {
  let g = digraph();
  g.add_edge("a", "b").unwrap();
  let c = g.copy().unwrap();
  c.add_node("z").unwrap();
  assert!(!g.has_node("z").unwrap());
  assert!(c.has_edge("a", "b", None).unwrap());
  assert!(c.is_owned());
}

#[test]
fn copy_of_subgraph_is_a_root_graph() {
  let g = digraph();
  g.add_edge("x", "y").unwrap();
  let s = g.add_subgraph(["a", "b"], Some("s"), Vec::<(&str, &str)>::new()).unwrap();
  s.add_edge("a", "b").unwrap();
  let c = s.copy().unwrap();
  assert_eq!(names(c.nodes().unwrap()), set(&["a", "b"]));
  assert!(c.parent().unwrap().is_none());
}

#[test]
fn reverse_flips_directed_edges_and_keeps_attrs() {
  let g = digraph();
  g.add_edge_with("a", "b", None, [("color", "red")]).unwrap();
  let r = g.reverse().unwrap();
  assert!(r.has_edge("b", "a", None).unwrap());
  assert!(!r.has_edge("a", "b", None).unwrap());
  assert_eq!(r.get_edge("b", "a", None).unwrap().attr().get("color").unwrap(), "red");
}

#[test]
fn direction_conversions() {
  let g = Graph::default();
  g.add_edge("a", "b").unwrap();
  g.graph_attr().set("label", "L").unwrap();
  let d = g.to_directed().unwrap();
  assert!(d.is_directed().unwrap());
  assert!(d.is_strict().unwrap());
  assert_eq!(d.graph_attr().get("label").unwrap(), "L");
  let u = d.to_undirected().unwrap();
  assert!(!u.is_directed().unwrap());
  assert!(u.has_edge("b", "a", None).unwrap());
}

#[test]
fn latin1_graph_encodes_bytes_and_rejects_wide_names() {
  let g = Graph::new(GraphOptions::default().charset(Charset::Latin1));
  g.add_node("Böhm").unwrap();
  assert!(matches!(g.add_node("日本"), Err(GraphError::Encoding(_))));
  let bytes = g.to_bytes().unwrap();
  assert!(bytes.contains(&0xF6));
  let back = Graph::from_bytes(&bytes).unwrap();
  assert!(back.has_node("Böhm").unwrap());
  assert_eq!(back.charset().unwrap(), Charset::Latin1);
}

#[test]
fn graph_charset_attribute_is_immutable() {
  let g = Graph::default();
  assert!(matches!(
    g.graph_attr().set("charset", "latin1"),
    Err(GraphError::ImmutableCharset)
  ));
}

#[test]
fn graphs_compare_by_text() {
  let a = Graph::from_string("graph { a -- b }").unwrap();
  let b = Graph::new(GraphOptions::default().strict(false));
  b.add_edge("a", "b").unwrap();
  assert_eq!(a, b);
}

#[test]
fn charset_text_in_label_keeps_utf8() {
  let g = Graph::default();
  g.add_node_with("a", [("label", "charset=latin1 é")]).unwrap();
  let back = Graph::from_bytes(&g.to_bytes().unwrap()).unwrap();
  assert_eq!(back.charset().unwrap(), Charset::Utf8);
  assert_eq!(
    back.get_node("a").unwrap().attr().get("label").unwrap(),
    "charset=latin1 é"
  );
}

#[test]
fn trailing_backslash_label_survives_text() {
  let g = Graph::default();
  g.add_node_with("a", [("label", r"C:\dir\")]).unwrap();
  let back = Graph::from_string(&g.to_dot_string().unwrap()).unwrap();
  assert_eq!(back.get_node("a").unwrap().attr().get("label").unwrap(), r"C:\dir\");
}

#[test]
fn node_in_two_subgraphs_survives_text() {
  let g = Graph::default();
  g.add_subgraph(["x"], Some("A"), Vec::<(&str, &str)>::new()).unwrap();
  g.add_subgraph(["x"], Some("B"), Vec::<(&str, &str)>::new()).unwrap();
  let back = Graph::from_string(&g.to_dot_string().unwrap()).unwrap();
  for name in ["A", "B"] {
    assert_eq!(back.get_subgraph(name).unwrap().number_of_nodes().unwrap(), 1);
  }
  assert_eq!(back.number_of_nodes().unwrap(), 1);
}
