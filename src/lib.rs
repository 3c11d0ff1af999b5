//! # agraph
//!
//! Attributed graphs in the DOT language, laid out and rendered by the
//! external Graphviz programs.
//!
//! ## Architecture
//!
//! - [`Graph`] is the facade: nodes, edges, subgraphs and three attribute
//!   tables (graph, node, edge defaults) backed by an in-memory engine.
//! - [`GraphHandle`] owns that storage, or views it without owning it.
//! - DOT text is read and written by the `dot_lexer`, `dot_parser` and
//!   `dot_writer` modules; [`Charset`] turns it into bytes.
//! - [`LayoutCoordinator`] pipes the text through `neato`, `dot` and friends
//!   using [`ProcessRunner`], which drains stdout and stderr concurrently so
//!   large graphs cannot deadlock the pipes.

pub mod attributes;
pub mod config;
mod dot_lexer;
mod dot_parser;
mod dot_writer;
#[cfg(test)]
mod dot_writer_test;
pub mod encoder;
mod engine;
pub mod error;
pub mod graph;
pub mod graph_io;
#[cfg(test)]
mod graph_test;
pub mod handle;
pub mod item;
pub mod layout;
pub mod process_runner;
#[cfg(test)]
mod process_runner_test;
#[cfg(test)]
mod test_support;
pub mod types;

pub use attributes::{AttributeStore, ItemAttributeView};
pub use config::LayoutConfig;
pub use encoder::Charset;
pub use error::{GraphError, Result};
pub use graph::{Graph, GraphOptions};
pub use graph_io::{read_graph, write_graph};
pub use handle::GraphHandle;
pub use item::{Edge, Node};
pub use layout::LayoutCoordinator;
pub use process_runner::ProcessRunner;
pub use types::{AttributeScope, FindOrCreate, GraphKind, LayoutState, ProcessResult, Program};
