//! Graph save/load as DOT files.

use crate::error::Result;
use crate::graph::Graph;
use std::path::Path;
use tracing::instrument;

/// Writes `graph` to `path` as DOT text in the graph charset, creating
/// parent directories as needed.
#[instrument(level = "trace", skip(path, graph))]
pub fn write_graph(path: &Path, graph: &Graph) -> Result<()> {
  let bytes = graph.to_bytes()?;
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, bytes)?;
  Ok(())
}

/// Reads a DOT file. The charset declared in the text selects the decoder.
#[instrument(level = "trace", skip(path))]
pub fn read_graph(path: &Path) -> Result<Graph> {
  let bytes = std::fs::read(path)?;
  Graph::from_bytes(&bytes)
}
