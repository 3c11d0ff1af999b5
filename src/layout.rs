//! Layout and rendering through external Graphviz programs.
//!
//! [`LayoutCoordinator`] resolves an allow-listed program on the search path,
//! pipes the graph's DOT text through it with [`ProcessRunner`], and either
//! replaces the graph with the positioned result (`layout`, filters) or hands
//! back the rendered bytes (`draw`).

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use crate::config::LayoutConfig;
use crate::dot_parser::parse_dot;
use crate::encoder::{Charset, decode_dot};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::process_runner::ProcessRunner;
use crate::types::{LayoutState, Program};

/// Output format written when neither a format nor a file extension is given.
pub const DEFAULT_FORMAT: &str = "dot";

/// One prepared program invocation.
struct Invocation {
  runner: ProcessRunner,
  args: Vec<String>,
  input: Vec<u8>,
  charset: Charset,
}

/// Runs layout engines and filters against graphs.
#[derive(Debug, Clone, Default)]
pub struct LayoutCoordinator {
  config: LayoutConfig,
}

fn owned_args(args: &[&str]) -> Vec<String> {
  args.iter().map(|a| a.to_string()).collect()
}

/// Format from the file extension, lower-cased.
fn format_of(path: Option<&Path>) -> Option<String> {
  path?
    .extension()
    .map(|ext| ext.to_string_lossy().to_lowercase())
}

fn reparse(output: &[u8]) -> Result<crate::engine::Engine> {
  let (text, _) = decode_dot(output)?;
  parse_dot(&text)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, bytes)?;
  Ok(())
}

impl LayoutCoordinator {
  pub fn new(config: LayoutConfig) -> Self {
    Self { config }
  }

  /// Coordinator configured from the environment.
  pub fn from_env() -> Result<Self> {
    Ok(Self::new(LayoutConfig::from_env()?))
  }

  pub fn config(&self) -> &LayoutConfig {
    &self.config
  }

  fn timeout(&self) -> Option<Duration> {
    self.config.timeout_ms.map(Duration::from_millis)
  }

  /// Absolute path of `program`: the first match on the configured search
  /// path, or on `PATH` when none is configured.
  pub fn which(&self, program: Program) -> Result<PathBuf> {
    let search = match &self.config.search_path {
      Some(path) => OsString::from(path),
      None => env::var_os("PATH").unwrap_or_default(),
    };
    let file = format!("{}{}", program.name(), env::consts::EXE_SUFFIX);
    env::split_paths(&search)
      .map(|dir| dir.join(&file))
      .find(|candidate| candidate.is_file())
      .ok_or_else(|| GraphError::ProgramNotFound {
        program: program.name().to_string(),
        reason: "not found on the search path".to_string(),
      })
  }

  fn prepare(&self, graph: &Graph, program: Program, args: Vec<String>) -> Result<Invocation> {
    let runner = ProcessRunner::new(self.which(program)?);
    let nodes = graph.number_of_nodes()?;
    if nodes > self.config.large_graph_warning {
      warn!(program = %program, nodes, "running a Graphviz program on a large graph");
    }
    Ok(Invocation {
      runner,
      args,
      input: graph.to_bytes()?,
      charset: graph.charset()?,
    })
  }

  fn layout_invocation(&self, graph: &Graph, prog: Option<&str>, args: &[&str]) -> Result<Invocation> {
    let program: Program = prog.unwrap_or(&self.config.default_program).parse()?;
    let mut args = owned_args(args);
    args.push(format!("-T{DEFAULT_FORMAT}"));
    self.prepare(graph, program, args)
  }

  fn draw_invocation(
    &self,
    graph: &Graph,
    path: Option<&Path>,
    format: Option<&str>,
    prog: Option<&str>,
    args: &[&str],
  ) -> Result<Invocation> {
    let format = match format {
      Some(f) => f.to_string(),
      None => format_of(path).unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
    };
    let mut args = owned_args(args);
    let program = match prog {
      Some(p) => p.parse::<Program>()?,
      None => {
        if !graph.layout_state().is_laid_out() {
          return Err(GraphError::Usage(format!(
            "graph has no layout information, see layout() or specify prog={}",
            Program::layout_engine_names()
          )));
        }
        // keep the positions computed by layout()
        args.push("-n2".to_string());
        Program::Neato
      }
    };
    if program != Program::Nop {
      args.push(format!("-T{format}"));
    }
    debug!(%program, %format, "draw");
    self.prepare(graph, program, args)
  }

  fn finish_layout(graph: &mut Graph, invocation: &Invocation, output: &[u8]) -> Result<()> {
    let engine = reparse(output)?;
    graph.replace_engine(engine);
    graph.set_layout_state(LayoutState::LaidOut);
    info!(program = invocation.runner.name(), "layout complete");
    Ok(())
  }

  fn finish_draw(path: Option<&Path>, output: Bytes) -> Result<Option<Bytes>> {
    match path {
      Some(path) => {
        write_output(path, &output)?;
        Ok(None)
      }
      None => Ok(Some(output)),
    }
  }

  fn run(invocation: &Invocation) -> Result<Bytes> {
    let result = invocation.runner.run(&invocation.args, &invocation.input)?;
    invocation.runner.check(result, invocation.charset)
  }

  async fn run_async(&self, invocation: &Invocation) -> Result<Bytes> {
    let result = invocation
      .runner
      .run_async(
        &invocation.args,
        Bytes::copy_from_slice(&invocation.input),
        self.timeout(),
      )
      .await?;
    invocation.runner.check(result, invocation.charset)
  }

  /// Positions the graph with `prog` (the configured default when `None`)
  /// and replaces its contents with the result. On failure the graph and its
  /// layout state are unchanged.
  #[instrument(level = "trace", skip(self, graph))]
  pub fn layout(&self, graph: &mut Graph, prog: Option<&str>, args: &[&str]) -> Result<()> {
    let invocation = self.layout_invocation(graph, prog, args)?;
    let output = Self::run(&invocation)?;
    Self::finish_layout(graph, &invocation, &output)
  }

  /// Renders the graph in `format` (else the extension of `path`, else
  /// DOT). Without `prog` the positions from a previous [layout] are kept.
  /// Writes to `path` when given, otherwise returns the bytes.
  ///
  /// [layout]: LayoutCoordinator::layout
  #[instrument(level = "trace", skip(self, graph))]
  pub fn draw(
    &self,
    graph: &Graph,
    path: Option<&Path>,
    format: Option<&str>,
    prog: Option<&str>,
    args: &[&str],
  ) -> Result<Option<Bytes>> {
    let invocation = self.draw_invocation(graph, path, format, prog, args)?;
    let output = Self::run(&invocation)?;
    Self::finish_draw(path, output)
  }

  /// [`layout`](LayoutCoordinator::layout) on the async runner, bounded by
  /// the configured timeout.
  #[instrument(level = "trace", skip(self, graph))]
  pub async fn layout_async(&self, graph: &mut Graph, prog: Option<&str>, args: &[&str]) -> Result<()> {
    let invocation = self.layout_invocation(graph, prog, args)?;
    let output = self.run_async(&invocation).await?;
    Self::finish_layout(graph, &invocation, &output)
  }

  /// [`draw`](LayoutCoordinator::draw) on the async runner, bounded by the
  /// configured timeout.
  #[instrument(level = "trace", skip(self, graph))]
  pub async fn draw_async(
    &self,
    graph: &Graph,
    path: Option<&Path>,
    format: Option<&str>,
    prog: Option<&str>,
    args: &[&str],
  ) -> Result<Option<Bytes>> {
    let invocation = self.draw_invocation(graph, path, format, prog, args)?;
    let output = self.run_async(&invocation).await?;
    Self::finish_draw(path, output)
  }

  fn filter(
    &self,
    graph: &mut Graph,
    program: Program,
    args: &[&str],
    copy: bool,
    accepted: &[i32],
  ) -> Result<Option<Graph>> {
    let invocation = self.prepare(graph, program, owned_args(args))?;
    let result = invocation.runner.run(&invocation.args, &invocation.input)?;
    let output = invocation
      .runner
      .check_exit(result, invocation.charset, accepted)?;
    let engine = reparse(&output)?;
    if copy {
      return Ok(Some(Graph::from_engine(engine)));
    }
    graph.replace_engine(engine);
    Ok(None)
  }

  /// Staggers leaves and chains to improve the aspect ratio of `dot`
  /// layouts. With `copy` the graph is untouched and the result returned.
  #[instrument(level = "trace", skip(self, graph))]
  pub fn unflatten(&self, graph: &mut Graph, args: &[&str], copy: bool) -> Result<Option<Graph>> {
    self.filter(graph, Program::Unflatten, args, copy, &[0])
  }

  /// Transitive reduction.
  #[instrument(level = "trace", skip(self, graph))]
  pub fn tred(&self, graph: &mut Graph, args: &[&str], copy: bool) -> Result<Option<Graph>> {
    self.filter(graph, Program::Tred, args, copy, &[0])
  }

  /// Reverses edges to break every cycle.
  #[instrument(level = "trace", skip(self, graph))]
  pub fn acyclic(&self, graph: &mut Graph, args: &[&str], copy: bool) -> Result<Option<Graph>> {
    // exit 1 means a cycle was found and broken
    self.filter(graph, Program::Acyclic, args, copy, &[0, 1])
  }
}

impl Graph {
  /// Lays out this graph with a coordinator configured from the environment.
  pub fn layout(&mut self, prog: Option<&str>, args: &[&str]) -> Result<()> {
    LayoutCoordinator::from_env()?.layout(self, prog, args)
  }

  /// Renders this graph with a coordinator configured from the environment.
  pub fn draw(
    &self,
    path: Option<&Path>,
    format: Option<&str>,
    prog: Option<&str>,
  ) -> Result<Option<Bytes>> {
    LayoutCoordinator::from_env()?.draw(self, path, format, prog, &[])
  }
}
