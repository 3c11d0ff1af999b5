//! Owned and non-owning references to a graph held by the engine.
//!
//! The engine lives in a shared cell. The handle that created it owns it and
//! releases it exactly once, on `close` or drop. Views derived from it
//! (subgraphs, parent and root lookups, attribute stores, nodes and edges)
//! share the cell without owning it: closing them does nothing, and they
//! report [`GraphError::Closed`] once the owner has released or replaced
//! the storage.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::engine::{Engine, GraphId, ROOT};
use crate::error::{GraphError, Result};

type Shared = Rc<RefCell<Option<Engine>>>;

/// Reference to one graph or subgraph inside an engine.
pub struct GraphHandle {
  cell: Shared,
  graph: GraphId,
  epoch: u64,
  owned: bool,
}

impl GraphHandle {
  /// Takes ownership of `engine`; the handle refers to its root graph.
  pub(crate) fn owned(engine: Engine) -> Self {
    let epoch = engine.epoch();
    Self {
      cell: Rc::new(RefCell::new(Some(engine))),
      graph: ROOT,
      epoch,
      owned: true,
    }
  }

  /// Non-owning reference to `graph` in the same engine.
  pub(crate) fn view_of(&self, graph: GraphId) -> Self {
    Self {
      cell: Rc::clone(&self.cell),
      graph,
      epoch: self.epoch,
      owned: false,
    }
  }

  /// Non-owning reference to the same graph.
  pub(crate) fn view(&self) -> Self {
    self.view_of(self.graph)
  }

  pub(crate) fn graph_id(&self) -> GraphId {
    self.graph
  }

  pub fn is_owned(&self) -> bool {
    self.owned
  }

  /// True when the storage was released, replaced, or no longer holds this graph.
  pub fn is_closed(&self) -> bool {
    match self.cell.try_borrow() {
      Ok(slot) => !slot
        .as_ref()
        .is_some_and(|e| e.epoch() == self.epoch && e.contains_graph(self.graph)),
      Err(_) => false,
    }
  }

  /// Runs `f` against the live engine.
  pub(crate) fn read<R>(&self, f: impl FnOnce(&Engine, GraphId) -> R) -> Result<R> {
    let slot = self.cell.borrow();
    match slot.as_ref() {
      Some(e) if e.epoch() == self.epoch && e.contains_graph(self.graph) => Ok(f(e, self.graph)),
      _ => Err(GraphError::Closed),
    }
  }

  /// Runs `f` against the live engine with mutable access.
  pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Engine, GraphId) -> R) -> Result<R> {
    let mut slot = self.cell.borrow_mut();
    match slot.as_mut() {
      Some(e) if e.epoch() == self.epoch && e.contains_graph(self.graph) => Ok(f(e, self.graph)),
      _ => Err(GraphError::Closed),
    }
  }

  /// Swaps in new storage. An owner replaces the shared contents, which
  /// invalidates every view; a view detaches and becomes the owner of
  /// `engine`.
  pub(crate) fn replace(&mut self, engine: Engine) {
    let epoch = engine.epoch();
    if self.owned {
      *self.cell.borrow_mut() = Some(engine);
    } else {
      self.cell = Rc::new(RefCell::new(Some(engine)));
      self.owned = true;
    }
    self.graph = ROOT;
    self.epoch = epoch;
  }

  /// Releases the storage if this handle owns it. Repeated calls, and calls
  /// on views, do nothing.
  pub fn close(&mut self) {
    if !self.owned {
      return;
    }
    let Ok(mut slot) = self.cell.try_borrow_mut() else {
      return;
    };
    if slot.as_ref().is_some_and(|e| e.epoch() == self.epoch) {
      trace!(epoch = self.epoch, "releasing graph storage");
      *slot = None;
    }
  }
}

impl Drop for GraphHandle {
  fn drop(&mut self) {
    self.close();
  }
}

impl PartialEq for GraphHandle {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.cell, &other.cell) && self.graph == other.graph && self.epoch == other.epoch
  }
}

impl fmt::Debug for GraphHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GraphHandle")
      .field("graph", &self.graph)
      .field("epoch", &self.epoch)
      .field("owned", &self.owned)
      .field("closed", &self.is_closed())
      .finish()
  }
}
