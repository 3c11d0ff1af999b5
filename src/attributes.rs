//! Attribute access: per-scope default tables and per-item views.
//!
//! An [`AttributeStore`] reads and writes the default table of one graph for
//! one scope. An [`ItemAttributeView`] reads and writes one node or edge,
//! falling back to the root graph's default table for anything the item does
//! not set itself. Both register unseen names with an empty default on first
//! touch, so every name ever used has a table entry.

use tracing::debug;

use crate::engine::{Engine, Item, ROOT};
use crate::error::{GraphError, Result};
use crate::handle::GraphHandle;
use crate::types::AttributeScope;

fn check_encodable(engine: &Engine, value: &str) -> Result<()> {
  engine.charset().encode(value).map(|_| ())
}

/// Default-value table of one graph for one scope.
#[derive(Debug)]
pub struct AttributeStore {
  handle: GraphHandle,
  scope: AttributeScope,
}

impl AttributeStore {
  pub(crate) fn new(handle: GraphHandle, scope: AttributeScope) -> Self {
    Self { handle, scope }
  }

  pub fn scope(&self) -> AttributeScope {
    self.scope
  }

  fn guard_charset(&self, name: &str) -> Result<()> {
    if self.scope == AttributeScope::Graph && name == "charset" {
      return Err(GraphError::ImmutableCharset);
    }
    Ok(())
  }

  /// Default of `name` as seen from this graph, registering it when unseen.
  pub fn get(&self, name: &str) -> Result<String> {
    let scope = self.scope;
    self.handle.write(|e, g| {
      e.register(scope, name);
      e.default_value(g, scope, name).unwrap_or_default().to_string()
    })
  }

  /// Sets the default of `name` for this graph.
  pub fn set(&self, name: &str, value: impl ToString) -> Result<()> {
    self.guard_charset(name)?;
    let value = value.to_string();
    let scope = self.scope;
    self.handle.write(|e, g| {
      check_encodable(e, &value)?;
      debug!(%scope, name, value = %value, "set default");
      e.set_default(g, scope, name, &value);
      Ok(())
    })?
  }

  /// Resets the default of `name` to empty. The name stays registered.
  pub fn delete(&self, name: &str) -> Result<()> {
    self.set(name, "")
  }

  /// Sets every pair from `attrs`.
  pub fn update<K, V>(&self, attrs: impl IntoIterator<Item = (K, V)>) -> Result<()>
  where
    K: AsRef<str>,
    V: ToString,
  {
    for (k, v) in attrs {
      self.set(k.as_ref(), v)?;
    }
    Ok(())
  }

  /// True when `name` has been registered for this scope.
  pub fn contains(&self, name: &str) -> Result<bool> {
    let scope = self.scope;
    self.handle.read(|e, _| e.is_declared(scope, name))
  }

  /// Every registered name with its default as seen from this graph.
  pub fn iter(&self) -> Result<Vec<(String, String)>> {
    let scope = self.scope;
    self.handle.read(|e, g| e.defaults(g, scope))
  }

  /// Names with a non-empty default.
  pub fn non_empty(&self) -> Result<Vec<(String, String)>> {
    Ok(self.iter()?.into_iter().filter(|(_, v)| !v.is_empty()).collect())
  }
}

/// Attributes of one node or edge.
#[derive(Debug)]
pub struct ItemAttributeView {
  handle: GraphHandle,
  item: Item,
  label: String,
}

impl ItemAttributeView {
  pub(crate) fn new(handle: GraphHandle, item: Item, label: String) -> Self {
    Self {
      handle,
      item,
      label,
    }
  }

  fn missing(&self) -> GraphError {
    GraphError::NotFound {
      kind: match self.item {
        Item::Node(_) => "node",
        Item::Edge(_) => "edge",
      },
      name: self.label.clone(),
    }
  }

  fn live<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Result<R> {
    let item = self.item;
    self
      .handle
      .write(|e, _| e.contains_item(item).then(|| f(e)))?
      .ok_or_else(|| self.missing())
  }

  /// The item's own value, else the scope default; registers unseen names.
  pub fn get(&self, name: &str) -> Result<String> {
    let item = self.item;
    self.live(|e| {
      e.register(item.scope(), name);
      e.item_value(item, name)
    })
  }

  /// Overrides `name` on this item.
  pub fn set(&self, name: &str, value: impl ToString) -> Result<()> {
    let value = value.to_string();
    let item = self.item;
    self.live(|e| {
      check_encodable(e, &value)?;
      e.set_item_attr(item, name, &value);
      Ok(())
    })?
  }

  /// Overrides `name` with the empty string.
  pub fn delete(&self, name: &str) -> Result<()> {
    self.set(name, "")
  }

  /// Sets every pair from `attrs`.
  pub fn update<K, V>(&self, attrs: impl IntoIterator<Item = (K, V)>) -> Result<()>
  where
    K: AsRef<str>,
    V: ToString,
  {
    for (k, v) in attrs {
      self.set(k.as_ref(), v)?;
    }
    Ok(())
  }

  /// Attributes whose current value differs from the scope default.
  pub fn iter(&self) -> Result<Vec<(String, String)>> {
    let item = self.item;
    self.live(|e| e.non_default_attrs(ROOT, item))
  }

  /// True when `name` currently differs from its default.
  pub fn contains(&self, name: &str) -> Result<bool> {
    Ok(self.iter()?.iter().any(|(k, _)| k == name))
  }
}
