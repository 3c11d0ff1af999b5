//! Tagged result of find-or-create operations.

/// Outcome of an operation that returns an existing item or creates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOrCreate<T> {
  /// The item already existed.
  Found(T),
  /// The item was created by this call.
  Created(T),
}

impl<T> FindOrCreate<T> {
  pub fn was_created(&self) -> bool {
    matches!(self, FindOrCreate::Created(_))
  }

  /// Borrows the item regardless of how it was obtained.
  pub fn get(&self) -> &T {
    match self {
      FindOrCreate::Found(t) | FindOrCreate::Created(t) => t,
    }
  }

  pub fn into_inner(self) -> T {
    match self {
      FindOrCreate::Found(t) | FindOrCreate::Created(t) => t,
    }
  }

  /// Applies `f` to the item, keeping the tag.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FindOrCreate<U> {
    match self {
      FindOrCreate::Found(t) => FindOrCreate::Found(f(t)),
      FindOrCreate::Created(t) => FindOrCreate::Created(f(t)),
    }
  }
}
