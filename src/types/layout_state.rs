//! Whether a graph currently carries computed positions.

/// Layout state of one graph instance.
///
/// Starts at `NoLayout`; only a successful layout moves it to `LaidOut`.
/// Clearing or closing the graph resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutState {
  #[default]
  NoLayout,
  LaidOut,
}

impl LayoutState {
  pub fn is_laid_out(self) -> bool {
    self == LayoutState::LaidOut
  }
}
