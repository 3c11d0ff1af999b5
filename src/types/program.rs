//! Allow-list of external Graphviz programs.

use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;

/// Programs the layout pipeline is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
  Neato,
  Dot,
  Twopi,
  Circo,
  Fdp,
  Nop,
  Wc,
  Acyclic,
  Gvpr,
  Gvcolor,
  Ccomps,
  Sccmap,
  Tred,
  Sfdp,
  Unflatten,
}

impl Program {
  pub const ALL: [Program; 15] = [
    Program::Neato,
    Program::Dot,
    Program::Twopi,
    Program::Circo,
    Program::Fdp,
    Program::Nop,
    Program::Wc,
    Program::Acyclic,
    Program::Gvpr,
    Program::Gvcolor,
    Program::Ccomps,
    Program::Sccmap,
    Program::Tred,
    Program::Sfdp,
    Program::Unflatten,
  ];

  /// Programs that position nodes, named in usage errors.
  pub const LAYOUT_ENGINES: [Program; 6] = [
    Program::Neato,
    Program::Dot,
    Program::Twopi,
    Program::Circo,
    Program::Fdp,
    Program::Nop,
  ];

  /// Executable base name.
  pub fn name(self) -> &'static str {
    match self {
      Program::Neato => "neato",
      Program::Dot => "dot",
      Program::Twopi => "twopi",
      Program::Circo => "circo",
      Program::Fdp => "fdp",
      Program::Nop => "nop",
      Program::Wc => "wc",
      Program::Acyclic => "acyclic",
      Program::Gvpr => "gvpr",
      Program::Gvcolor => "gvcolor",
      Program::Ccomps => "ccomps",
      Program::Sccmap => "sccmap",
      Program::Tred => "tred",
      Program::Sfdp => "sfdp",
      Program::Unflatten => "unflatten",
    }
  }

  /// `neato|dot|twopi|circo|fdp|nop`
  pub fn layout_engine_names() -> String {
    Self::LAYOUT_ENGINES
      .iter()
      .map(|p| p.name())
      .collect::<Vec<_>>()
      .join("|")
  }
}

impl FromStr for Program {
  type Err = GraphError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .copied()
      .find(|p| p.name() == s)
      .ok_or_else(|| GraphError::ProgramNotFound {
        program: s.to_string(),
        reason: format!(
          "not one of: {}",
          Self::ALL
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
        ),
      })
  }
}

impl fmt::Display for Program {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
