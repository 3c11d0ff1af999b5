//! Text/byte conversion for the graph charset.
//!
//! DOT text crosses two boundaries as bytes: files and the pipes of external
//! programs. Graphviz understands UTF-8 (the default) and Latin-1, selected by
//! the `charset` graph attribute.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GraphError, Result};

static CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"\bcharset\s*=\s*(?:"([^"]+)"|([A-Za-z0-9_.\-]+))"#).expect("valid charset pattern")
});

/// Character encoding of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
  #[default]
  Utf8,
  Latin1,
}

impl Charset {
  /// Name written into the `charset` attribute.
  pub fn name(self) -> &'static str {
    match self {
      Charset::Utf8 => "UTF-8",
      Charset::Latin1 => "latin1",
    }
  }

  /// Encodes `text`; fails for characters Latin-1 cannot represent.
  pub fn encode(self, text: &str) -> Result<Vec<u8>> {
    match self {
      Charset::Utf8 => Ok(text.as_bytes().to_vec()),
      Charset::Latin1 => text
        .chars()
        .map(|c| {
          u8::try_from(u32::from(c))
            .map_err(|_| GraphError::Encoding(format!("{c:?} is not representable in latin1")))
        })
        .collect(),
    }
  }

  /// Decodes `bytes`; fails on invalid UTF-8.
  pub fn decode(self, bytes: &[u8]) -> Result<String> {
    match self {
      Charset::Utf8 => String::from_utf8(bytes.to_vec())
        .map_err(|e| GraphError::Encoding(format!("invalid UTF-8: {e}"))),
      Charset::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
  }

  /// Like [Charset::decode] but replaces invalid sequences.
  pub fn decode_lossy(self, bytes: &[u8]) -> String {
    match self {
      Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
      Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
    }
  }
}

impl FromStr for Charset {
  type Err = GraphError;

  fn from_str(s: &str) -> Result<Self> {
    let norm: String = s
      .chars()
      .filter(|c| !matches!(c, '-' | '_' | ' '))
      .collect::<String>()
      .to_ascii_lowercase();
    match norm.as_str() {
      "utf8" => Ok(Charset::Utf8),
      "latin1" | "l1" | "iso88591" | "isoir100" => Ok(Charset::Latin1),
      _ => Err(GraphError::Encoding(format!("unsupported charset {s:?}"))),
    }
  }
}

impl fmt::Display for Charset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Byte ranges of quoted strings, HTML strings and comments in DOT `text`.
fn opaque_spans(text: &str) -> Vec<Range<usize>> {
  let bytes = text.as_bytes();
  let mut spans = Vec::new();
  let mut i = 0;
  let mut line_start = true;
  while i < bytes.len() {
    let start = i;
    match bytes[i] {
      b'"' => {
        i += 1;
        while i < bytes.len() && bytes[i] != b'"' {
          i += if bytes[i] == b'\\' { 2 } else { 1 };
        }
        i += 1;
      }
      b'<' => {
        let mut depth = 0;
        while i < bytes.len() {
          match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            _ => {}
          }
          i += 1;
          if depth == 0 {
            break;
          }
        }
      }
      b'/' if bytes.get(i + 1) == Some(&b'*') => {
        i = text[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
      }
      b'/' if bytes.get(i + 1) == Some(&b'/') => {
        i = text[i..].find('\n').map_or(bytes.len(), |end| i + end);
      }
      b'#' if line_start => {
        i = text[i..].find('\n').map_or(bytes.len(), |end| i + end);
      }
      b => {
        if !b.is_ascii_whitespace() || b == b'\n' {
          line_start = b == b'\n';
        }
        i += 1;
        continue;
      }
    }
    line_start = false;
    spans.push(start..i.min(bytes.len()));
  }
  spans
}

/// Returns the value of the first `charset=...` declaration in `text`.
/// Occurrences inside quoted strings, HTML strings and comments are skipped.
pub fn detect_charset(text: &str) -> Option<&str> {
  let opaque = opaque_spans(text);
  CHARSET_RE
    .captures_iter(text)
    .find(|caps| {
      caps
        .get(0)
        .is_some_and(|m| !opaque.iter().any(|span| span.contains(&m.start())))
    })
    .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
    .map(|m| m.as_str())
}

/// Picks the charset for raw DOT bytes: a declared charset wins, UTF-8 otherwise.
pub fn sniff_charset(bytes: &[u8]) -> Result<Charset> {
  // Every byte maps to one char under Latin-1, so ASCII declarations survive.
  let view = Charset::Latin1.decode_lossy(bytes);
  match detect_charset(&view) {
    Some(name) => name.parse(),
    None => Ok(Charset::Utf8),
  }
}

/// Decodes DOT bytes using [sniff_charset].
pub fn decode_dot(bytes: &[u8]) -> Result<(String, Charset)> {
  let charset = sniff_charset(bytes)?;
  Ok((charset.decode(bytes)?, charset))
}
