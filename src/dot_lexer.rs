//! Tokenizer for DOT text.
//!
//! Comments (`//`, `/* */`, and `#` lines) are skipped, quoted strings are
//! joined across `+`, and HTML strings keep their angle brackets so the writer
//! can emit them unquoted.

use crate::error::{GraphError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tok {
  /// Bare identifier or numeral.
  Id(String),
  /// Contents of a double-quoted string, escapes resolved.
  Quoted(String),
  /// `<...>` string, brackets included.
  Html(String),
  LBrace,
  RBrace,
  LBracket,
  RBracket,
  Semi,
  Comma,
  Colon,
  Equals,
  /// `->` or `--`; true for the directed form.
  EdgeOp(bool),
}

impl Tok {
  /// Text of an identifier-like token.
  pub(crate) fn text(&self) -> Option<&str> {
    match self {
      Tok::Id(s) | Tok::Quoted(s) | Tok::Html(s) => Some(s),
      _ => None,
    }
  }

  /// True for a bare identifier matching `keyword` in any case.
  pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
    matches!(self, Tok::Id(s) if s.eq_ignore_ascii_case(keyword))
  }
}

/// A token and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
  pub(crate) tok: Tok,
  pub(crate) line: usize,
}

fn is_id_char(c: char) -> bool {
  c.is_alphanumeric() || c == '_' || !c.is_ascii()
}

/// Splits `source` into tokens.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>> {
  let chars: Vec<char> = source.chars().collect();
  let mut out = Vec::new();
  let mut i = 0;
  let mut line = 1;
  let mut at_line_start = true;

  while i < chars.len() {
    let c = chars[i];
    if c == '\n' {
      line += 1;
      at_line_start = true;
      i += 1;
      continue;
    }
    if c.is_whitespace() {
      i += 1;
      continue;
    }
    if c == '#' && at_line_start {
      while i < chars.len() && chars[i] != '\n' {
        i += 1;
      }
      continue;
    }
    at_line_start = false;

    if c == '/' && chars.get(i + 1) == Some(&'/') {
      while i < chars.len() && chars[i] != '\n' {
        i += 1;
      }
      continue;
    }
    if c == '/' && chars.get(i + 1) == Some(&'*') {
      let start = line;
      i += 2;
      loop {
        match chars.get(i) {
          None => return Err(GraphError::parse(start, "unterminated comment")),
          Some('*') if chars.get(i + 1) == Some(&'/') => {
            i += 2;
            break;
          }
          Some('\n') => {
            line += 1;
            i += 1;
          }
          Some(_) => i += 1,
        }
      }
      continue;
    }

    let start = line;
    let tok = match c {
      '{' => {
        i += 1;
        Tok::LBrace
      }
      '}' => {
        i += 1;
        Tok::RBrace
      }
      '[' => {
        i += 1;
        Tok::LBracket
      }
      ']' => {
        i += 1;
        Tok::RBracket
      }
      ';' => {
        i += 1;
        Tok::Semi
      }
      ',' => {
        i += 1;
        Tok::Comma
      }
      ':' => {
        i += 1;
        Tok::Colon
      }
      '=' => {
        i += 1;
        Tok::Equals
      }
      '-' if chars.get(i + 1) == Some(&'>') => {
        i += 2;
        Tok::EdgeOp(true)
      }
      '-' if chars.get(i + 1) == Some(&'-') => {
        i += 2;
        Tok::EdgeOp(false)
      }
      '"' => {
        let mut text = String::new();
        i = read_quoted(&chars, i, &mut line, &mut text)?;
        // "a" + "b" concatenates
        loop {
          let mut j = i;
          let mut lines = 0;
          while j < chars.len() && chars[j].is_whitespace() {
            if chars[j] == '\n' {
              lines += 1;
            }
            j += 1;
          }
          if chars.get(j) != Some(&'+') {
            break;
          }
          j += 1;
          while j < chars.len() && chars[j].is_whitespace() {
            if chars[j] == '\n' {
              lines += 1;
            }
            j += 1;
          }
          if chars.get(j) != Some(&'"') {
            break;
          }
          line += lines;
          i = read_quoted(&chars, j, &mut line, &mut text)?;
        }
        Tok::Quoted(text)
      }
      '<' => {
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
          let Some(&ch) = chars.get(i) else {
            return Err(GraphError::parse(start, "unterminated HTML string"));
          };
          text.push(ch);
          i += 1;
          match ch {
            '<' => depth += 1,
            '>' => {
              depth -= 1;
              if depth == 0 {
                break;
              }
            }
            '\n' => line += 1,
            _ => {}
          }
        }
        Tok::Html(text)
      }
      c if c == '-' || c == '.' || c.is_ascii_digit() => {
        let begin = i;
        i += 1;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
          i += 1;
        }
        let text: String = chars[begin..i].iter().collect();
        if !text.chars().any(|c| c.is_ascii_digit()) {
          return Err(GraphError::parse(start, format!("syntax error near '{text}'")));
        }
        Tok::Id(text)
      }
      c if is_id_char(c) => {
        let begin = i;
        while i < chars.len() && is_id_char(chars[i]) {
          i += 1;
        }
        Tok::Id(chars[begin..i].iter().collect())
      }
      other => {
        return Err(GraphError::parse(start, format!("unexpected character '{other}'")));
      }
    };
    out.push(Spanned { tok, line: start });
  }
  Ok(out)
}

/// Reads a quoted string starting at the opening quote `chars[i]` into `out`.
/// Returns the index after the closing quote.
fn read_quoted(chars: &[char], mut i: usize, line: &mut usize, out: &mut String) -> Result<usize> {
  let start = *line;
  i += 1;
  loop {
    match chars.get(i) {
      None => return Err(GraphError::parse(start, "unterminated string")),
      Some('"') => return Ok(i + 1),
      Some('\\') => {
        let run = chars[i..].iter().take_while(|&&c| c == '\\').count();
        let after = i + run;
        let guarded = match chars.get(after) {
          Some('"' | '\n') => Some(1),
          Some('\r') if chars.get(after + 1) == Some(&'\n') => Some(2),
          _ => None,
        };
        let Some(width) = guarded else {
          out.extend(std::iter::repeat_n('\\', run));
          i = after;
          continue;
        };
        // pairs collapse; an odd one escapes the quote or joins the lines
        out.extend(std::iter::repeat_n('\\', run / 2));
        i = after;
        if run % 2 == 1 {
          if chars[after] == '"' {
            out.push('"');
          } else {
            *line += 1;
          }
          i += width;
        }
      }
      Some(&c) => {
        if c == '\n' {
          *line += 1;
        }
        out.push(c);
        i += 1;
      }
    }
  }
}
