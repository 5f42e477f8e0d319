//! Extraction of `url(...)` tokens from declaration values.
//!
//! Two constructs are recognised: the canonical `url(...)` function and the legacy
//! `AlphaImageLoader(src=...)` filter. Whichever matches first anywhere in a value governs
//! the whole value; the two are not expected to be mixed.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

fn url_patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(
          r#"(?P<open>url\()(?P<body>\s*(?:"[^"]*"|'[^']*'|[^"')\s][^"')]*)\s*)(?P<close>\))"#,
        )
        .expect("invalid url() regex"),
        Regex::new(r#"(?P<open>AlphaImageLoader\(\s*src=)(?P<body>['"]?[^"')]+["'])(?P<close>)"#)
          .expect("invalid AlphaImageLoader regex"),
      ]
    })
    .as_slice()
}

/// Cheap check run before the regex walk.
pub fn contains_url_token(value: &str) -> bool {
  value.contains("url(") || value.contains("AlphaImageLoader(")
}

/// The literal inside a `url(...)` split into its structural parts.
///
/// `before + quote + value + quote + after` reproduces the literal byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawUrlToken<'a> {
  /// Whitespace preceding the opening quote or value.
  pub before: &'a str,
  /// `"`, `'` or empty.
  pub quote: &'a str,
  /// Unquoted reference.
  pub value: &'a str,
  /// Whitespace following the closing quote or value.
  pub after: &'a str,
}

impl<'a> RawUrlToken<'a> {
  /// Split a literal, treating a leading quote as structural only when it is mirrored at the end.
  pub fn split(literal: &'a str) -> Self {
    let trimmed = literal.trim();
    let start = literal.len() - literal.trim_start().len();
    let end = start + trimmed.len();

    let quote_len = match trimmed.as_bytes() {
      [first @ (b'"' | b'\''), .., last] if first == last => 1,
      _ => 0,
    };

    Self {
      before: &literal[..start],
      quote: &trimmed[..quote_len],
      value: &trimmed[quote_len..trimmed.len() - quote_len],
      after: &literal[end..],
    }
  }

  /// Reassemble the literal around a replacement value.
  ///
  /// A replacement that carries its own quotes replaces the original ones.
  pub fn render(&self, replacement: &str) -> String {
    if replacement.starts_with(['"', '\'']) {
      format!("{}{}{}", self.before, replacement, self.after)
    } else {
      format!(
        "{}{}{}{}{}",
        self.before, self.quote, replacement, self.quote, self.after
      )
    }
  }
}

/// One matched token with its byte span in the scanned value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlToken<'a> {
  /// Byte range of the whole match.
  pub span: Range<usize>,
  /// Matched text, e.g. `url( "a.png" )`.
  pub text: &'a str,
  /// Construct opener, e.g. `url(`.
  pub open: &'a str,
  /// Literal between opener and closer.
  pub raw: RawUrlToken<'a>,
  /// Construct closer, `)` or empty.
  pub close: &'a str,
}

impl UrlToken<'_> {
  /// Render the token with `replacement` in place of its value.
  pub fn render(&self, replacement: &str) -> String {
    format!("{}{}{}", self.open, self.raw.render(replacement), self.close)
  }
}

/// Lazily iterate the URL tokens of a declaration value, left to right.
pub fn url_tokens(value: &str) -> impl Iterator<Item = UrlToken<'_>> {
  let pattern = url_patterns()
    .iter()
    .find(|pattern| pattern.is_match(value));

  pattern.into_iter().flat_map(move |pattern| {
    pattern.captures_iter(value).filter_map(|caps| {
      let whole = caps.get(0)?;
      let body = caps.name("body")?.as_str();
      Some(UrlToken {
        span: whole.range(),
        text: whole.as_str(),
        open: caps.name("open")?.as_str(),
        raw: RawUrlToken::split(body),
        close: caps.name("close").map_or("", |m| m.as_str()),
      })
    })
  })
}
