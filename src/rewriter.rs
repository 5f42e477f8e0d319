//! Declaration rewriter driving parsing, resolution, rule selection and strategies.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;

use crate::asset_paths::{absolutize, prepare_asset, should_ignore_url};
use crate::config::{Mode, UrlOptions};
use crate::models::{Declaration, Dir, Report, RewriteResult};
use crate::parser::{contains_url_token, url_tokens};
use crate::selection::match_options;
use crate::strategy;

fn declaration_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?P<prop>[-\w]+)\s*:(?P<value>(?:url\([^)]*\)|[^;{}])+)")
      .expect("invalid declaration regex")
  })
}

fn comment_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("invalid comment regex"))
}

/// Source and destination stylesheet files of one rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylesheetPaths {
  /// Stylesheet being read. `None` means the working directory.
  pub from: Option<PathBuf>,
  /// Stylesheet being written. `None` means the same directory as `from`.
  pub to: Option<PathBuf>,
}

impl StylesheetPaths {
  /// Paths for a stylesheet moving from `from` to `to`.
  pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
    Self {
      from: Some(from.into()),
      to: Some(to.into()),
    }
  }

  /// Resolution context for a declaration declared in `source`.
  pub fn dir(&self, root: &Path, source: Option<&Path>) -> Dir {
    let from = absolutize(&parent_dir(self.from.as_deref()), root);
    let to = match self.to.as_deref() {
      Some(to) => absolutize(&parent_dir(Some(to)), root),
      None => from.clone(),
    };
    let file = match source {
      Some(source) => absolutize(&parent_dir(Some(source)), root),
      None => root.to_path_buf(),
    };
    Dir { from, to, file }
  }
}

fn parent_dir(file: Option<&Path>) -> PathBuf {
  file
    .and_then(Path::parent)
    .map(Path::to_path_buf)
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Rewrites `url(...)` references according to a set of rules.
///
/// Filters are matched against asset paths relative to `root`, which also anchors
/// relative stylesheet paths.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
  options: UrlOptions,
  root: PathBuf,
}

impl UrlRewriter {
  /// Create a rewriter rooted at the current working directory.
  pub fn new(options: impl Into<UrlOptions>) -> Self {
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Self::with_root(options, root)
  }

  /// Create a rewriter rooted at `root`.
  pub fn with_root(options: impl Into<UrlOptions>, root: impl Into<PathBuf>) -> Self {
    Self {
      options: options.into(),
      root: root.into(),
    }
  }

  /// Configured rules.
  pub fn options(&self) -> &UrlOptions {
    &self.options
  }

  /// Directory filters and relative paths are resolved against.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Rewrite every reference in one declaration value.
  ///
  /// Tokens are replaced left to right against the original value; tokens that are
  /// ignored, unmatched or fail to process keep their original text.
  pub fn rewrite_declaration(&self, declaration: &Declaration, paths: &StylesheetPaths) -> RewriteResult {
    let dir = paths.dir(&self.root, declaration.source.as_deref());
    let mut report = Report::new(declaration, &dir);
    let value = declaration.value.as_str();

    if !contains_url_token(value) {
      return report.finish(value.to_string());
    }

    let mut output = String::with_capacity(value.len());
    let mut cursor = 0;
    for token in url_tokens(value) {
      output.push_str(&value[cursor..token.span.start]);
      match self.replace_url(token.raw.value, &dir, &mut report) {
        Some(replacement) => output.push_str(&token.render(&replacement)),
        None => output.push_str(token.text),
      }
      cursor = token.span.end;
    }
    output.push_str(&value[cursor..]);

    report.finish(output)
  }

  /// Rewrite many declarations in parallel; results keep the input order.
  pub fn rewrite_declarations(
    &self,
    declarations: &[Declaration],
    paths: &StylesheetPaths,
  ) -> Vec<RewriteResult> {
    declarations
      .par_iter()
      .map(|declaration| self.rewrite_declaration(declaration, paths))
      .collect()
  }

  /// Rewrite every declaration of a whole stylesheet text.
  ///
  /// Declarations are attributed to `paths.from`. Comments are copied verbatim. Warnings
  /// and dependencies of all declarations are merged in source order.
  pub fn rewrite_stylesheet(&self, css: &str, paths: &StylesheetPaths) -> RewriteResult {
    let mut result = RewriteResult {
      value: String::with_capacity(css.len()),
      ..RewriteResult::default()
    };
    let mut cursor = 0;

    for comment in comment_pattern().find_iter(css) {
      self.rewrite_rules(&css[cursor..comment.start()], paths, &mut result);
      result.value.push_str(comment.as_str());
      cursor = comment.end();
    }
    self.rewrite_rules(&css[cursor..], paths, &mut result);

    result
  }

  fn rewrite_rules(&self, css: &str, paths: &StylesheetPaths, result: &mut RewriteResult) {
    let mut cursor = 0;

    for caps in declaration_pattern().captures_iter(css) {
      let Some(value) = caps.name("value") else {
        continue;
      };
      if !contains_url_token(value.as_str()) {
        continue;
      }

      let mut declaration = Declaration::new(&caps["prop"], value.as_str().trim());
      if let Some(from) = &paths.from {
        declaration = declaration.with_source(from.clone());
      }

      let rewritten = self.rewrite_declaration(&declaration, paths);
      result.value.push_str(&css[cursor..value.start()]);
      result
        .value
        .push_str(&value.as_str().replacen(&declaration.value, &rewritten.value, 1));
      result.warnings.extend(rewritten.warnings);
      result.dependencies.extend(rewritten.dependencies);
      cursor = value.end();
    }
    result.value.push_str(&css[cursor..]);
  }

  fn replace_url(&self, url: &str, dir: &Dir, report: &mut Report<'_>) -> Option<String> {
    let source = report.declaration().source.as_deref();
    let asset = prepare_asset(url, dir, source);
    let rule = match_options(&asset, &self.options, &self.root)?;

    if !matches!(rule.mode, Mode::Custom(_)) && should_ignore_url(url, !rule.base_path.is_empty()) {
      tracing::trace!(url, "ignoring reference");
      return None;
    }

    strategy::process(&asset, dir, rule, report)
  }
}
