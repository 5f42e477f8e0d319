//! Data structures produced while rewriting stylesheet asset references.

use std::path::{Path, PathBuf};

/// Resolved identity of a single `url(...)` reference.
///
/// Created once per occurrence and never mutated; a fallback strategy observes the
/// same value the primary strategy saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
  /// Original reference exactly as written inside the token.
  pub url: String,
  /// Reference without its query string and fragment.
  pub pathname: String,
  /// Absolute path of the referenced file, resolved against the declaring file's directory.
  pub absolute_path: PathBuf,
  /// Path of the referenced file relative to the source root (`Dir::from`).
  pub relative_path: PathBuf,
  /// Query string including the leading `?`, or empty.
  pub search: String,
  /// Fragment including the leading `#`, or empty.
  pub hash: String,
}

impl Asset {
  /// Query string and fragment, in the order they appeared.
  pub fn suffix(&self) -> String {
    format!("{}{}", self.search, self.hash)
  }
}

/// Resolution context for one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
  /// Directory of the source stylesheet.
  pub from: PathBuf,
  /// Directory of the destination stylesheet.
  pub to: PathBuf,
  /// Directory of the file that actually declared the value being rewritten.
  pub file: PathBuf,
}

/// A declaration handed over by the host stylesheet runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
  /// Property name, e.g. `background-image`.
  pub prop: String,
  /// Raw declaration value that may contain `url(...)` tokens.
  pub value: String,
  /// Stylesheet file the declaration came from, when known.
  pub source: Option<PathBuf>,
}

impl Declaration {
  /// Create a declaration without source information.
  pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      prop: prop.into(),
      value: value.into(),
      source: None,
    }
  }

  /// Attach the stylesheet file that declared the value.
  pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
    self.source = Some(source.into());
    self
  }

  /// Short label used to attach warnings to this declaration.
  pub fn node_label(&self) -> String {
    if self.prop.is_empty() {
      self.value.clone()
    } else {
      format!("{}: {}", self.prop, self.value)
    }
  }
}

/// File read from disk for inline and copy decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedFile {
  /// Candidate path the bytes were read from.
  pub path: PathBuf,
  /// Raw file contents.
  pub contents: Vec<u8>,
  /// MIME type derived from the extension, if the lookup table knows it.
  pub mime_type: Option<&'static str>,
}

/// Recoverable problem attached to the declaration that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
  /// Human readable description.
  pub message: String,
  /// Label of the declaration the warning belongs to.
  pub node: String,
}

/// Notification that a file was read, for incremental rebuild tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
  /// File that was read.
  pub file: PathBuf,
  /// Stylesheet (or directory when unknown) that referenced it.
  pub parent: PathBuf,
}

/// Outcome of rewriting one declaration value or stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteResult {
  /// Value with every in-scope reference replaced.
  pub value: String,
  /// Warnings emitted while processing.
  pub warnings: Vec<Warning>,
  /// Files read from disk while processing.
  pub dependencies: Vec<Dependency>,
}

/// Per-invocation sink for warnings and dependency notifications.
///
/// Every strategy receives this explicitly; nothing is reported through global state.
#[derive(Debug)]
pub struct Report<'a> {
  declaration: &'a Declaration,
  parent: PathBuf,
  warnings: Vec<Warning>,
  dependencies: Vec<Dependency>,
}

impl<'a> Report<'a> {
  /// Start an empty report scoped to one declaration.
  pub fn new(declaration: &'a Declaration, dir: &Dir) -> Self {
    let parent = declaration
      .source
      .clone()
      .unwrap_or_else(|| dir.file.clone());
    Self {
      declaration,
      parent,
      warnings: Vec::new(),
      dependencies: Vec::new(),
    }
  }

  /// Declaration currently being rewritten.
  pub fn declaration(&self) -> &'a Declaration {
    self.declaration
  }

  /// Record a recoverable warning.
  pub fn warn(&mut self, message: impl Into<String>) {
    let message = message.into();
    tracing::debug!(node = %self.declaration.prop, "{message}");
    self.warnings.push(Warning {
      message,
      node: self.declaration.node_label(),
    });
  }

  /// Record that `file` was read on behalf of this declaration.
  pub fn add_dependency(&mut self, file: &Path) {
    self.dependencies.push(Dependency {
      file: file.to_path_buf(),
      parent: self.parent.clone(),
    });
  }

  /// Warnings recorded so far.
  pub fn warnings(&self) -> &[Warning] {
    &self.warnings
  }

  pub(crate) fn finish(self, value: String) -> RewriteResult {
    RewriteResult {
      value,
      warnings: self.warnings,
      dependencies: self.dependencies,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dir() -> Dir {
    Dir {
      from: PathBuf::from("/p/src"),
      to: PathBuf::from("/p/build"),
      file: PathBuf::from("/p/src/partials"),
    }
  }

  #[test]
  fn report_attaches_declaration_label_to_warnings() {
    let decl = Declaration::new("background", "url(a.png)");
    let mut report = Report::new(&decl, &dir());
    report.warn("missing");

    assert_eq!(report.warnings(), &[Warning {
      message: "missing".into(),
      node: "background: url(a.png)".into(),
    }]);
  }

  #[test]
  fn dependency_parent_prefers_declaration_source() {
    let decl = Declaration::new("background", "url(a.png)").with_source("/p/src/partials/a.css");
    let mut report = Report::new(&decl, &dir());
    report.add_dependency(Path::new("/p/src/partials/a.png"));
    let result = report.finish(String::new());

    assert_eq!(result.dependencies[0].parent, PathBuf::from("/p/src/partials/a.css"));
  }

  #[test]
  fn dependency_parent_falls_back_to_file_dir() {
    let decl = Declaration::new("background", "url(a.png)");
    let mut report = Report::new(&decl, &dir());
    report.add_dependency(Path::new("/p/src/partials/a.png"));
    let result = report.finish(String::new());

    assert_eq!(result.dependencies[0].parent, PathBuf::from("/p/src/partials"));
  }
}
