//! Reading referenced files and writing copies into the destination tree.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::asset_paths::base_path_candidates;
use crate::config::RuleSpec;
use crate::mime;
use crate::models::{Asset, Dir, MaterializedFile};

/// No candidate for an asset could be read.
#[derive(Debug)]
pub struct NotFound {
  /// Every path that was tried, in order.
  pub candidates: Vec<PathBuf>,
}

impl fmt::Display for NotFound {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let joined = self
      .candidates
      .iter()
      .map(|path| path.display().to_string())
      .collect::<Vec<_>>()
      .join(",");
    write!(f, "Can't read file '{joined}', ignoring")
  }
}

impl std::error::Error for NotFound {}

/// Paths an asset may be read from, in priority order.
pub fn candidate_paths(asset: &Asset, rule: &RuleSpec, dir: &Dir) -> Vec<PathBuf> {
  if rule.base_path.is_empty() {
    vec![asset.absolute_path.clone()]
  } else {
    base_path_candidates(&rule.base_path, &dir.from, &asset.pathname)
  }
}

/// Read the first readable candidate for `asset`.
pub fn read_asset(asset: &Asset, rule: &RuleSpec, dir: &Dir) -> Result<MaterializedFile, NotFound> {
  let candidates = candidate_paths(asset, rule, dir);

  for candidate in &candidates {
    match fs::read(candidate) {
      Ok(contents) => {
        return Ok(MaterializedFile {
          mime_type: mime::from_path(candidate),
          path: candidate.clone(),
          contents,
        });
      }
      Err(err) => {
        tracing::trace!(path = %candidate.display(), error = %err, "asset candidate unreadable");
      }
    }
  }

  Err(NotFound { candidates })
}

/// Result of an at-most-once write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
  /// The file did not exist and was written.
  Written,
  /// A file already existed at the destination and was left alone.
  Skipped,
}

/// Write `contents` to `destination` unless a file already exists there.
///
/// Creation uses `create_new`, so concurrent writers racing for the same destination are
/// serialised by the filesystem: the first writer's bytes are kept, later writers skip.
/// Equal names are assumed to mean equal content, which holds for content-hash names but
/// not for path-based names.
pub fn write_once(destination: &Path, contents: &[u8]) -> std::io::Result<WriteOutcome> {
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)?;
  }

  let mut file = match OpenOptions::new()
    .write(true)
    .create_new(true)
    .open(destination)
  {
    Ok(file) => file,
    Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(WriteOutcome::Skipped),
    Err(err) => return Err(err),
  };

  fill(destination, file, contents)?;
  Ok(WriteOutcome::Written)
}

/// Write the freshly created file, removing it again when the write fails so a later
/// run can recreate it.
fn fill(destination: &Path, mut writer: impl Write, contents: &[u8]) -> std::io::Result<()> {
  let written = writer.write_all(contents).and_then(|()| writer.flush());
  drop(writer);
  if let Err(err) = written {
    if let Err(remove_err) = fs::remove_file(destination) {
      tracing::warn!(path = %destination.display(), %remove_err, "failed to remove partial file");
    }
    return Err(err);
  }
  Ok(())
}
