use std::path::PathBuf;

use crate::asset_paths::{absolutize, normalize_path, relative_path, to_url_path};
use crate::config::RuleSpec;
use crate::hash::content_hash;
use crate::materialize::{WriteOutcome, read_asset, write_once};
use crate::models::{Asset, Dir, MaterializedFile, Report};

/// Copy the file under `dir.to/assetsPath` and point the reference at the copy.
pub(super) fn process(asset: &Asset, dir: &Dir, rule: &RuleSpec, report: &mut Report<'_>) -> Option<String> {
  if dir.from == dir.to {
    report.warn("Option `to` is required to copy assets, ignoring");
    return None;
  }

  let file = match read_asset(asset, rule, dir) {
    Ok(file) => file,
    Err(err) => {
      report.warn(err.to_string());
      return None;
    }
  };
  report.add_dependency(&file.path);

  let assets_base = match &rule.assets_path {
    Some(assets_path) => absolutize(assets_path, &dir.to),
    None => dir.to.clone(),
  };
  let destination = normalize_path(&assets_base.join(copy_name(asset, &file, rule)));

  match write_once(&destination, &file.contents) {
    Ok(WriteOutcome::Written) => {
      tracing::debug!(from = %file.path.display(), to = %destination.display(), "copied asset");
    }
    Ok(WriteOutcome::Skipped) => {
      tracing::trace!(to = %destination.display(), "asset already present, skipping write");
    }
    Err(err) => {
      report.warn(format!(
        "Can't write file '{}': {err}, ignoring",
        destination.display()
      ));
      return None;
    }
  }

  let url = to_url_path(&relative_path(&dir.to, &destination));
  Some(format!("{url}{}", asset.suffix()))
}

/// Destination name of a copy, relative to the assets directory.
///
/// Hashed names are `<hash><ext>`, or `<stem>_<hash><ext>` with `hashOptions.append`.
/// Unhashed copies mirror the asset's position relative to `dir.from`.
pub fn copy_name(asset: &Asset, file: &MaterializedFile, rule: &RuleSpec) -> PathBuf {
  if !rule.use_hash {
    return asset.relative_path.clone();
  }

  let hash = content_hash(&file.contents, &rule.hash_options);
  let extension = file
    .path
    .extension()
    .map(|ext| format!(".{}", ext.to_string_lossy()))
    .unwrap_or_default();

  if rule.hash_options.append {
    let stem = file
      .path
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default();
    PathBuf::from(format!("{stem}_{hash}{extension}"))
  } else {
    PathBuf::from(format!("{hash}{extension}"))
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::path::Path;

  use super::*;
  use crate::asset_paths::prepare_asset;
  use crate::models::Declaration;
  use tempfile::tempdir;

  fn dir(root: &Path) -> Dir {
    Dir {
      from: root.join("src"),
      to: root.join("build"),
      file: root.join("src"),
    }
  }

  fn run(dir: &Dir, url: &str, rule: &RuleSpec) -> (Option<String>, Vec<String>) {
    let decl = Declaration::new("background", format!("url({url})"));
    let mut report = Report::new(&decl, dir);
    let asset = prepare_asset(url, dir, None);
    let output = process(&asset, dir, rule, &mut report);
    let warnings = report.warnings().iter().map(|w| w.message.clone()).collect();
    (output, warnings)
  }

  fn fixture(root: &Path) -> std::io::Result<Dir> {
    let dir = dir(root);
    fs::create_dir_all(dir.from.join("img"))?;
    fs::write(dir.from.join("img/pixel.gif"), "pixel.gif content")?;
    Ok(dir)
  }

  #[test]
  fn mirrors_source_layout_under_assets_path() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = fixture(temp.path())?;
    let rule = RuleSpec {
      assets_path: Some(PathBuf::from("assets")),
      ..RuleSpec::copy()
    };

    let (output, warnings) = run(&dir, "img/pixel.gif?v=1#top", &rule);
    assert_eq!(output.as_deref(), Some("assets/img/pixel.gif?v=1#top"));
    assert!(warnings.is_empty());
    assert_eq!(fs::read(dir.to.join("assets/img/pixel.gif"))?, b"pixel.gif content");
    Ok(())
  }

  #[test]
  fn names_copies_by_content_hash() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = fixture(temp.path())?;
    let rule = RuleSpec {
      use_hash: true,
      ..RuleSpec::copy()
    };

    let (output, _) = run(&dir, "img/pixel.gif", &rule);
    assert_eq!(output.as_deref(), Some("79f89802.gif"));
    assert!(dir.to.join("79f89802.gif").is_file());
    Ok(())
  }

  #[test]
  fn append_keeps_original_stem() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = fixture(temp.path())?;
    let mut rule = RuleSpec {
      use_hash: true,
      assets_path: Some(PathBuf::from("static")),
      ..RuleSpec::copy()
    };
    rule.hash_options.append = true;

    let (output, _) = run(&dir, "img/pixel.gif", &rule);
    assert_eq!(output.as_deref(), Some("static/pixel_79f89802.gif"));
    Ok(())
  }

  #[test]
  fn requires_distinct_destination() -> std::io::Result<()> {
    let temp = tempdir()?;
    let mut dir = fixture(temp.path())?;
    dir.to = dir.from.clone();

    let (output, warnings) = run(&dir, "img/pixel.gif", &RuleSpec::copy());
    assert_eq!(output, None);
    assert_eq!(warnings, vec!["Option `to` is required to copy assets, ignoring".to_string()]);
    Ok(())
  }

  #[test]
  fn missing_source_warns() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = fixture(temp.path())?;

    let (output, warnings) = run(&dir, "img/missing.gif", &RuleSpec::copy());
    assert_eq!(output, None);
    assert!(warnings[0].starts_with("Can't read file"));
    assert!(!dir.to.exists());
    Ok(())
  }

  #[test]
  fn existing_copy_is_never_overwritten() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = fixture(temp.path())?;
    fs::create_dir_all(dir.to.join("img"))?;
    fs::write(dir.to.join("img/pixel.gif"), "older")?;

    let (output, _) = run(&dir, "img/pixel.gif", &RuleSpec::copy());
    assert_eq!(output.as_deref(), Some("img/pixel.gif"));
    assert_eq!(fs::read(dir.to.join("img/pixel.gif"))?, b"older");
    Ok(())
  }
}
