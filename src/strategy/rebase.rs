use std::path::Path;

use crate::asset_paths::{absolutize, relative_path, to_url_path};
use crate::config::RuleSpec;
use crate::models::{Asset, Dir};

/// Rebase onto `dir.to`, or onto `dir.to/assetsPath` when one is configured.
pub(super) fn process(asset: &Asset, dir: &Dir, rule: &RuleSpec) -> String {
  let target = match &rule.assets_path {
    Some(assets_path) => absolutize(assets_path, &dir.to),
    None => dir.to.clone(),
  };
  rebase_url(asset, &target, rule.force_relative)
}

/// Reference to `asset` from a stylesheet living in `target`, query and fragment reattached.
pub fn rebase_url(asset: &Asset, target: &Path, force_relative: bool) -> String {
  let mut rebased = to_url_path(&relative_path(target, &asset.absolute_path));
  if rebased.is_empty() {
    rebased.push('.');
  }
  if force_relative && !is_dot_relative(&rebased) {
    rebased.insert_str(0, "./");
  }
  format!("{rebased}{}", asset.suffix())
}

fn is_dot_relative(url: &str) -> bool {
  url == "." || url == ".." || url.starts_with("./") || url.starts_with("../")
}
