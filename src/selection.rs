//! Helpers deciding which rule, if any, applies to an asset.

use std::path::Path;

use crate::asset_paths::{relative_path, to_url_path};
use crate::config::{Filter, RuleSpec, UrlOptions};
use crate::models::Asset;

/// Trait describing applicability gates for assets.
pub trait AssetInclusion {
  /// Returns `true` when the asset should be handled by the owning rule.
  ///
  /// `root_relative` is the asset path relative to the process root, with forward slashes.
  fn is_included(&self, asset: &Asset, root_relative: &str) -> bool;
}

impl AssetInclusion for Filter {
  fn is_included(&self, asset: &Asset, root_relative: &str) -> bool {
    match self {
      Self::Glob(matcher) => matcher.is_match(root_relative),
      Self::Regex(regex) => regex.is_match(root_relative),
      Self::Predicate(predicate) => predicate(asset),
    }
  }
}

impl<T: AssetInclusion> AssetInclusion for Option<T> {
  fn is_included(&self, asset: &Asset, root_relative: &str) -> bool {
    match self {
      Some(filter) => filter.is_included(asset, root_relative),
      None => true,
    }
  }
}

/// Asset path relative to `root`, as matched by glob and regex filters.
pub fn root_relative_path(asset: &Asset, root: &Path) -> String {
  to_url_path(&relative_path(root, &asset.absolute_path))
}

/// Find the first rule whose filter accepts the asset.
///
/// Returns `None` when no rule matches, in which case the asset is left untouched.
pub fn match_options<'a>(asset: &Asset, options: &'a UrlOptions, root: &Path) -> Option<&'a RuleSpec> {
  let root_relative = root_relative_path(asset, root);
  options
    .rules()
    .iter()
    .find(|rule| rule.filter.is_included(asset, &root_relative))
}
