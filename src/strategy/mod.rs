//! Strategy engine: rebase, inline, copy and custom handlers plus the fallback state machine.
//!
//! Each asset runs through `Start -> mode -> Done | Fallback`. Only inline can request a
//! fallback, and `Fallback` has no inline variant, so a chain takes at most one hop.

mod copy;
mod custom;
mod inline;
mod rebase;

pub use copy::copy_name;
pub use rebase::rebase_url;

use crate::config::{Mode, RuleSpec};
use crate::models::{Asset, Dir, Report};

/// Outcome of running one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
  /// Terminal: a replacement, or `None` to keep the token as written.
  Done(Option<String>),
  /// Inline could not proceed; switch to the rule's fallback.
  Fallback,
}

/// Run the rule's strategy for `asset`, following at most one fallback hop.
///
/// Returns `None` when the reference should be left exactly as written.
pub fn process(asset: &Asset, dir: &Dir, rule: &RuleSpec, report: &mut Report<'_>) -> Option<String> {
  let mut mode = rule.mode.clone();

  loop {
    tracing::debug!(mode = mode.name(), url = %asset.url, "applying url strategy");

    match run(&mode, asset, dir, rule, report) {
      Transition::Done(url) => return url,
      Transition::Fallback => match rule.fallback.clone() {
        Some(fallback) => {
          mode = fallback.into_mode();
          tracing::debug!(url = %asset.url, to = mode.name(), "falling back");
        }
        None => {
          tracing::debug!(url = %asset.url, "no fallback configured, keeping reference");
          return None;
        }
      },
    }
  }
}

fn run(mode: &Mode, asset: &Asset, dir: &Dir, rule: &RuleSpec, report: &mut Report<'_>) -> Transition {
  match mode {
    Mode::Rebase => Transition::Done(Some(rebase::process(asset, dir, rule))),
    Mode::Inline => inline::process(asset, dir, rule, report),
    Mode::Copy => Transition::Done(copy::process(asset, dir, rule, report)),
    Mode::Custom(callback) => Transition::Done(custom::process(callback, asset, dir, rule, report)),
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::path::Path;

  use super::*;
  use crate::asset_paths::prepare_asset;
  use crate::config::Fallback;
  use crate::models::Declaration;
  use tempfile::tempdir;

  fn dir(root: &Path) -> Dir {
    Dir {
      from: root.join("src"),
      to: root.join("build"),
      file: root.join("src"),
    }
  }

  #[test]
  fn oversize_inline_falls_back_to_copy() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = dir(temp.path());
    fs::create_dir_all(&dir.from)?;
    fs::write(dir.from.join("big.png"), vec![0u8; 2048])?;

    let rule = RuleSpec {
      max_size: 1.0,
      fallback: Some(Fallback::Copy),
      ..RuleSpec::inline()
    };
    let decl = Declaration::new("background", "url(big.png)");
    let mut report = Report::new(&decl, &dir);
    let asset = prepare_asset("big.png", &dir, None);

    assert_eq!(process(&asset, &dir, &rule, &mut report), Some("big.png".to_string()));
    assert!(dir.to.join("big.png").is_file());
    Ok(())
  }

  #[test]
  fn oversize_inline_without_fallback_keeps_reference() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = dir(temp.path());
    fs::create_dir_all(&dir.from)?;
    fs::write(dir.from.join("big.png"), vec![0u8; 2048])?;

    let rule = RuleSpec {
      max_size: 1.0,
      ..RuleSpec::inline()
    };
    let decl = Declaration::new("background", "url(big.png)");
    let mut report = Report::new(&decl, &dir);
    let asset = prepare_asset("big.png", &dir, None);

    assert_eq!(process(&asset, &dir, &rule, &mut report), None);
    assert!(report.warnings().is_empty());
    Ok(())
  }

  #[test]
  fn custom_fallback_sees_the_same_asset() -> std::io::Result<()> {
    let temp = tempdir()?;
    let dir = dir(temp.path());
    fs::create_dir_all(&dir.from)?;
    fs::write(dir.from.join("big.png"), vec![0u8; 16])?;

    let rule = RuleSpec {
      max_size: 0.0,
      fallback: Some(Fallback::custom(|asset, _, _, _| Some(format!("cdn/{}", asset.pathname)))),
      ..RuleSpec::inline()
    };
    let decl = Declaration::new("background", "url(big.png?v=1)");
    let mut report = Report::new(&decl, &dir);
    let asset = prepare_asset("big.png?v=1", &dir, None);

    assert_eq!(process(&asset, &dir, &rule, &mut report), Some("cdn/big.png".to_string()));
    Ok(())
  }
}
