use crate::config::{CustomUrlFn, RuleSpec};
use crate::models::{Asset, Dir, Report};

pub(super) fn process(
  callback: &CustomUrlFn,
  asset: &Asset,
  dir: &Dir,
  rule: &RuleSpec,
  report: &mut Report<'_>,
) -> Option<String> {
  callback(asset, dir, rule, report)
}
