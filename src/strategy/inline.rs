use super::Transition;
use crate::config::{EncodeType, RuleSpec};
use crate::encode::encode_file;
use crate::materialize::read_asset;
use crate::mime;
use crate::models::{Asset, Dir, Report};

/// Replace the reference with a `data:` URI, or request a fallback when the file is too big.
///
/// Unreadable files and unknown MIME types are warned about and left alone; they never
/// trigger the fallback.
pub(super) fn process(asset: &Asset, dir: &Dir, rule: &RuleSpec, report: &mut Report<'_>) -> Transition {
  let file = match read_asset(asset, rule, dir) {
    Ok(file) => file,
    Err(err) => {
      report.warn(err.to_string());
      return Transition::Done(None);
    }
  };
  report.add_dependency(&file.path);

  let Some(mime_type) = file.mime_type else {
    report.warn(format!(
      "Unable to find asset mime-type for {}",
      file.path.display()
    ));
    return Transition::Done(None);
  };

  if file.contents.len() as f64 >= rule.max_size_bytes() {
    tracing::debug!(
      path = %file.path.display(),
      size = file.contents.len(),
      "asset exceeds inline limit"
    );
    return Transition::Fallback;
  }

  let is_svg = mime_type == mime::types::SVG;
  let encode_type = rule.encode_type.unwrap_or(if is_svg {
    EncodeType::EncodeUriComponent
  } else {
    EncodeType::Base64
  });

  if is_svg && !asset.hash.is_empty() && !rule.ignore_fragment_warning {
    report.warn(format!(
      "Image type is svg and link contains #. SVG fragments cannot be addressed in a data URI, file fully inlined: {}",
      file.path.display()
    ));
  }

  let mut encoded = encode_file(
    &file.contents,
    mime_type,
    encode_type,
    rule.optimize_svg_encode && is_svg,
  );
  if rule.include_uri_fragment {
    encoded.push_str(&asset.hash);
  }

  match encode_type {
    EncodeType::Base64 => Transition::Done(Some(encoded)),
    EncodeType::EncodeUri | EncodeType::EncodeUriComponent => {
      Transition::Done(Some(format!("\"{encoded}\"")))
    }
  }
}
