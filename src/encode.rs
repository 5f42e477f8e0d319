//! `data:` URI encoders used by inline mode.

use std::sync::OnceLock;

use base64::{Engine as _, engine::general_purpose};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::config::EncodeType;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// Characters `encodeURI` leaves alone: the component set plus URI reserved characters.
const URI: &AsciiSet = &URI_COMPONENT
  .remove(b';')
  .remove(b',')
  .remove(b'/')
  .remove(b'?')
  .remove(b':')
  .remove(b'@')
  .remove(b'&')
  .remove(b'=')
  .remove(b'+')
  .remove(b'$')
  .remove(b'#');

/// Escapes the compact SVG encoding turns back into literal characters.
const SVG_LITERALS: &[(&str, &str)] = &[
  ("%3D", "="),
  ("%3A", ":"),
  ("%2F", "/"),
  ("%22", "'"),
  ("%2C", ","),
  ("%3B", ";"),
];

fn escape_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"%[0-9A-F]{2}").expect("invalid escape regex"))
}

/// Build a `data:` URI for `contents`.
///
/// Percent-encoded payloads have newlines stripped, `%20` turned back into a space and
/// `#` escaped as `%23`. `optimize_svg` only affects `EncodeUriComponent`.
pub fn encode_file(contents: &[u8], mime_type: &str, encode_type: EncodeType, optimize_svg: bool) -> String {
  let prefix = format!("data:{mime_type}");

  let set = match encode_type {
    EncodeType::Base64 => return format!("{prefix};base64,{}", general_purpose::STANDARD.encode(contents)),
    EncodeType::EncodeUri => URI,
    EncodeType::EncodeUriComponent => URI_COMPONENT,
  };

  let text = String::from_utf8_lossy(contents).replace('\n', "");
  let encoded = if optimize_svg && encode_type == EncodeType::EncodeUriComponent {
    optimized_svg_encode(&text)
  } else {
    utf8_percent_encode(&text, set).to_string()
  };

  format!("{prefix},{}", encoded.replace("%20", " ").replace('#', "%23"))
}

/// Compact percent-encoding for SVG markup.
///
/// Keeps `= : / , ;` literal, swaps double quotes for single quotes and lowercases the
/// remaining escapes, which compresses better.
pub fn optimized_svg_encode(text: &str) -> String {
  let mut encoded = utf8_percent_encode(text, URI_COMPONENT).to_string();
  for (escape, literal) in SVG_LITERALS {
    encoded = encoded.replace(escape, literal);
  }

  escape_pattern()
    .replace_all(&encoded, |caps: &regex::Captures<'_>| caps[0].to_ascii_lowercase())
    .into_owned()
}
