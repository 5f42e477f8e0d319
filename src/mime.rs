//! Extension based MIME type lookup for inlined assets.

use std::path::Path;

/// MIME type constants for the formats stylesheets commonly reference.
pub mod types {
  /// Scalable vector graphics.
  pub const SVG: &str = "image/svg+xml";
  /// Portable network graphics.
  pub const PNG: &str = "image/png";
  /// JPEG image.
  pub const JPEG: &str = "image/jpeg";
  /// GIF image.
  pub const GIF: &str = "image/gif";
  /// WebP image.
  pub const WEBP: &str = "image/webp";
  /// AVIF image.
  pub const AVIF: &str = "image/avif";
  /// Icon.
  pub const ICO: &str = "image/vnd.microsoft.icon";
  /// Bitmap.
  pub const BMP: &str = "image/bmp";
  /// TIFF image.
  pub const TIFF: &str = "image/tiff";
  /// Cursor file.
  pub const CUR: &str = "image/x-icon";
  /// WOFF font.
  pub const WOFF: &str = "font/woff";
  /// WOFF2 font.
  pub const WOFF2: &str = "font/woff2";
  /// TrueType font.
  pub const TTF: &str = "font/ttf";
  /// OpenType font.
  pub const OTF: &str = "font/otf";
  /// Embedded OpenType font.
  pub const EOT: &str = "application/vnd.ms-fontobject";
  /// Stylesheet.
  pub const CSS: &str = "text/css";
  /// Plain text.
  pub const PLAIN: &str = "text/plain";
  /// HTML document.
  pub const HTML: &str = "text/html";
  /// JSON document.
  pub const JSON: &str = "application/json";
  /// XML document.
  pub const XML: &str = "application/xml";
  /// JavaScript.
  pub const JAVASCRIPT: &str = "text/javascript";
  /// MP4 video.
  pub const MP4: &str = "video/mp4";
  /// WebM video.
  pub const WEBM: &str = "video/webm";
  /// MP3 audio.
  pub const MP3: &str = "audio/mpeg";
  /// WAV audio.
  pub const WAV: &str = "audio/wav";
  /// Ogg audio.
  pub const OGG: &str = "audio/ogg";
}

/// Guess the MIME type from a path's extension.
pub fn from_path(path: &Path) -> Option<&'static str> {
  let extension = path.extension()?.to_str()?.to_ascii_lowercase();
  from_extension(&extension)
}

/// Guess the MIME type from a lowercase extension without the dot.
pub fn from_extension(extension: &str) -> Option<&'static str> {
  let mime = match extension {
    "svg" | "svgz" => types::SVG,
    "png" | "apng" => types::PNG,
    "jpg" | "jpeg" | "jpe" => types::JPEG,
    "gif" => types::GIF,
    "webp" => types::WEBP,
    "avif" => types::AVIF,
    "ico" => types::ICO,
    "cur" => types::CUR,
    "bmp" => types::BMP,
    "tif" | "tiff" => types::TIFF,

    "woff" => types::WOFF,
    "woff2" => types::WOFF2,
    "ttf" => types::TTF,
    "otf" => types::OTF,
    "eot" => types::EOT,

    "css" => types::CSS,
    "txt" => types::PLAIN,
    "html" | "htm" => types::HTML,
    "json" => types::JSON,
    "xml" => types::XML,
    "js" | "mjs" => types::JAVASCRIPT,

    "mp4" | "m4v" => types::MP4,
    "webm" => types::WEBM,
    "mp3" => types::MP3,
    "wav" => types::WAV,
    "ogg" | "oga" => types::OGG,

    _ => return None,
  };
  Some(mime)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_path() {
    assert_eq!(from_path(Path::new("img/pixel.gif")), Some(types::GIF));
    assert_eq!(from_path(Path::new("icon.SVG")), Some(types::SVG));
    assert_eq!(from_path(Path::new("font.woff2")), Some(types::WOFF2));
  }

  #[test]
  fn test_unknown_extensions() {
    assert_eq!(from_path(Path::new("archive.xyz")), None);
    assert_eq!(from_path(Path::new("README")), None);
  }
}
