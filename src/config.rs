//! Rule configuration: programmatic types and the JSON configuration file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use serde::Deserialize;

use crate::hash::HashOptions;
use crate::models::{Asset, Dir, Report};

/// Default configuration file searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "url-rewrite.config.json";

/// Default inline size ceiling, in kilobytes.
pub const DEFAULT_MAX_SIZE_KB: f64 = 14.0;

/// Caller supplied strategy. Returning `None` leaves the reference unchanged.
pub type CustomUrlFn =
  Arc<dyn Fn(&Asset, &Dir, &RuleSpec, &mut Report<'_>) -> Option<String> + Send + Sync>;

/// Caller supplied filter predicate.
pub type AssetPredicate = Arc<dyn Fn(&Asset) -> bool + Send + Sync>;

/// How a matched reference is rewritten.
#[derive(Clone)]
pub enum Mode {
  /// Recompute the reference relative to the destination directory.
  Rebase,
  /// Replace the reference with a `data:` URI.
  Inline,
  /// Copy the file under the destination tree and point at the copy.
  Copy,
  /// Delegate to a caller supplied function.
  Custom(CustomUrlFn),
}

impl Mode {
  /// Short name used in logs.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Rebase => "rebase",
      Self::Inline => "inline",
      Self::Copy => "copy",
      Self::Custom(_) => "custom",
    }
  }
}

impl fmt::Debug for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Mode {
  type Err = ConfigError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "rebase" => Ok(Self::Rebase),
      "inline" => Ok(Self::Inline),
      "copy" => Ok(Self::Copy),
      other => Err(ConfigError::UnknownMode(other.to_string())),
    }
  }
}

/// Secondary strategy used when inlining cannot proceed.
///
/// Inline is deliberately not a variant, so a fallback chain always terminates.
#[derive(Clone)]
pub enum Fallback {
  /// Copy the file instead.
  Copy,
  /// Delegate to a caller supplied function.
  Custom(CustomUrlFn),
}

impl Fallback {
  /// Parse a fallback name; `"none"` means no fallback.
  pub fn parse(value: &str) -> Result<Option<Self>, ConfigError> {
    match value {
      "copy" => Ok(Some(Self::Copy)),
      "none" => Ok(None),
      other => Err(ConfigError::UnknownFallback(other.to_string())),
    }
  }

  /// Fallback delegating to `callback`.
  pub fn custom(
    callback: impl Fn(&Asset, &Dir, &RuleSpec, &mut Report<'_>) -> Option<String>
    + Send
    + Sync
    + 'static,
  ) -> Self {
    Self::Custom(Arc::new(callback))
  }

  /// Mode the engine switches to.
  pub fn into_mode(self) -> Mode {
    match self {
      Self::Copy => Mode::Copy,
      Self::Custom(callback) => Mode::Custom(callback),
    }
  }
}

impl fmt::Debug for Fallback {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Copy => f.write_str("copy"),
      Self::Custom(_) => f.write_str("custom"),
    }
  }
}

/// Gate deciding whether a rule applies to an asset.
#[derive(Clone)]
pub enum Filter {
  /// Glob tested against the asset path relative to the root (`**`, `*`, `{a,b}`).
  Glob(GlobMatcher),
  /// Regular expression tested against the asset path relative to the root.
  Regex(Regex),
  /// Predicate receiving the whole asset.
  Predicate(AssetPredicate),
}

impl Filter {
  /// Compile a glob filter. `*` never crosses a `/`; `**` does.
  pub fn glob(pattern: &str) -> Result<Self, ConfigError> {
    let glob = GlobBuilder::new(pattern)
      .literal_separator(true)
      .build()
      .map_err(|source| ConfigError::InvalidGlob {
        pattern: pattern.to_string(),
        source,
      })?;
    Ok(Self::Glob(glob.compile_matcher()))
  }

  /// Compile a regular expression filter.
  pub fn regex(pattern: &str) -> Result<Self, ConfigError> {
    let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
      pattern: pattern.to_string(),
      source,
    })?;
    Ok(Self::Regex(regex))
  }

  /// Wrap a predicate.
  pub fn predicate(predicate: impl Fn(&Asset) -> bool + Send + Sync + 'static) -> Self {
    Self::Predicate(Arc::new(predicate))
  }
}

impl fmt::Debug for Filter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Glob(matcher) => write!(f, "Glob({})", matcher.glob()),
      Self::Regex(regex) => write!(f, "Regex({})", regex.as_str()),
      Self::Predicate(_) => f.write_str("Predicate(..)"),
    }
  }
}

/// Text encoding used for inlined files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeType {
  /// `;base64,` payload.
  Base64,
  /// Percent-encoding that keeps URI reserved characters.
  EncodeUri,
  /// Percent-encoding of everything but unreserved characters.
  EncodeUriComponent,
}

impl FromStr for EncodeType {
  type Err = ConfigError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "base64" => Ok(Self::Base64),
      "encodeURI" => Ok(Self::EncodeUri),
      "encodeURIComponent" => Ok(Self::EncodeUriComponent),
      other => Err(ConfigError::UnknownEncodeType(other.to_string())),
    }
  }
}

/// One processing rule.
#[derive(Debug, Clone)]
pub struct RuleSpec {
  /// Strategy applied to matching assets.
  pub mode: Mode,
  /// Applicability gate; `None` matches every asset.
  pub filter: Option<Filter>,
  /// Destination subpath for copies (and rebase target when set).
  pub assets_path: Option<PathBuf>,
  /// Ordered search roots for inline and copy. Enables root-relative references.
  pub base_path: Vec<PathBuf>,
  /// Inline size ceiling in kilobytes; `0` disables inlining.
  pub max_size: f64,
  /// Strategy used when inlining cannot proceed.
  pub fallback: Option<Fallback>,
  /// Name copies after their content hash.
  pub use_hash: bool,
  /// Digest configuration for hashed names.
  pub hash_options: HashOptions,
  /// Inline encoding; defaults to base64, or percent-encoding for SVG.
  pub encode_type: Option<EncodeType>,
  /// Keep the reference's fragment on the generated data URI.
  pub include_uri_fragment: bool,
  /// Do not warn about fragments on inlined SVG files.
  pub ignore_fragment_warning: bool,
  /// Use the compact percent-encoding for SVG.
  pub optimize_svg_encode: bool,
  /// Prefix rebased references with `./` when they do not start with a dot segment.
  pub force_relative: bool,
}

impl Default for RuleSpec {
  fn default() -> Self {
    Self::new(Mode::Rebase)
  }
}

impl RuleSpec {
  /// Rule with the given mode and default settings.
  pub fn new(mode: Mode) -> Self {
    Self {
      mode,
      filter: None,
      assets_path: None,
      base_path: Vec::new(),
      max_size: DEFAULT_MAX_SIZE_KB,
      fallback: None,
      use_hash: false,
      hash_options: HashOptions::default(),
      encode_type: None,
      include_uri_fragment: false,
      ignore_fragment_warning: false,
      optimize_svg_encode: false,
      force_relative: false,
    }
  }

  /// Rebase rule.
  pub fn rebase() -> Self {
    Self::new(Mode::Rebase)
  }

  /// Inline rule.
  pub fn inline() -> Self {
    Self::new(Mode::Inline)
  }

  /// Copy rule.
  pub fn copy() -> Self {
    Self::new(Mode::Copy)
  }

  /// Custom rule delegating to `callback`.
  pub fn custom(
    callback: impl Fn(&Asset, &Dir, &RuleSpec, &mut Report<'_>) -> Option<String>
    + Send
    + Sync
    + 'static,
  ) -> Self {
    Self::new(Mode::Custom(Arc::new(callback)))
  }

  /// Restrict the rule with a filter.
  pub fn with_filter(mut self, filter: Filter) -> Self {
    self.filter = Some(filter);
    self
  }

  /// Inline ceiling in bytes.
  pub fn max_size_bytes(&self) -> f64 {
    self.max_size.max(0.0) * 1024.0
  }
}

/// A single rule applied to every asset, or an ordered list where the first match wins.
#[derive(Debug, Clone)]
pub enum UrlOptions {
  /// One rule for every asset.
  Single(RuleSpec),
  /// Ordered rules; unmatched assets are left untouched.
  List(Vec<RuleSpec>),
}

impl Default for UrlOptions {
  fn default() -> Self {
    Self::Single(RuleSpec::default())
  }
}

impl From<RuleSpec> for UrlOptions {
  fn from(rule: RuleSpec) -> Self {
    Self::Single(rule)
  }
}

impl From<Vec<RuleSpec>> for UrlOptions {
  fn from(rules: Vec<RuleSpec>) -> Self {
    Self::List(rules)
  }
}

impl UrlOptions {
  /// Rules in priority order.
  pub fn rules(&self) -> &[RuleSpec] {
    match self {
      Self::Single(rule) => std::slice::from_ref(rule),
      Self::List(rules) => rules,
    }
  }

  /// Load configuration from `DEFAULT_CONFIG_FILE` in `dir`.
  ///
  /// A missing file yields the default single rebase rule; a malformed one is an error.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match fs::read_to_string(&candidate) {
      Ok(contents) => Self::parse(&contents, &candidate),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
      Err(source) => Err(ConfigError::Io {
        path: candidate,
        source,
      }),
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&contents, path)
  }

  /// Parse configuration from JSON text.
  pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
    Self::parse(contents, Path::new("<inline>"))
  }

  fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
    let file: UrlConfigFile =
      serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
      })?;

    match file {
      UrlConfigFile::Single(record) => Ok(Self::Single(record.try_into()?)),
      UrlConfigFile::List(records) => records
        .into_iter()
        .map(RuleSpec::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map(Self::List),
    }
  }
}

/// Top-level configuration file layout.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UrlConfigFile {
  List(Vec<RuleSpecRecord>),
  Single(RuleSpecRecord),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RuleSpecRecord {
  url: Option<String>,
  filter: Option<FilterRecord>,
  assets_path: Option<PathBuf>,
  base_path: Option<OneOrMany>,
  max_size: Option<f64>,
  fallback: Option<String>,
  use_hash: bool,
  hash_options: Option<HashOptionsRecord>,
  encode_type: Option<String>,
  include_uri_fragment: bool,
  ignore_fragment_warning: bool,
  optimize_svg_encode: bool,
  force_relative: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FilterRecord {
  Glob(String),
  Regex { regex: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
  One(PathBuf),
  Many(Vec<PathBuf>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HashOptionsRecord {
  method: Option<String>,
  shrink: Option<usize>,
  append: bool,
}

impl TryFrom<RuleSpecRecord> for RuleSpec {
  type Error = ConfigError;

  fn try_from(record: RuleSpecRecord) -> Result<Self, Self::Error> {
    let mode = match record.url.as_deref() {
      Some(name) => name.parse()?,
      None => Mode::Rebase,
    };

    let filter = match record.filter {
      Some(FilterRecord::Glob(pattern)) => Some(Filter::glob(&pattern)?),
      Some(FilterRecord::Regex { regex }) => Some(Filter::regex(&regex)?),
      None => None,
    };

    let fallback = match record.fallback.as_deref() {
      Some(name) => Fallback::parse(name)?,
      None => None,
    };

    let hash_options = match record.hash_options {
      Some(options) => {
        let defaults = HashOptions::default();
        HashOptions {
          method: match options.method.as_deref() {
            Some(name) => name.parse()?,
            None => defaults.method,
          },
          shrink: match options.shrink {
            Some(0) => None,
            Some(length) => Some(length),
            None => defaults.shrink,
          },
          append: options.append,
        }
      }
      None => HashOptions::default(),
    };

    let encode_type = record
      .encode_type
      .as_deref()
      .map(EncodeType::from_str)
      .transpose()?;

    Ok(Self {
      mode,
      filter,
      assets_path: record.assets_path,
      base_path: match record.base_path {
        Some(OneOrMany::One(path)) => vec![path],
        Some(OneOrMany::Many(paths)) => paths,
        None => Vec::new(),
      },
      max_size: record.max_size.unwrap_or(DEFAULT_MAX_SIZE_KB),
      fallback,
      use_hash: record.use_hash,
      hash_options,
      encode_type,
      include_uri_fragment: record.include_uri_fragment,
      ignore_fragment_warning: record.ignore_fragment_warning,
      optimize_svg_encode: record.optimize_svg_encode,
      force_relative: record.force_relative,
    })
  }
}

/// Errors raised while building or loading rule configuration.
///
/// These are the only errors that abort a run; every data condition met while rewriting
/// is reported as a warning instead.
#[derive(Debug)]
pub enum ConfigError {
  /// Unrecognised `url` mode name.
  UnknownMode(String),
  /// Unrecognised `fallback` name.
  UnknownFallback(String),
  /// Unrecognised `encodeType` name.
  UnknownEncodeType(String),
  /// Unrecognised hash method name.
  UnknownHashMethod(String),
  /// Glob filter failed to compile.
  InvalidGlob {
    /// Offending pattern.
    pattern: String,
    /// Source glob error.
    source: globset::Error,
  },
  /// Regular expression filter failed to compile.
  InvalidRegex {
    /// Offending pattern.
    pattern: String,
    /// Source regex error.
    source: regex::Error,
  },
  /// Failed to read the configuration file.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the configuration file.
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnknownMode(mode) => write!(f, "unknown url mode: {mode}"),
      Self::UnknownFallback(name) => write!(f, "unknown fallback mode: {name}"),
      Self::UnknownEncodeType(name) => write!(f, "unknown encode type: {name}"),
      Self::UnknownHashMethod(name) => write!(f, "unknown hash method: {name}"),
      Self::InvalidGlob { pattern, source } => {
        write!(f, "invalid glob filter {pattern:?}: {source}")
      }
      Self::InvalidRegex { pattern, source } => {
        write!(f, "invalid regex filter {pattern:?}: {source}")
      }
      Self::Io { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
      Self::Parse { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::InvalidGlob { source, .. } => Some(source),
      Self::InvalidRegex { source, .. } => Some(source),
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
      _ => None,
    }
  }
}
