#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod encode;
pub mod hash;
pub mod materialize;
pub mod mime;
pub mod models;
pub mod parser;
pub mod rewriter;
pub mod selection;
pub mod strategy;

pub use config::{
  ConfigError, EncodeType, Fallback, Filter, Mode, RuleSpec, UrlOptions, DEFAULT_CONFIG_FILE,
};
pub use hash::{HashMethod, HashOptions, content_hash};
pub use models::{Asset, Declaration, Dependency, Dir, Report, RewriteResult, Warning};
pub use rewriter::{StylesheetPaths, UrlRewriter};
pub use selection::AssetInclusion;
