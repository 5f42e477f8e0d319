//! Lexical resolution of stylesheet asset references.
//!
//! Nothing in this module touches the filesystem. Resolution, the ignore gate, search-root
//! candidates and separator normalisation live in focused submodules so each can be tested
//! on its own; the strategies and the materializer build on top of them.

mod candidates;
mod filters;
mod resolve;
mod url_path;

pub use candidates::base_path_candidates;
pub use filters::{has_pathname, should_ignore_url};
pub use resolve::{absolutize, normalize_path, prepare_asset, relative_path, split_url};
pub use url_path::to_url_path;
