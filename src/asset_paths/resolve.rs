use std::path::{Component, Path, PathBuf};

use super::filters::has_pathname;
use crate::models::{Asset, Dir};

/// Collapse `.` and `..` components without touching the filesystem.
///
/// Leading `..` components of a relative path are preserved; `..` above the root of an
/// absolute path is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => result.push(".."),
            },
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Resolve `path` against `root` when it is relative, then normalize it.
pub fn absolutize(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&root.join(path))
    }
}

/// Lexical path from `base` to `target`; empty when they are the same.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = normalize_path(base);
    let target = normalize_path(target);
    let common = base
        .components()
        .zip(target.components())
        .take_while(|(left, right)| left == right)
        .count();

    let mut result = PathBuf::new();
    for _ in base.components().skip(common) {
        result.push("..");
    }
    for component in target.components().skip(common) {
        result.push(component.as_os_str());
    }
    result
}

/// Split a reference into pathname, query string and fragment.
///
/// The pathname is not percent-decoded. Data URIs are kept whole since `?` and `#` are
/// part of their payload.
pub fn split_url(url: &str) -> (&str, &str, &str) {
    if url.starts_with("data:") {
        return (url, "", "");
    }

    let (rest, hash) = match url.find('#') {
        Some(index) => url.split_at(index),
        None => (url, ""),
    };
    let (pathname, search) = match rest.find('?') {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    };
    (pathname, search, hash)
}

/// Resolve a raw reference into an [`Asset`].
///
/// `dir` is expected to hold absolute directories. References without a pathname resolve
/// to the declaring stylesheet itself, or to its directory when the file is unknown.
pub fn prepare_asset(url: &str, dir: &Dir, source: Option<&Path>) -> Asset {
    let (pathname, search, hash) = split_url(url);

    let absolute_path = if has_pathname(url) {
        normalize_path(&dir.file.join(pathname.trim_start_matches('/')))
    } else {
        source.map_or_else(|| dir.file.clone(), Path::to_path_buf)
    };
    let relative_path = relative_path(&dir.from, &absolute_path);

    Asset {
        url: url.to_string(),
        pathname: pathname.to_string(),
        absolute_path,
        relative_path,
        search: search.to_string(),
        hash: hash.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> Dir {
        Dir {
            from: PathBuf::from("/project/css"),
            to: PathBuf::from("/project/build"),
            file: PathBuf::from("/project/css/imported"),
        }
    }

    #[test]
    fn normalizes_dot_segments() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn absolutizes_relative_paths_against_root() {
        let root = Path::new("/work");
        assert_eq!(absolutize(Path::new("src/../build"), root), PathBuf::from("/work/build"));
        assert_eq!(absolutize(Path::new("/abs"), root), PathBuf::from("/abs"));
    }

    #[test]
    fn computes_relative_paths() {
        assert_eq!(
            relative_path(Path::new("/p/build"), Path::new("/p/src/img/a.png")),
            PathBuf::from("../src/img/a.png")
        );
        assert_eq!(
            relative_path(Path::new("/p/src"), Path::new("/p/src/img/a.png")),
            PathBuf::from("img/a.png")
        );
        assert_eq!(relative_path(Path::new("/p"), Path::new("/p")), PathBuf::new());
    }

    #[test]
    fn splits_query_and_fragment() {
        assert_eq!(split_url("a.png?v=1#x"), ("a.png", "?v=1", "#x"));
        assert_eq!(split_url("a.eot?#iefix"), ("a.eot", "?", "#iefix"));
        assert_eq!(split_url("a.svg#icon?x"), ("a.svg", "", "#icon?x"));
        assert_eq!(split_url("#only"), ("", "", "#only"));
        assert_eq!(split_url("data:a?b#c"), ("data:a?b#c", "", ""));
    }

    #[test]
    fn decomposition_is_lossless() {
        for url in ["a.png", "a.png?v=1", "a.png#x", "a.png?#x", "#x", "?q", "data:x#y"] {
            let asset = prepare_asset(url, &dir(), None);
            assert_eq!(format!("{}{}{}", asset.pathname, asset.search, asset.hash), url);
        }
    }

    #[test]
    fn prepares_asset_from_url_and_dirs() {
        let asset = prepare_asset("./sprite/some-image.png?test=1#23", &dir(), None);

        assert_eq!(asset, Asset {
            url: "./sprite/some-image.png?test=1#23".into(),
            pathname: "./sprite/some-image.png".into(),
            absolute_path: PathBuf::from("/project/css/imported/sprite/some-image.png"),
            relative_path: PathBuf::from("imported/sprite/some-image.png"),
            search: "?test=1".into(),
            hash: "#23".into(),
        });
    }

    #[test]
    fn root_relative_pathname_joins_file_dir() {
        let asset = prepare_asset("/img/a.png", &dir(), None);
        assert_eq!(asset.absolute_path, PathBuf::from("/project/css/imported/img/a.png"));
    }

    #[test]
    fn assets_without_pathname_resolve_to_declaring_file() {
        let source = Path::new("/project/styles/style.css");
        for url in ["#hash", "%23encodedhash", "data:"] {
            let asset = prepare_asset(url, &dir(), Some(source));
            assert_eq!(asset.absolute_path, PathBuf::from("/project/styles/style.css"));
            assert_eq!(asset.relative_path, PathBuf::from("../styles/style.css"));
        }
    }
}
