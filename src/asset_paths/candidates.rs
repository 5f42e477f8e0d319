use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::resolve::absolutize;

/// Generate the candidate files for a reference when search roots are configured.
///
/// Each base path is resolved against the source directory (absolute bases are kept as
/// they are) and joined with the pathname after stripping its leading slashes, so every
/// candidate stays under its base. Order follows the configured bases; duplicates are
/// dropped.
pub fn base_path_candidates(base_paths: &[PathBuf], from: &Path, pathname: &str) -> Vec<PathBuf> {
    if base_paths.is_empty() {
        return Vec::new();
    }

    let mut builder = CandidateBuilder::new(from, pathname);
    for base in base_paths {
        builder.add_base(base);
    }
    builder.finish()
}

struct CandidateBuilder<'a> {
    from: &'a Path,
    relative: &'a str,
    seen: BTreeSet<PathBuf>,
    result: Vec<PathBuf>,
}

impl<'a> CandidateBuilder<'a> {
    fn new(from: &'a Path, pathname: &'a str) -> Self {
        let relative = pathname.trim_start_matches('/');

        Self {
            from,
            relative,
            seen: BTreeSet::new(),
            result: Vec::new(),
        }
    }

    fn add_base(&mut self, base: &Path) {
        let root = absolutize(base, self.from);
        self.push(absolutize(Path::new(self.relative), &root));
    }

    fn finish(self) -> Vec<PathBuf> {
        self.result
    }

    fn push(&mut self, candidate: PathBuf) {
        if self.seen.insert(candidate.clone()) {
            self.result.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::base_path_candidates;

    const FROM: &str = "/project/styles";

    #[test]
    fn returns_empty_without_bases() {
        assert!(base_path_candidates(&[], Path::new(FROM), "img/a.png").is_empty());
    }

    #[test]
    fn joins_absolute_base_path() {
        let candidates = base_path_candidates(
            &[PathBuf::from("/project/node_modules")],
            Path::new(FROM),
            "./img/image.png",
        );
        assert_eq!(candidates, vec![PathBuf::from("/project/node_modules/img/image.png")]);
    }

    #[test]
    fn resolves_relative_base_path_against_source_dir() {
        let candidates =
            base_path_candidates(&[PathBuf::from("../base-path")], Path::new(FROM), "./img/image.png");
        assert_eq!(candidates, vec![PathBuf::from("/project/base-path/img/image.png")]);
    }

    #[test]
    fn strips_leading_slash_from_pathname() {
        let candidates = base_path_candidates(
            &[PathBuf::from("/project/node_modules"), PathBuf::from("/some_base_path")],
            Path::new(FROM),
            "/img/image.png",
        );
        assert_eq!(candidates, vec![
            PathBuf::from("/project/node_modules/img/image.png"),
            PathBuf::from("/some_base_path/img/image.png"),
        ]);
    }

    #[test]
    fn protocol_relative_pathnames_stay_under_the_base() {
        let bases = [PathBuf::from("/project/vendor"), PathBuf::from("../lib")];
        for pathname in ["//cdn.example.com/a.png", "///etc/hosts"] {
            let candidates = base_path_candidates(&bases, Path::new(FROM), pathname);
            assert_eq!(candidates.len(), 2);
            assert!(candidates[0].starts_with("/project/vendor"), "{pathname}");
            assert!(candidates[1].starts_with("/project/lib"), "{pathname}");
        }
        assert_eq!(
            base_path_candidates(&bases[..1], Path::new(FROM), "//cdn.example.com/a.png"),
            vec![PathBuf::from("/project/vendor/cdn.example.com/a.png")]
        );
    }

    #[test]
    fn deduplicates_equivalent_bases() {
        let candidates = base_path_candidates(
            &[PathBuf::from("/project/lib"), PathBuf::from("../lib")],
            Path::new(FROM),
            "a.png",
        );
        assert_eq!(candidates, vec![PathBuf::from("/project/lib/a.png")]);
    }
}
