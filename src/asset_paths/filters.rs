use regex::Regex;

fn without_pathname_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"^#").expect("invalid fragment regex"),
                Regex::new(r"^%23").expect("invalid encoded fragment regex"),
                Regex::new(r"^data:").expect("invalid data URI regex"),
                Regex::new(r"^[a-z]+://").expect("invalid absolute URI regex"),
            ]
        })
        .as_slice()
}

/// Whether a reference points at a file at all.
///
/// Fragments (plain or already percent-encoded), data URIs and `scheme://` URIs carry no
/// filesystem pathname.
pub fn has_pathname(url: &str) -> bool {
    !without_pathname_patterns()
        .iter()
        .any(|pattern| pattern.is_match(url))
}

/// Determine whether a reference must be left exactly as written.
///
/// Root-relative references (`/img/a.png`) are only processed when search roots are
/// configured, and `~` module references are always left to other tooling.
pub fn should_ignore_url(url: &str, has_base_path: bool) -> bool {
    !has_pathname(url) || (url.starts_with('/') && !has_base_path) || url.starts_with('~')
}
