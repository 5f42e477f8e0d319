use std::path::Path;

/// Render a filesystem path as a URL path.
///
/// The result always uses forward slashes so that emitted references are identical on
/// every platform, regardless of the native directory separator.
pub fn to_url_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::to_url_path;

    #[test]
    fn keeps_forward_slashes() {
        assert_eq!(to_url_path(Path::new("../img/logo.png")), "../img/logo.png");
    }

    #[test]
    fn normalises_backslashes_from_windows_inputs() {
        assert_eq!(to_url_path(Path::new("assets\\img\\intro.png")), "assets/img/intro.png");
    }
}
