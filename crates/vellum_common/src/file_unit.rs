//! The unit of "a file that needs action" in the incremental build pipeline.

/// A file tracked by the markup compiler, with its project metadata.
///
/// Carries the path plus the optional link alias and logical name the project
/// system attached to the item. Instances are created fresh for each build
/// analysis; they have no identity beyond the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUnit {
    /// The file path as the project system reports it.
    pub path: String,
    /// Project link alias, or empty if the item has none.
    pub link_alias: String,
    /// Project logical name, or empty if the item has none.
    pub logical_name: String,
}

impl FileUnit {
    /// Creates a file unit with full project metadata.
    pub fn new(
        path: impl Into<String>,
        link_alias: impl Into<String>,
        logical_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            link_alias: link_alias.into(),
            logical_name: logical_name.into(),
        }
    }

    /// Creates a file unit from a bare path with no project metadata.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::new(path, "", "")
    }

    /// The sentinel "no file" value.
    ///
    /// Used where an absent file must be representable without an `Option`,
    /// e.g. "no application-definition file to recompile".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if this is the sentinel "no file" value.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns the final path component of this unit's path.
    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }
}

/// Returns the final component of a path, accepting both `/` and `\`
/// separators since project files may record either.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Compares two paths for equality, ignoring case.
///
/// Cache files record paths as the project system spelled them at the time,
/// which on case-insensitive filesystems may differ from the current
/// spelling. All membership and dedup checks in the build cache use this
/// comparison so a case-only respelling never causes a spurious rebuild or a
/// duplicated entry.
pub fn paths_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel() {
        let unit = FileUnit::empty();
        assert!(unit.is_empty());
        assert_eq!(unit.path, "");
    }

    #[test]
    fn from_path_has_no_metadata() {
        let unit = FileUnit::from_path("pages/main.vml");
        assert!(!unit.is_empty());
        assert_eq!(unit.link_alias, "");
        assert_eq!(unit.logical_name, "");
    }

    #[test]
    fn file_name_forward_slashes() {
        assert_eq!(file_name("src/pages/main.vml"), "main.vml");
    }

    #[test]
    fn file_name_back_slashes() {
        assert_eq!(file_name(r"src\pages\main.vml"), "main.vml");
    }

    #[test]
    fn file_name_bare() {
        assert_eq!(file_name("main.vml"), "main.vml");
    }

    #[test]
    fn paths_equal_ignores_case() {
        assert!(paths_equal("Pages/Main.vml", "pages/main.vml"));
    }

    #[test]
    fn paths_equal_distinct_paths() {
        assert!(!paths_equal("pages/a.vml", "pages/b.vml"));
    }

    #[test]
    fn paths_equal_non_ascii() {
        assert!(paths_equal("pages/Überblick.vml", "pages/überblick.vml"));
    }
}
