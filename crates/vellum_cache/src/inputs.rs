//! The current build's full input snapshot.

use vellum_common::{file_set_fingerprint, paths_equal, FileUnit};

/// Everything the incremental analyzer needs to know about the build being
/// started: the project settings and the four tracked file lists.
///
/// The host build task populates one of these per build from its own item
/// groups and properties. The analyzer never reaches outside this snapshot
/// (plus the file service) for input, which is what makes analysis a pure
/// decision over explicit state.
#[derive(Debug, Clone, Default)]
pub struct BuildInputs {
    /// Name of the output target being built.
    pub target_name: String,
    /// Version of the output target.
    pub target_version: String,
    /// Public key token the output target is signed with, or empty.
    pub public_key_token: String,
    /// Output kind (library, executable, ...).
    pub output_type: String,
    /// Source language of the generated code-behind.
    pub language: String,
    /// File extension used for generated source in `language`.
    pub source_extension: String,
    /// Directory the build writes outputs to.
    pub output_path: String,
    /// Root namespace generated types are placed under.
    pub root_namespace: String,
    /// How localization directives are emitted, or empty.
    pub localization_mode: String,
    /// Application hosting mode; changes only affect the generated
    /// application file.
    pub host_mode: String,
    /// Conditional-compilation constants passed to the compiler.
    pub define_constants: String,
    /// Splash image resource, or empty.
    pub splash_image: String,
    /// The application-definition file, or the empty sentinel for library
    /// targets that have none.
    pub app_def_file: FileUnit,
    /// All markup pages in the project.
    pub pages: Vec<FileUnit>,
    /// Loose content files copied alongside the output.
    pub content_files: Vec<FileUnit>,
    /// Code-behind and other source files compiled into the target.
    pub source_files: Vec<FileUnit>,
    /// Referenced libraries the target links against.
    pub references: Vec<FileUnit>,
    /// Path to the markup compiler's own binary; a newer compiler
    /// invalidates everything. Empty skips the check.
    pub compiler_binary: String,
    /// Additional files (project file, targets files) whose change
    /// invalidates everything.
    pub extra_control_files: Vec<String>,
}

impl BuildInputs {
    /// `true` when the project builds an application (it has an
    /// application-definition file) rather than a plain library.
    pub fn is_application_target(&self) -> bool {
        !self.app_def_file.is_empty()
    }

    /// Membership fingerprint of the page list.
    pub fn pages_fingerprint(&self) -> String {
        file_set_fingerprint(self.pages.iter().map(|f| f.path.as_str()))
    }

    /// Membership fingerprint of the content-file list.
    pub fn content_fingerprint(&self) -> String {
        file_set_fingerprint(self.content_files.iter().map(|f| f.path.as_str()))
    }

    /// Membership fingerprint of the source-file list.
    pub fn sources_fingerprint(&self) -> String {
        file_set_fingerprint(self.source_files.iter().map(|f| f.path.as_str()))
    }

    /// Membership fingerprint of the reference list.
    pub fn references_fingerprint(&self) -> String {
        file_set_fingerprint(self.references.iter().map(|f| f.path.as_str()))
    }

    /// The page file names joined with `;`, as persisted in the build state.
    ///
    /// Used to recognize a page that joined the project after its on-disk
    /// timestamp (a pre-existing generated file, say), which the timestamp
    /// comparison alone would miss.
    pub fn page_names(&self) -> String {
        self.pages
            .iter()
            .map(|f| f.file_name())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Returns `true` if `path` is one of the current pages
    /// (case-insensitive full-path comparison).
    pub fn has_page(&self, path: &str) -> bool {
        self.pages.iter().any(|p| paths_equal(&p.path, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs_with_pages(paths: &[&str]) -> BuildInputs {
        BuildInputs {
            pages: paths.iter().map(|p| FileUnit::from_path(*p)).collect(),
            ..BuildInputs::default()
        }
    }

    #[test]
    fn library_target_has_no_application() {
        let inputs = BuildInputs::default();
        assert!(!inputs.is_application_target());
    }

    #[test]
    fn app_def_file_makes_application_target() {
        let inputs = BuildInputs {
            app_def_file: FileUnit::from_path("app.vml"),
            ..BuildInputs::default()
        };
        assert!(inputs.is_application_target());
    }

    #[test]
    fn page_names_are_file_names_only() {
        let inputs = inputs_with_pages(&["src/pages/main.vml", r"src\pages\about.vml"]);
        assert_eq!(inputs.page_names(), "main.vml;about.vml");
    }

    #[test]
    fn has_page_ignores_case() {
        let inputs = inputs_with_pages(&["src/Pages/Main.vml"]);
        assert!(inputs.has_page("src/pages/main.vml"));
        assert!(!inputs.has_page("src/pages/other.vml"));
    }

    #[test]
    fn fingerprints_track_membership() {
        let a = inputs_with_pages(&["a.vml"]);
        let b = inputs_with_pages(&["a.vml", "b.vml"]);
        assert_ne!(a.pages_fingerprint(), b.pages_fingerprint());
        assert_eq!(a.pages_fingerprint(), inputs_with_pages(&["a.vml"]).pages_fingerprint());
    }
}
