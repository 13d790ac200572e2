//! The analysis result: what to recompile, and why.

use std::fmt;

use vellum_common::FileUnit;

bitflags::bitflags! {
    /// The categories of work a build still owes.
    ///
    /// Accumulates monotonically during one analysis pass: bits are only
    /// ever added. `all()` is the whole-project-dirty state and `empty()`
    /// means nothing needs recompiling.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RecompileScope: u8 {
        /// The generated application file must be recompiled.
        const APP_FILE = 1 << 0;
        /// Pages changed on disk (or newly added) must be recompiled.
        const MODIFIED_PAGES = 1 << 1;
        /// Pages referencing local types must be recompiled (second pass).
        const LOCAL_TYPE_PAGES = 1 << 2;
        /// The content-file list must be re-emitted.
        const CONTENT_FILES = 1 << 3;
    }
}

impl RecompileScope {
    /// `true` when every category is set (whole project dirty).
    pub fn is_full(&self) -> bool {
        *self == Self::all()
    }

    /// `true` when no category is set (nothing to recompile).
    pub fn is_no_recompile(&self) -> bool {
        self.is_empty()
    }
}

impl fmt::Display for RecompileScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("nothing");
        }
        if self.is_full() {
            return f.write_str("everything");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// The recompilation plan handed to the build task.
///
/// Produced once per build by [`analyze`](crate::analyzer::analyze) and
/// consumed by the pipeline that feeds the compiler; the analyzer itself
/// never acts on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecompilePlan {
    /// Which categories of work the build owes.
    pub scope: RecompileScope,
    /// The pages to recompile, deduplicated.
    pub pages: Vec<FileUnit>,
    /// The application-definition file to recompile, or the empty sentinel
    /// when the application file does not need recompiling.
    pub app_def: FileUnit,
    /// Content files to re-emit (paths as the project records them).
    pub content_files: Vec<String>,
}

impl RecompilePlan {
    /// `true` if the application-definition file must be recompiled.
    pub fn recompiles_app_def(&self) -> bool {
        !self.app_def.is_empty()
    }
}
