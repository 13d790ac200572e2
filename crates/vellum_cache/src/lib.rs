//! Incremental build cache for the Vellum markup compiler.
//!
//! Between builds the compiler persists two small cache files: the build
//! state (every setting and file-list fingerprint the last compile saw) and
//! the local-reference cache (which files referenced types defined in the
//! target itself and therefore need the second compile pass). At the start
//! of the next build, [`analyzer::analyze`] compares the current inputs
//! against those caches and produces a [`plan::RecompilePlan`] telling the
//! build task exactly what to feed back to the compiler.
//!
//! Every cache read fails safe: a missing or corrupt cache file yields a
//! full-project recompile, never a crash and never a skipped compilation.

#![warn(missing_docs)]

pub mod analyzer;
pub mod error;
pub mod inputs;
pub mod local_refs;
pub mod plan;
pub mod state;

pub use analyzer::analyze;
pub use error::CacheError;
pub use inputs::BuildInputs;
pub use local_refs::{LocalRefCache, LocalRefFile, LocalRefs};
pub use plan::{RecompilePlan, RecompileScope};
pub use state::{BuildState, StateStore};

use vellum_fs::FileService;

/// Deletes both cache files, forcing the next build to start from scratch.
///
/// Invoked by the host build task's clean target. Idempotent.
pub fn clean_caches(
    fs: &FileService,
    state: &StateStore,
    local_refs: &LocalRefCache,
) -> Result<(), CacheError> {
    state.delete(fs)?;
    local_refs.delete(fs)?;
    Ok(())
}
