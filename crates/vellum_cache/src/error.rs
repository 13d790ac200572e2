//! Error types for cache operations.

use vellum_fs::FsError;

/// Errors that can occur while loading, saving, or analyzing build caches.
///
/// Corrupt cache content is reported as its own variant so the analyzer can
/// downgrade it to "cache absent" (a full recompile) instead of failing the
/// build. I/O failures are never downgraded; they propagate to the caller
/// unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A file service operation failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// A cache file exists but its content cannot be interpreted.
    #[error("corrupt cache file {path}: {reason}")]
    CorruptCache {
        /// The cache file path.
        path: String,
        /// What made the content uninterpretable.
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn corrupt(path: &str, reason: impl Into<String>) -> Self {
        Self::CorruptCache {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_display() {
        let err = CacheError::corrupt("obj/localref.cache", "record has 2 fields, expected 3");
        assert_eq!(
            format!("{err}"),
            "corrupt cache file obj/localref.cache: record has 2 fields, expected 3"
        );
    }

    #[test]
    fn fs_error_passes_through() {
        let err = CacheError::from(FsError::EmptyPath { operation: "read" });
        assert!(format!("{err}").contains("empty path"));
    }
}
