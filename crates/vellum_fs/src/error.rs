//! Error types for build file service operations.

/// Errors that can occur in the build file service.
///
/// An empty path is always a caller bug and is rejected up front. Every
/// other failure is the underlying I/O error with the path attached; the
/// service never retries and never masks a failure.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// An empty path was passed to a file service operation.
    #[error("empty path passed to file service operation '{operation}'")]
    EmptyPath {
        /// The operation that received the empty path.
        operation: &'static str,
    },

    /// An I/O error occurred while accessing a file.
    #[error("file service I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A file expected to hold UTF-8 text did not decode.
    #[error("file {path} is not valid UTF-8")]
    Utf8 {
        /// The path of the undecodable file.
        path: String,
    },
}
