//! File access for the markup compiler's build pipeline.
//!
//! All cache and source file I/O goes through [`FileService`], which consults
//! an optional host-provided overlay of in-memory editor buffers before
//! touching the real filesystem. This keeps incremental analysis correct when
//! the build runs inside an IDE with unsaved edits open.

#![warn(missing_docs)]

pub mod error;
pub mod overlay;
pub mod service;

pub use error::FsError;
pub use overlay::{MemoryOverlay, OverlayStore};
pub use service::{ChecksumAlgorithm, FileService, FileServiceConfig, UTF8_BOM};
