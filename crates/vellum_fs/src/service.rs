//! The build file service: overlay-aware filesystem access.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use vellum_common::Checksum;

use crate::error::FsError;
use crate::overlay::OverlayStore;

/// The UTF-8 byte-order mark added to text files persisted to disk.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Construction-time configuration for a [`FileService`].
///
/// Passed in explicitly by the host build task; the service holds no ambient
/// or process-global state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileServiceConfig {
    /// `true` for a real compile that produces build outputs, `false` for a
    /// lightweight analysis-only pass driven by editor tooling.
    pub is_real_build: bool,
}

/// Checksum algorithms the file service can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    /// 128-bit XXH3, the default for cache bookkeeping.
    Xxh3_128,
    /// 256-bit BLAKE3, for hosts that require a cryptographic digest.
    Blake3_256,
}

/// File access for one build of one project.
///
/// Every operation consults the optional overlay of host editor buffers
/// before falling back to the real filesystem, so analysis sees unsaved
/// edits exactly as the compiler will. Text written to disk gains a UTF-8
/// BOM; text written to the overlay does not, since overlay buffers are
/// BOM-less by contract. Cache round-trips rely on reads coming back
/// BOM-less either way.
///
/// One instance serves one project build on one thread. Independent builds
/// may run concurrently as long as each has its own instance and its own
/// cache file paths.
pub struct FileService {
    is_real_build: bool,
    overlay: Option<Arc<dyn OverlayStore>>,
}

impl FileService {
    /// Creates a service with no editor overlay: all I/O hits the filesystem.
    pub fn new(config: FileServiceConfig) -> Self {
        Self {
            is_real_build: config.is_real_build,
            overlay: None,
        }
    }

    /// Creates a service that consults `overlay` before the filesystem.
    pub fn with_overlay(config: FileServiceConfig, overlay: Arc<dyn OverlayStore>) -> Self {
        Self {
            is_real_build: config.is_real_build,
            overlay: Some(overlay),
        }
    }

    /// `true` for a real compile, `false` for an analysis-only pass.
    pub fn is_real_build(&self) -> bool {
        self.is_real_build
    }

    /// `true` when files may live only in a host editor's in-memory buffers.
    pub fn is_hosted_interactively(&self) -> bool {
        self.overlay.is_some()
    }

    /// Returns `true` if `path` exists in the overlay or on disk.
    pub fn exists(&self, path: &str) -> Result<bool, FsError> {
        require_path(path, "exists")?;
        if let Some(overlay) = &self.overlay {
            if overlay.contains(path) {
                return Ok(true);
            }
        }
        Ok(Path::new(path).exists())
    }

    /// Deletes `path` from the overlay and from disk.
    ///
    /// Both views are removed; cache cleanup must not leave a stale overlay
    /// buffer behind. Idempotent: deleting a file that exists in neither
    /// place is not an error.
    pub fn delete(&self, path: &str) -> Result<(), FsError> {
        require_path(path, "delete")?;
        if let Some(overlay) = &self.overlay {
            overlay.remove(path);
        }
        if Path::new(path).exists() {
            std::fs::remove_file(path).map_err(|e| io_err(path, e))?;
        }
        Ok(())
    }

    /// Returns the last change time of `path`, preferring the overlay.
    pub fn last_change_time(&self, path: &str) -> Result<SystemTime, FsError> {
        require_path(path, "last_change_time")?;
        if let Some(overlay) = &self.overlay {
            if let Some(time) = overlay.last_change_time(path) {
                return Ok(time);
            }
        }
        let metadata = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
        metadata.modified().map_err(|e| io_err(path, e))
    }

    /// Reads `path` as raw bytes, preferring the overlay.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        require_path(path, "read")?;
        if let Some(overlay) = &self.overlay {
            if let Some(content) = overlay.read(path) {
                return Ok(content);
            }
        }
        std::fs::read(path).map_err(|e| io_err(path, e))
    }

    /// Reads `path` from disk, bypassing the overlay.
    ///
    /// A second-pass build must see what the first pass actually wrote to
    /// disk, not a stale hosted view of the same path.
    pub fn read_on_disk(&self, path: &str) -> Result<Vec<u8>, FsError> {
        require_path(path, "read_on_disk")?;
        std::fs::read(path).map_err(|e| io_err(path, e))
    }

    /// Reads `path` as UTF-8 text, preferring the overlay.
    ///
    /// A leading byte-order mark is stripped, so callers always see the
    /// BOM-less content that was originally written.
    pub fn read_text(&self, path: &str) -> Result<String, FsError> {
        let bytes = self.read(path)?;
        decode_text(bytes, path)
    }

    /// Reads `path` as UTF-8 text from disk, bypassing the overlay.
    pub fn read_text_on_disk(&self, path: &str) -> Result<String, FsError> {
        let bytes = self.read_on_disk(path)?;
        decode_text(bytes, path)
    }

    /// Writes text content to `path`.
    ///
    /// With an overlay attached the content goes to the host buffer exactly
    /// as given; on disk it is prefixed with a UTF-8 BOM and written in a
    /// single buffered call.
    pub fn write(&self, content: &str, path: &str) -> Result<(), FsError> {
        require_path(path, "write")?;
        if let Some(overlay) = &self.overlay {
            overlay.write(path, content.as_bytes());
            return Ok(());
        }
        let mut buffer = Vec::with_capacity(UTF8_BOM.len() + content.len());
        buffer.extend_from_slice(&UTF8_BOM);
        buffer.extend_from_slice(content.as_bytes());
        std::fs::write(path, &buffer).map_err(|e| io_err(path, e))
    }

    /// Computes the checksum of `path` with the requested algorithm.
    pub fn checksum(&self, path: &str, algorithm: ChecksumAlgorithm) -> Result<Vec<u8>, FsError> {
        let bytes = self.read(path)?;
        Ok(match algorithm {
            ChecksumAlgorithm::Xxh3_128 => Checksum::of_bytes(&bytes).as_bytes().to_vec(),
            ChecksumAlgorithm::Blake3_256 => blake3::hash(&bytes).as_bytes().to_vec(),
        })
    }
}

fn require_path(path: &str, operation: &'static str) -> Result<(), FsError> {
    if path.is_empty() {
        return Err(FsError::EmptyPath { operation });
    }
    Ok(())
}

fn io_err(path: &str, source: std::io::Error) -> FsError {
    FsError::Io {
        path: path.to_string(),
        source,
    }
}

fn decode_text(mut bytes: Vec<u8>, path: &str) -> Result<String, FsError> {
    if bytes.starts_with(&UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    String::from_utf8(bytes).map_err(|_| FsError::Utf8 {
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::MemoryOverlay;
    use std::time::Duration;

    fn disk_service() -> FileService {
        FileService::new(FileServiceConfig { is_real_build: true })
    }

    fn hosted_service(overlay: Arc<MemoryOverlay>) -> FileService {
        FileService::with_overlay(FileServiceConfig { is_real_build: false }, overlay)
    }

    #[test]
    fn disk_write_adds_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.cache");
        let path = path.to_str().unwrap();

        disk_service().write("line one\n", path).unwrap();

        let raw = std::fs::read(path).unwrap();
        assert!(raw.starts_with(&UTF8_BOM));
        assert_eq!(&raw[UTF8_BOM.len()..], b"line one\n");
    }

    #[test]
    fn read_text_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.cache");
        let path = path.to_str().unwrap();

        let service = disk_service();
        service.write("line one\n", path).unwrap();
        assert_eq!(service.read_text(path).unwrap(), "line one\n");
    }

    #[test]
    fn overlay_write_has_no_bom() {
        let overlay = Arc::new(MemoryOverlay::new());
        let service = hosted_service(overlay.clone());

        service.write("buffered\n", "pages/main.vml").unwrap();

        assert_eq!(overlay.read("pages/main.vml").unwrap(), b"buffered\n");
        assert_eq!(service.read_text("pages/main.vml").unwrap(), "buffered\n");
    }

    #[test]
    fn overlay_wins_over_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.vml");
        std::fs::write(&path, b"saved").unwrap();
        let path = path.to_str().unwrap();

        let overlay = Arc::new(MemoryOverlay::new());
        overlay.write(path, b"unsaved");
        let service = hosted_service(overlay);

        assert_eq!(service.read(path).unwrap(), b"unsaved");
    }

    #[test]
    fn read_on_disk_bypasses_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.vml");
        std::fs::write(&path, b"saved").unwrap();
        let path = path.to_str().unwrap();

        let overlay = Arc::new(MemoryOverlay::new());
        overlay.write(path, b"unsaved");
        let service = hosted_service(overlay);

        assert_eq!(service.read_on_disk(path).unwrap(), b"saved");
    }

    #[test]
    fn exists_sees_overlay_only_files() {
        let overlay = Arc::new(MemoryOverlay::new());
        overlay.write("unsaved.vml", b"x");
        let service = hosted_service(overlay);

        assert!(service.exists("unsaved.vml").unwrap());
        assert!(!service.exists("never-created.vml").unwrap());
    }

    #[test]
    fn last_change_time_prefers_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.vml");
        std::fs::write(&path, b"saved").unwrap();
        let path = path.to_str().unwrap();

        let buffer_time = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let overlay = Arc::new(MemoryOverlay::new());
        overlay.insert_with_time(path, b"unsaved", buffer_time);
        let service = hosted_service(overlay);

        assert_eq!(service.last_change_time(path).unwrap(), buffer_time);
    }

    #[test]
    fn delete_removes_overlay_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.cache");
        std::fs::write(&path, b"old").unwrap();
        let path = path.to_str().unwrap();

        let overlay = Arc::new(MemoryOverlay::new());
        overlay.write(path, b"old buffer");
        let service = hosted_service(overlay.clone());

        service.delete(path).unwrap();
        assert!(!overlay.contains(path));
        assert!(!Path::new(path).exists());

        // Deleting again is a no-op, not an error.
        service.delete(path).unwrap();
    }

    #[test]
    fn empty_path_is_rejected() {
        let service = disk_service();
        assert!(matches!(
            service.read(""),
            Err(FsError::EmptyPath { operation: "read" })
        ));
        assert!(matches!(service.exists(""), Err(FsError::EmptyPath { .. })));
        assert!(matches!(service.delete(""), Err(FsError::EmptyPath { .. })));
        assert!(matches!(
            service.last_change_time(""),
            Err(FsError::EmptyPath { .. })
        ));
        assert!(matches!(
            service.write("x", ""),
            Err(FsError::EmptyPath { .. })
        ));
    }

    #[test]
    fn missing_file_read_propagates_io_error() {
        let service = disk_service();
        assert!(matches!(
            service.read("/nonexistent/build.cache"),
            Err(FsError::Io { .. })
        ));
    }

    #[test]
    fn checksum_algorithms_are_stable_and_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.vml");
        std::fs::write(&path, b"<Page/>").unwrap();
        let path = path.to_str().unwrap();

        let service = disk_service();
        let xxh_a = service.checksum(path, ChecksumAlgorithm::Xxh3_128).unwrap();
        let xxh_b = service.checksum(path, ChecksumAlgorithm::Xxh3_128).unwrap();
        let blake = service.checksum(path, ChecksumAlgorithm::Blake3_256).unwrap();

        assert_eq!(xxh_a, xxh_b);
        assert_eq!(xxh_a.len(), 16);
        assert_eq!(blake.len(), 32);
    }

    #[test]
    fn checksum_reads_through_overlay() {
        let overlay = Arc::new(MemoryOverlay::new());
        overlay.write("unsaved.vml", b"buffer content");
        let service = hosted_service(overlay);

        let sum = service
            .checksum("unsaved.vml", ChecksumAlgorithm::Xxh3_128)
            .unwrap();
        assert_eq!(
            sum,
            Checksum::of_bytes(b"buffer content").as_bytes().to_vec()
        );
    }
}
