//! Host-provided overlay of in-memory editor buffers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

/// A view of files that exist only in a host editor's unsaved buffers.
///
/// When the build runs inside an IDE, the authoritative content of an open
/// file is its buffer, not whatever was last saved to disk. The file service
/// consults an `OverlayStore` before every filesystem access so incremental
/// analysis sees the same content the compiler will be handed.
///
/// Overlay content is plain UTF-8 with no byte-order mark; the BOM the
/// service adds on physical writes is a disk-format concern only.
pub trait OverlayStore {
    /// Returns `true` if the overlay holds a buffer for `path`.
    fn contains(&self, path: &str) -> bool;

    /// Returns the buffer content for `path`, if the overlay holds one.
    fn read(&self, path: &str) -> Option<Vec<u8>>;

    /// Replaces or creates the buffer for `path`.
    fn write(&self, path: &str, content: &[u8]);

    /// Removes the buffer for `path`, returning `true` if one existed.
    fn remove(&self, path: &str) -> bool;

    /// Returns the last change time of the buffer for `path`, if held.
    fn last_change_time(&self, path: &str) -> Option<SystemTime>;
}

/// An in-process [`OverlayStore`] backed by a mutex-guarded map.
///
/// Stands in for a host editor's buffer manager in tests and in hosts that
/// marshal buffers into the build process themselves.
#[derive(Default)]
pub struct MemoryOverlay {
    buffers: Mutex<HashMap<String, Buffer>>,
}

struct Buffer {
    content: Vec<u8>,
    modified: SystemTime,
}

impl MemoryOverlay {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer for `path` with an explicit change time.
    ///
    /// Tests use this to model a buffer edited before or after the last
    /// compile without waiting on the wall clock.
    pub fn insert_with_time(&self, path: &str, content: &[u8], modified: SystemTime) {
        let mut buffers = self.buffers.lock().unwrap();
        buffers.insert(
            path.to_string(),
            Buffer {
                content: content.to_vec(),
                modified,
            },
        );
    }
}

impl OverlayStore for MemoryOverlay {
    fn contains(&self, path: &str) -> bool {
        self.buffers.lock().unwrap().contains_key(path)
    }

    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let buffers = self.buffers.lock().unwrap();
        buffers.get(path).map(|b| b.content.clone())
    }

    fn write(&self, path: &str, content: &[u8]) {
        self.insert_with_time(path, content, SystemTime::now());
    }

    fn remove(&self, path: &str) -> bool {
        self.buffers.lock().unwrap().remove(path).is_some()
    }

    fn last_change_time(&self, path: &str) -> Option<SystemTime> {
        let buffers = self.buffers.lock().unwrap();
        buffers.get(path).map(|b| b.modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn write_then_read() {
        let overlay = MemoryOverlay::new();
        overlay.write("pages/main.vml", b"<Page/>");
        assert!(overlay.contains("pages/main.vml"));
        assert_eq!(overlay.read("pages/main.vml").unwrap(), b"<Page/>");
    }

    #[test]
    fn read_missing_is_none() {
        let overlay = MemoryOverlay::new();
        assert!(overlay.read("missing.vml").is_none());
        assert!(!overlay.contains("missing.vml"));
    }

    #[test]
    fn remove_reports_presence() {
        let overlay = MemoryOverlay::new();
        overlay.write("a.vml", b"x");
        assert!(overlay.remove("a.vml"));
        assert!(!overlay.remove("a.vml"));
    }

    #[test]
    fn explicit_change_time_is_reported() {
        let overlay = MemoryOverlay::new();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        overlay.insert_with_time("a.vml", b"x", t);
        assert_eq!(overlay.last_change_time("a.vml").unwrap(), t);
    }

    #[test]
    fn write_overwrites_content() {
        let overlay = MemoryOverlay::new();
        overlay.write("a.vml", b"old");
        overlay.write("a.vml", b"new");
        assert_eq!(overlay.read("a.vml").unwrap(), b"new");
    }
}
