//! Stable hashing for cache fingerprints and file checksums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Computes a stable 64-bit hash of a string using XXH3.
///
/// The result is persisted inside file-set fingerprints and compared across
/// process invocations, so it must never depend on randomized per-process
/// seeds. XXH3 is seedless and produces identical output on every run and
/// every platform.
pub fn stable_str_hash(value: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(value.as_bytes())
}

/// A 128-bit content checksum computed with XXH3.
///
/// Two files with the same `Checksum` are assumed to have identical content.
/// Used by the build file service to answer checksum queries from the host
/// build system and by tests to verify cache file round-trips.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum([u8; 16]);

impl Checksum {
    /// Computes the checksum of a byte slice.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }

    /// Returns the raw checksum bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}
