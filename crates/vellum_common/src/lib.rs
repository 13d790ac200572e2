//! Shared foundational types for the Vellum build cache subsystem.
//!
//! This crate provides stable content hashing, file-set fingerprints, and the
//! `FileUnit` value type used to describe files flowing through the markup
//! compiler's incremental build pipeline.

#![warn(missing_docs)]

pub mod file_unit;
pub mod fingerprint;
pub mod hash;

pub use file_unit::{file_name, paths_equal, FileUnit};
pub use fingerprint::file_set_fingerprint;
pub use hash::{stable_str_hash, Checksum};
