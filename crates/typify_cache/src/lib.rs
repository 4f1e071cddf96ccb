//! The on-disk output cache.
//!
//! The cache root mirrors the input tree's relative structure. This crate
//! writes emitted artifacts into it and removes the artifact set of an input
//! file once that file disappears from the input tree.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod writer;

pub use artifact::ArtifactPaths;
pub use error::CacheError;
pub use writer::OutputCacheWriter;
