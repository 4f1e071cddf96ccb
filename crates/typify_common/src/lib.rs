//! Shared foundational types used across the Typify incremental compiler adapter.
//!
//! This crate provides relative input path normalization and the internal
//! error type used for broken invariants.

#![warn(missing_docs)]

pub mod path;
pub mod result;

pub use path::{normalize_relative, strip_root};
pub use result::{InternalError, TypifyResult};
