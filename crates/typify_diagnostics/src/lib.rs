//! Diagnostics reported by the checking engine and their aggregated rendering.
//!
//! This crate provides the structured [`Diagnostic`] the engine hands back
//! (message chain, severity, optional file position), the [`DiagnosticSink`]
//! that accumulates them over one rebuild cycle, and [`DiagnosticRenderer`]
//! implementations that turn them into the one-line-per-diagnostic summary or
//! JSON.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod location;
pub mod message;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use location::Location;
pub use message::MessageChain;
pub use renderer::{DiagnosticRenderer, JsonRenderer, SummaryRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
