//! Incremental rebuild orchestration around an external checking engine.
//!
//! A [`Coordinator`] owns one compilation unit: the [`FileRegistry`] of known
//! input files and their revisions, the [`ProjectHost`] view handed to the
//! engine, and the output cache writer. Each [`Coordinator::rebuild`] takes a
//! [`Diff`] of the input tree and decides between re-emitting the touched files
//! and a full program emit, recovering with a full build after a failed cycle.

#![warn(missing_docs)]

pub mod coordinator;
pub mod diff;
pub mod engine;
pub mod error;
pub mod host;
pub mod registry;
pub mod resolver;
pub mod snapshot;

pub use coordinator::{BuildReport, BuildState, Coordinator, CoordinatorOptions, Phase, Strategy};
pub use diff::Diff;
pub use engine::{Artifact, CheckingEngine, EmitOutput, EngineError, ProgramEmit};
pub use error::BuildError;
pub use host::ProjectHost;
pub use registry::{FileRegistry, ScriptVersion};
pub use resolver::{ModuleResolver, NoStandardResolution, ResolvedModule, StandardResolution};
pub use snapshot::TreeSnapshot;
pub use typify_config::EmitMode;
