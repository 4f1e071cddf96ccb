//! The seam to the external checking engine.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typify_config::EmitMode;
use typify_diagnostics::Diagnostic;

use crate::host::ProjectHost;

/// One output file produced by the engine, addressed by absolute path under
/// the output cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Destination path.
    pub path: Utf8PathBuf,
    /// File content.
    pub content: String,
}

impl Artifact {
    /// Creates an artifact.
    pub fn new(path: impl Into<Utf8PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Result of emitting a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitOutput {
    /// Whether the engine declined to emit, typically because of errors.
    #[serde(default)]
    pub skipped: bool,
    /// Files produced.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// Result of emitting the whole program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramEmit {
    /// Whether the engine declined to emit.
    #[serde(default)]
    pub skipped: bool,
    /// Files produced.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// Diagnostics produced while emitting.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Failure talking to the engine, as opposed to diagnostics it reports.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("failed to start checking engine `{command}`: {source}")]
    Spawn {
        /// Command that was run.
        command: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// I/O on the engine channel failed.
    #[error("checking engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine sent something that does not follow the protocol.
    #[error("checking engine protocol error: {0}")]
    Protocol(String),

    /// The engine reported an internal failure of its own.
    #[error("checking engine failed: {0}")]
    Failed(String),
}

/// The type checker and emitter driven by a coordinator.
///
/// Every call receives the [`ProjectHost`] so the engine sees the current
/// root file set, revisions and settings, and can read sources and resolve
/// modules through the host's admission rules. Implementations may cache
/// parses keyed by [`ScriptVersion`](crate::ScriptVersion).
pub trait CheckingEngine {
    /// Emits the outputs of one file.
    fn emit_file(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
        mode: EmitMode,
    ) -> Result<EmitOutput, EngineError>;

    /// Syntactic and semantic diagnostics of one file.
    fn file_diagnostics(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
    ) -> Result<Vec<Diagnostic>, EngineError>;

    /// Emits every file in the program.
    fn emit_program(
        &mut self,
        host: &ProjectHost,
        mode: EmitMode,
    ) -> Result<ProgramEmit, EngineError>;

    /// Whole-program diagnostics gathered before emit.
    fn pre_emit_diagnostics(&mut self, host: &ProjectHost)
        -> Result<Vec<Diagnostic>, EngineError>;
}

impl<E: CheckingEngine + ?Sized> CheckingEngine for Box<E> {
    fn emit_file(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
        mode: EmitMode,
    ) -> Result<EmitOutput, EngineError> {
        (**self).emit_file(host, path, mode)
    }

    fn file_diagnostics(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        (**self).file_diagnostics(host, path)
    }

    fn emit_program(
        &mut self,
        host: &ProjectHost,
        mode: EmitMode,
    ) -> Result<ProgramEmit, EngineError> {
        (**self).emit_program(host, mode)
    }

    fn pre_emit_diagnostics(
        &mut self,
        host: &ProjectHost,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        (**self).pre_emit_diagnostics(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_output_defaults_from_json() {
        let output: EmitOutput = serde_json::from_str("{}").unwrap();
        assert!(!output.skipped);
        assert!(output.artifacts.is_empty());
    }

    #[test]
    fn program_emit_from_json() {
        let json = r#"{
            "artifacts": [{"path": "/out/a.js", "content": "x"}],
            "diagnostics": [{"message": "boom"}]
        }"#;
        let emit: ProgramEmit = serde_json::from_str(json).unwrap();
        assert_eq!(emit.artifacts, vec![Artifact::new("/out/a.js", "x")]);
        assert_eq!(emit.diagnostics.len(), 1);
        assert_eq!(emit.diagnostics[0].text(), "boom");
    }

    #[test]
    fn engine_error_display() {
        let err = EngineError::Protocol("unexpected reply".into());
        assert_eq!(err.to_string(), "checking engine protocol error: unexpected reply");
    }
}
