//! Accumulator for the diagnostics gathered during one rebuild cycle.

use camino::{Utf8Path, Utf8PathBuf};

use crate::diagnostic::Diagnostic;

/// Collects diagnostics over one rebuild cycle, remembering which input files
/// failed.
///
/// A cycle is single-threaded, so the sink is a plain owned accumulator.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    failed_files: Vec<Utf8PathBuf>,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits diagnostics not tied to a specific input file.
    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diags);
    }

    /// Records the diagnostics of one input file.
    ///
    /// The file counts as failed only when at least one diagnostic was
    /// produced for it.
    pub fn record_file(&mut self, file: &Utf8Path, diags: Vec<Diagnostic>) {
        if diags.is_empty() {
            return;
        }
        self.failed_files.push(file.to_path_buf());
        self.diagnostics.extend(diags);
    }

    /// Returns `true` if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the input files that produced diagnostics, in emission order.
    pub fn failed_files(&self) -> &[Utf8PathBuf] {
        &self.failed_files
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&mut self) -> Vec<Diagnostic> {
        self.failed_files.clear();
        std::mem::take(&mut self.diagnostics)
    }
}
