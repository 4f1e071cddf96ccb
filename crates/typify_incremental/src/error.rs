//! Errors of a rebuild cycle.

use thiserror::Error;
use typify_cache::CacheError;
use typify_common::InternalError;
use typify_config::ConfigError;
use typify_diagnostics::{Diagnostic, DiagnosticRenderer, SummaryRenderer};

use crate::engine::EngineError;

/// Why a coordinator could not be built or a rebuild cycle failed.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The compiler settings handed to the coordinator are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The engine reported errors in the user's sources.
    #[error(
        "[name {instance}] checking engine found the following errors:\n{}",
        render_summary(.diagnostics)
    )]
    Diagnostics {
        /// Instance name of the failing coordinator.
        instance: String,
        /// Every diagnostic gathered in the cycle, in report order.
        diagnostics: Vec<Diagnostic>,
    },

    /// The engine itself failed.
    #[error("[name {instance}] {source}")]
    Engine {
        /// Instance name of the failing coordinator.
        instance: String,
        /// Underlying engine failure.
        source: EngineError,
    },

    /// Reading or writing the output cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A broken invariant, such as a diff path escaping the input tree.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl BuildError {
    /// The diagnostics carried by a [`BuildError::Diagnostics`], if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            BuildError::Diagnostics { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

fn render_summary(diagnostics: &[Diagnostic]) -> String {
    SummaryRenderer.render_all(diagnostics)
}
