//! Module resolution with project-local fallbacks.
//!
//! Standard resolution always wins. When it fails, a short list of candidate
//! typings files is probed in order:
//!
//! 1. framework overrides, e.g. `ember` mapped to a vendored typings package
//! 2. `<local_types>/ember-config-environment.d.ts` for any specifier ending
//!    in `/config/environment`
//! 3. otherwise `<local_types>/<m>/index.d.ts` and then
//!    `<project>/node_modules/@types/<m>/index.d.ts`, with any `npm:` prefix
//!    stripped from `<m>`

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Suffix of application config-environment imports.
pub const CONFIG_ENVIRONMENT_SUFFIX: &str = "/config/environment";

/// Typings file standing in for every config-environment import.
pub const CONFIG_ENVIRONMENT_TYPINGS: &str = "ember-config-environment.d.ts";

/// A successfully resolved import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModule {
    /// Absolute path of the file the import resolves to.
    pub resolved_file_name: Utf8PathBuf,
    /// Whether the file belongs to an external library rather than the
    /// project's own sources.
    #[serde(default)]
    pub is_external_library_import: bool,
}

impl ResolvedModule {
    /// A resolution to an external library typings file.
    pub fn external(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            resolved_file_name: path.into(),
            is_external_library_import: true,
        }
    }
}

/// The engine's own resolution algorithm, consulted first.
pub trait StandardResolution {
    /// Resolves `specifier` imported from `containing_file`.
    fn resolve(&self, specifier: &str, containing_file: &Utf8Path) -> Option<ResolvedModule>;
}

impl<F> StandardResolution for F
where
    F: Fn(&str, &Utf8Path) -> Option<ResolvedModule>,
{
    fn resolve(&self, specifier: &str, containing_file: &Utf8Path) -> Option<ResolvedModule> {
        self(specifier, containing_file)
    }
}

/// Standard resolution that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStandardResolution;

impl StandardResolution for NoStandardResolution {
    fn resolve(&self, _specifier: &str, _containing_file: &Utf8Path) -> Option<ResolvedModule> {
        None
    }
}

/// Resolves import specifiers for one project.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    project_dir: Utf8PathBuf,
    local_types: Utf8PathBuf,
    frameworks: BTreeMap<String, Utf8PathBuf>,
}

impl ModuleResolver {
    /// Creates a resolver. Framework override paths are taken as given.
    pub fn new(
        project_dir: impl Into<Utf8PathBuf>,
        local_types: impl Into<Utf8PathBuf>,
        frameworks: BTreeMap<String, Utf8PathBuf>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            local_types: local_types.into(),
            frameworks,
        }
    }

    /// The local typings folder.
    pub fn local_types(&self) -> &Utf8Path {
        &self.local_types
    }

    /// Resolves one specifier, first through `standard` and then through the
    /// fallback candidates.
    pub fn resolve(
        &self,
        specifier: &str,
        containing_file: &Utf8Path,
        standard: &dyn StandardResolution,
    ) -> Option<ResolvedModule> {
        if let Some(resolved) = standard.resolve(specifier, containing_file) {
            trace!(specifier, resolved = %resolved.resolved_file_name, "standard resolution");
            return Some(resolved);
        }
        for candidate in self.candidates(specifier) {
            if candidate.is_file() {
                trace!(specifier, resolved = %candidate, "fallback resolution");
                return Some(ResolvedModule::external(candidate));
            }
        }
        debug!(specifier, containing = %containing_file, "unable to resolve module");
        None
    }

    /// Fallback candidates for `specifier`, in probe order.
    pub fn candidates(&self, specifier: &str) -> Vec<Utf8PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = self.frameworks.get(specifier) {
            candidates.push(path.clone());
        }
        if specifier.ends_with(CONFIG_ENVIRONMENT_SUFFIX) {
            candidates.push(self.local_types.join(CONFIG_ENVIRONMENT_TYPINGS));
        } else {
            let module = specifier.strip_prefix("npm:").unwrap_or(specifier);
            candidates.push(self.local_types.join(module).join("index.d.ts"));
            candidates.push(
                self.project_dir
                    .join("node_modules")
                    .join("@types")
                    .join(module)
                    .join("index.d.ts"),
            );
        }
        candidates
    }
}
