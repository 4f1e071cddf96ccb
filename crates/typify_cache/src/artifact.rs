//! Naming of the artifacts emitted for one input file.

use camino::{Utf8Path, Utf8PathBuf};

/// Suffix of emitted code files.
pub const CODE_SUFFIX: &str = ".js";

/// Suffix of external source map files.
pub const MAP_SUFFIX: &str = ".js.map";

/// Suffix of declaration files.
pub const DECLARATION_SUFFIX: &str = ".d.ts";

/// The artifact set of one input file, relative to the cache root.
///
/// Derived by replacing the input's recognized extension: `src/a.ts` emits
/// `src/a.js`, optionally `src/a.js.map`, and optionally `src/a.d.ts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Emitted code.
    pub code: Utf8PathBuf,
    /// External source map (absent when maps are inline or disabled).
    pub map: Utf8PathBuf,
    /// Declaration file (absent when declarations are disabled).
    pub declaration: Utf8PathBuf,
}

impl ArtifactPaths {
    /// Derives the artifact set of `input` given the recognized extensions.
    ///
    /// Returns `None` for declaration inputs, which emit nothing, and for
    /// inputs without a recognized extension.
    pub fn for_input(input: &Utf8Path, extensions: &[String]) -> Option<Self> {
        let name = input.as_str();
        if name.ends_with(DECLARATION_SUFFIX) {
            return None;
        }
        let ext = extensions
            .iter()
            .filter(|ext| name.ends_with(ext.as_str()) && name.len() > ext.len())
            .max_by_key(|ext| ext.len())?;
        let stem = &name[..name.len() - ext.len()];
        Some(Self {
            code: Utf8PathBuf::from(format!("{stem}{CODE_SUFFIX}")),
            map: Utf8PathBuf::from(format!("{stem}{MAP_SUFFIX}")),
            declaration: Utf8PathBuf::from(format!("{stem}{DECLARATION_SUFFIX}")),
        })
    }
}
