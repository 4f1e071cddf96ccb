//! Configuration types deserialized from `typify.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The top-level adapter configuration parsed from `typify.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Options of the compilation unit itself.
    #[serde(default)]
    pub adapter: AdapterConfig,
    /// How to start the checking engine.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Module resolver fallbacks.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Options of one compilation unit.
#[derive(Debug, Deserialize)]
pub struct AdapterConfig {
    /// Instance name used in log events and error headers.
    #[serde(default = "default_instance_name")]
    pub name: String,
    /// Path to the compiler settings file, relative to the project directory.
    /// Discovered from the nearest `package.json` when absent.
    #[serde(default)]
    pub tsconfig: Option<String>,
    /// Local type overrides folder, relative to the project directory.
    #[serde(default)]
    pub local_types: Option<String>,
    /// Recognized input file extensions.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Root files known before the first diff, relative to the input tree.
    #[serde(default)]
    pub root_files: Vec<String>,
    /// Whether declarations marked internal are emitted.
    #[serde(default)]
    pub emit_mode: EmitMode,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            name: default_instance_name(),
            tsconfig: None,
            local_types: None,
            extensions: default_extensions(),
            root_files: Vec::new(),
            emit_mode: EmitMode::default(),
        }
    }
}

fn default_instance_name() -> String {
    "typify".to_string()
}

/// The extensions recognized when none are configured.
pub fn default_extensions() -> Vec<String> {
    vec![".ts".to_string(), ".js".to_string()]
}

/// Controls emission of declarations marked internal.
///
/// Passed explicitly with every emit request to the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitMode {
    /// Emit as the compiler settings dictate.
    #[default]
    Normal,
    /// Keep declarations marked internal in the emitted declaration files.
    IncludeInternal,
}

/// Command line of the process-backed checking engine.
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    /// The executable to run.
    #[serde(default)]
    pub command: Option<String>,
    /// Extra arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Module resolver fallbacks.
#[derive(Debug, Deserialize)]
pub struct ResolverConfig {
    /// Well-known framework names mapped to a dedicated declaration file,
    /// relative to the project directory.
    #[serde(default = "default_frameworks")]
    pub frameworks: BTreeMap<String, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            frameworks: default_frameworks(),
        }
    }
}

fn default_frameworks() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "ember".to_string(),
        "node_modules/at-types-ember/index.d.ts".to_string(),
    )])
}
