//! Loading of the adapter's `typify.toml` and the engine's compiler settings.
//!
//! Two files configure a build: `typify.toml` holds the adapter's own options
//! (instance name, local types folder, recognized extensions, engine command),
//! and a JSON settings file (`tsconfig.json`) holds the compiler settings
//! passed through to the checking engine.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod settings;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    find_settings_file, load_config, load_config_from_str, load_project_settings,
    load_settings, load_settings_from_str,
};
pub use resolve::{resolve_adapter, ResolvedAdapter};
pub use settings::CompilerSettings;
pub use types::*;
