//! Configuration file loading and validation.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::settings::CompilerSettings;
use crate::types::ProjectConfig;

/// Name of the adapter configuration file within a project directory.
pub const CONFIG_FILE: &str = "typify.toml";

/// Name of the compiler settings file placed beside `package.json`.
pub const SETTINGS_FILE: &str = "tsconfig.json";

/// Loads and validates `typify.toml` from a project directory.
pub fn load_config(project_dir: &Utf8Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `typify.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.adapter.name.is_empty() {
        return Err(ConfigError::MissingField("adapter.name".to_string()));
    }
    if config.adapter.extensions.is_empty() {
        return Err(ConfigError::MissingField("adapter.extensions".to_string()));
    }
    if let Some(ext) = config
        .adapter
        .extensions
        .iter()
        .find(|ext| !ext.starts_with('.') || ext.len() < 2)
    {
        return Err(ConfigError::ValidationError(format!(
            "extension '{ext}' must start with '.'"
        )));
    }
    if config.engine.command.as_deref() == Some("") {
        return Err(ConfigError::MissingField("engine.command".to_string()));
    }
    Ok(())
}

#[derive(Deserialize)]
struct SettingsFile {
    #[serde(default, rename = "compilerOptions")]
    compiler_options: CompilerSettings,
}

/// Loads the compiler settings file at `path`.
///
/// A relative `baseUrl` is made absolute against the file's directory.
pub fn load_settings(path: &Utf8Path) -> Result<CompilerSettings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or(Utf8Path::new("."));
    load_settings_from_str(&content, base_dir)
}

/// Parses compiler settings from the text of a settings file.
///
/// The file may contain comments and trailing commas.
pub fn load_settings_from_str(
    content: &str,
    base_dir: &Utf8Path,
) -> Result<CompilerSettings, ConfigError> {
    let file: SettingsFile =
        json5::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let mut settings = file.compiler_options;
    settings.absolutize_base_url(base_dir);
    settings.validate()?;
    Ok(settings)
}

/// Walks up from `start` to the nearest directory containing `package.json`
/// and returns the settings file path beside it.
pub fn find_settings_file(start: &Utf8Path) -> Result<Utf8PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join("package.json").is_file() {
            return Ok(current.join(SETTINGS_FILE));
        }
        if !current.pop() {
            return Err(ConfigError::NotFound(format!(
                "package.json in {start} or any parent directory"
            )));
        }
    }
}

/// Loads the compiler settings of the project enclosing `start`.
pub fn load_project_settings(start: &Utf8Path) -> Result<CompilerSettings, ConfigError> {
    let path = find_settings_file(start)?;
    load_settings(&path)
}
