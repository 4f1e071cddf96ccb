//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading a configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML or JSON content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// No settings file could be located.
    #[error("cannot locate {0}")]
    NotFound(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
