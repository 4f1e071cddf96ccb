//! Compiler settings passed through to the checking engine.
//!
//! Only the settings the adapter itself reads or validates are typed; every
//! other key of `compilerOptions` is preserved verbatim so the engine sees the
//! file as written.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const TARGETS: &[&str] = &[
    "es3", "es5", "es6", "es2015", "es2016", "es2017", "es2018", "es2019", "es2020", "es2021",
    "es2022", "es2023", "esnext",
];

const MODULES: &[&str] = &[
    "none", "commonjs", "amd", "umd", "system", "es6", "es2015", "es2020", "es2022", "esnext",
    "node16", "nodenext", "preserve",
];

const MODULE_RESOLUTIONS: &[&str] = &["classic", "node", "node10", "node16", "nodenext", "bundler"];

/// The `compilerOptions` object of the settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    /// Language level of the emitted code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Module system of the emitted code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// The engine's standard module resolution strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_resolution: Option<String>,
    /// Emit declaration files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<bool>,
    /// Emit external source map files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<bool>,
    /// Embed source maps in the emitted code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_source_map: Option<bool>,
    /// Drop declarations marked internal from declaration files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_internal: Option<bool>,
    /// Skip emission of files with errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_emit_on_error: Option<bool>,
    /// Accept plain script files as inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_js: Option<bool>,
    /// Base directory for non-relative module names. Absolute after loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Utf8PathBuf>,
    /// Root of the input tree. Forced to the input root by the coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<Utf8PathBuf>,
    /// Root of the output cache. Forced to the cache root by the coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<Utf8PathBuf>,
    /// Every other option, untouched.
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl CompilerSettings {
    /// Makes a relative `baseUrl` absolute against `base_dir`.
    pub fn absolutize_base_url(&mut self, base_dir: &Utf8Path) {
        if let Some(base_url) = &self.base_url {
            if base_url.is_relative() {
                self.base_url = Some(base_dir.join(base_url));
            }
        }
    }

    /// Checks enumerated values and mutually exclusive options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_one_of("target", self.target.as_deref(), TARGETS)?;
        check_one_of("module", self.module.as_deref(), MODULES)?;
        check_one_of(
            "moduleResolution",
            self.module_resolution.as_deref(),
            MODULE_RESOLUTIONS,
        )?;
        if self.source_map == Some(true) && self.inline_source_map == Some(true) {
            return Err(ConfigError::ValidationError(
                "option 'sourceMap' cannot be specified with option 'inlineSourceMap'".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_one_of(option: &str, value: Option<&str>, allowed: &[&str]) -> Result<(), ConfigError> {
    match value {
        Some(v) if !allowed.contains(&v.to_ascii_lowercase().as_str()) => {
            Err(ConfigError::ValidationError(format!(
                "option '{option}' must be one of {}, got '{v}'",
                allowed.join(", ")
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CompilerSettings {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn typed_and_untyped_options() {
        let s = parse(
            r#"{
                "target": "ES6",
                "allowJs": true,
                "noEmitOnError": true,
                "emitDecoratorMetadata": true,
                "lib": ["dom", "es2017"]
            }"#,
        );
        assert_eq!(s.target.as_deref(), Some("ES6"));
        assert_eq!(s.allow_js, Some(true));
        assert_eq!(s.no_emit_on_error, Some(true));
        assert_eq!(s.other["emitDecoratorMetadata"], serde_json::json!(true));
        assert_eq!(s.other["lib"], serde_json::json!(["dom", "es2017"]));
    }

    #[test]
    fn serialize_keeps_unknown_keys_and_skips_unset() {
        let s = parse(r#"{"declaration": true, "experimentalDecorators": true}"#);
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"declaration": true, "experimentalDecorators": true})
        );
    }

    #[test]
    fn validate_accepts_case_insensitive_target() {
        let s = parse(r#"{"target": "ES2017", "module": "CommonJS", "moduleResolution": "node"}"#);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_target() {
        let s = parse(r#"{"target": "es1"}"#);
        let err = s.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("'target'"));
    }

    #[test]
    fn validate_rejects_both_map_kinds() {
        let s = parse(r#"{"sourceMap": true, "inlineSourceMap": true}"#);
        assert!(s.validate().is_err());
    }

    #[test]
    fn base_url_made_absolute() {
        let mut s = parse(r#"{"baseUrl": "src"}"#);
        s.absolutize_base_url(Utf8Path::new("/project"));
        assert_eq!(s.base_url, Some(Utf8PathBuf::from("/project/src")));
    }

    #[test]
    fn absolute_base_url_untouched() {
        let mut s = parse(r#"{"baseUrl": "/elsewhere"}"#);
        s.absolutize_base_url(Utf8Path::new("/project"));
        assert_eq!(s.base_url, Some(Utf8PathBuf::from("/elsewhere")));
    }
}
