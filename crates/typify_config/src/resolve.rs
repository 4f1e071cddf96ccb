//! Resolution of `typify.toml` values against the project directory.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ConfigError;
use crate::loader::find_settings_file;
use crate::types::{EmitMode, ProjectConfig};

/// Default name of the local type overrides folder.
pub const DEFAULT_LOCAL_TYPES: &str = "local-types";

/// Adapter options with every path made absolute.
#[derive(Debug, Clone)]
pub struct ResolvedAdapter {
    /// Instance name.
    pub name: String,
    /// The project directory all relative paths were resolved against.
    pub project_dir: Utf8PathBuf,
    /// Absolute path of the compiler settings file.
    pub settings_file: Utf8PathBuf,
    /// Absolute path of the local type overrides folder.
    pub local_types: Utf8PathBuf,
    /// Recognized input extensions.
    pub extensions: Vec<String>,
    /// Pre-seeded root files, relative to the input tree.
    pub root_files: Vec<String>,
    /// Emit mode passed to every emit request.
    pub emit_mode: EmitMode,
    /// Framework declaration overrides, absolute.
    pub frameworks: BTreeMap<String, Utf8PathBuf>,
}

/// Resolves relative paths in `config` against `project_dir`.
///
/// The settings file is taken from `adapter.tsconfig` when present, otherwise
/// discovered beside the nearest `package.json` above `project_dir`.
pub fn resolve_adapter(
    config: &ProjectConfig,
    project_dir: &Utf8Path,
) -> Result<ResolvedAdapter, ConfigError> {
    let settings_file = match &config.adapter.tsconfig {
        Some(path) => absolute(project_dir, path),
        None => find_settings_file(project_dir)?,
    };

    let local_types = absolute(
        project_dir,
        config
            .adapter
            .local_types
            .as_deref()
            .unwrap_or(DEFAULT_LOCAL_TYPES),
    );

    let frameworks = config
        .resolver
        .frameworks
        .iter()
        .map(|(name, path)| (name.clone(), absolute(project_dir, path)))
        .collect();

    Ok(ResolvedAdapter {
        name: config.adapter.name.clone(),
        project_dir: project_dir.to_path_buf(),
        settings_file,
        local_types,
        extensions: config.adapter.extensions.clone(),
        root_files: config.adapter.root_files.clone(),
        emit_mode: config.adapter.emit_mode,
        frameworks,
    })
}

fn absolute(base: &Utf8Path, path: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn explicit_paths_resolved_against_project() {
        let toml = r#"
[adapter]
name = "app"
tsconfig = "cfg/tsconfig.json"
local_types = "types"
"#;
        let config = load_config_from_str(toml).unwrap();
        let resolved = resolve_adapter(&config, Utf8Path::new("/work/app")).unwrap();
        assert_eq!(resolved.name, "app");
        assert_eq!(
            resolved.settings_file,
            Utf8PathBuf::from("/work/app/cfg/tsconfig.json")
        );
        assert_eq!(resolved.local_types, Utf8PathBuf::from("/work/app/types"));
        assert_eq!(
            resolved.frameworks["ember"],
            Utf8PathBuf::from("/work/app/node_modules/at-types-ember/index.d.ts")
        );
    }

    #[test]
    fn absolute_paths_kept() {
        let toml = r#"
[adapter]
tsconfig = "/etc/tsconfig.json"
local_types = "/opt/types"
"#;
        let config = load_config_from_str(toml).unwrap();
        let resolved = resolve_adapter(&config, Utf8Path::new("/work/app")).unwrap();
        assert_eq!(resolved.settings_file, Utf8PathBuf::from("/etc/tsconfig.json"));
        assert_eq!(resolved.local_types, Utf8PathBuf::from("/opt/types"));
    }

    #[test]
    fn default_local_types_folder() {
        let config = load_config_from_str("[adapter]\ntsconfig = \"tsconfig.json\"\n").unwrap();
        let resolved = resolve_adapter(&config, Utf8Path::new("/work/app")).unwrap();
        assert_eq!(resolved.local_types, Utf8PathBuf::from("/work/app/local-types"));
    }

    #[test]
    fn settings_discovered_from_package_json() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        std::fs::write(root.join("package.json"), "{}").unwrap();

        let config = load_config_from_str("").unwrap();
        let resolved = resolve_adapter(&config, &root).unwrap();
        assert_eq!(resolved.settings_file, root.join("tsconfig.json"));
    }
}
