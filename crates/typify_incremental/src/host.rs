//! The project host: the engine's view of the project.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;
use typify_common::strip_root;
use typify_config::CompilerSettings;

use crate::registry::{FileRegistry, ScriptVersion};
use crate::resolver::{ModuleResolver, ResolvedModule, StandardResolution};

/// Answers the engine's questions about the project: which files are roots,
/// what version each file is at, what a file contains, and where an import
/// points.
///
/// Reads are limited to the input tree, dependency typings, the local
/// typings folder and the engine's own standard library declarations.
#[derive(Debug)]
pub struct ProjectHost {
    input_root: Utf8PathBuf,
    settings: CompilerSettings,
    registry: FileRegistry,
    resolver: ModuleResolver,
}

impl ProjectHost {
    /// Creates a host over `input_root`.
    pub fn new(
        input_root: impl Into<Utf8PathBuf>,
        settings: CompilerSettings,
        registry: FileRegistry,
        resolver: ModuleResolver,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            settings,
            registry,
            resolver,
        }
    }

    /// The input tree root.
    pub fn input_root(&self) -> &Utf8Path {
        &self.input_root
    }

    /// The effective compiler settings.
    pub fn compiler_settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// The file registry.
    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut FileRegistry {
        &mut self.registry
    }

    /// Root files, as absolute paths under the input tree.
    pub fn script_file_names(&self) -> Vec<Utf8PathBuf> {
        self.registry
            .root_files()
            .iter()
            .map(|p| self.input_root.join(p))
            .collect()
    }

    /// Version token for an absolute path.
    pub fn script_version(&self, path: &Utf8Path) -> ScriptVersion {
        match strip_root(&self.input_root, path) {
            Some(relative) => self.registry.revision_of(relative),
            None => ScriptVersion::Unversioned,
        }
    }

    /// Returns `true` if the engine may read `path`.
    pub fn is_admissible(&self, path: &Utf8Path) -> bool {
        if path.starts_with(&self.input_root) || path.starts_with(self.resolver.local_types()) {
            return true;
        }
        let text = path.as_str();
        if text.contains("/node_modules/@types/") || text.contains("/node_modules/at-types") {
            return true;
        }
        path.file_name()
            .is_some_and(|name| name.starts_with("lib.") && name.ends_with(".d.ts"))
    }

    /// Reads a source file on behalf of the engine.
    ///
    /// Returns `None` for files that do not exist and for files outside the
    /// admitted locations.
    pub fn read_source(&self, path: &Utf8Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }
        if !self.is_admissible(path) {
            warn!(%path, "refusing to read file outside the project");
            return None;
        }
        match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(%path, error = %err, "failed to read source");
                None
            }
        }
    }

    /// Resolves each of `names` imported from `containing_file`.
    pub fn resolve_module_names(
        &self,
        names: &[String],
        containing_file: &Utf8Path,
        standard: &dyn StandardResolution,
    ) -> Vec<Option<ResolvedModule>> {
        names
            .iter()
            .map(|name| self.resolver.resolve(name, containing_file, standard))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NoStandardResolution;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        root: Utf8PathBuf,
        host: ProjectHost,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let input = root.join("tmp/input");
        fs::create_dir_all(&input).unwrap();
        let resolver = ModuleResolver::new(&root, root.join("local-types"), BTreeMap::new());
        let mut registry = FileRegistry::new();
        registry.touch(Utf8Path::new("a.ts"));
        registry.touch(Utf8Path::new("a.ts"));
        registry.touch(Utf8Path::new("sub/b.ts"));
        let host = ProjectHost::new(&input, CompilerSettings::default(), registry, resolver);
        Fixture {
            _dir: dir,
            root,
            host,
        }
    }

    fn write(path: &Utf8Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn script_file_names_are_absolute() {
        let fx = fixture();
        let names = fx.host.script_file_names();
        assert_eq!(
            names,
            vec![
                fx.root.join("tmp/input/a.ts"),
                fx.root.join("tmp/input/sub/b.ts")
            ]
        );
    }

    #[test]
    fn script_versions() {
        let fx = fixture();
        let input = fx.host.input_root().to_path_buf();
        assert_eq!(fx.host.script_version(&input.join("a.ts")), ScriptVersion::Revision(1));
        assert_eq!(
            fx.host.script_version(&input.join("sub/b.ts")),
            ScriptVersion::Revision(0)
        );
        assert_eq!(
            fx.host.script_version(&fx.root.join("node_modules/@types/x/index.d.ts")),
            ScriptVersion::Unversioned
        );
    }

    #[test]
    fn reads_input_tree() {
        let fx = fixture();
        let path = fx.host.input_root().join("a.ts");
        write(&path, "let a = 1;");
        assert_eq!(fx.host.read_source(&path).as_deref(), Some("let a = 1;"));
    }

    #[test]
    fn reads_dependency_typings() {
        let fx = fixture();
        let at_types = fx.root.join("node_modules/@types/rsvp/index.d.ts");
        let vendored = fx.root.join("node_modules/at-types-ember/index.d.ts");
        let local = fx.root.join("local-types/foo/index.d.ts");
        for path in [&at_types, &vendored, &local] {
            write(path, "export {};");
            assert!(fx.host.read_source(path).is_some(), "{path}");
        }
    }

    #[test]
    fn reads_standard_library_declarations() {
        let fx = fixture();
        let lib = fx.root.join("toolchain/lib.es2017.d.ts");
        write(&lib, "interface Array<T> {}");
        assert!(fx.host.read_source(&lib).is_some());
    }

    #[test]
    fn rejects_files_outside_project() {
        let fx = fixture();
        let outside = fx.root.join("app/original.ts");
        write(&outside, "let x = 1;");
        assert!(!fx.host.is_admissible(&outside));
        assert!(fx.host.read_source(&outside).is_none());

        let package = fx.root.join("node_modules/lodash/index.d.ts");
        write(&package, "export {};");
        assert!(fx.host.read_source(&package).is_none());
    }

    #[test]
    fn missing_file_is_none() {
        let fx = fixture();
        assert!(fx.host.read_source(&fx.host.input_root().join("nope.ts")).is_none());
    }

    #[test]
    fn resolves_names_in_order() {
        let fx = fixture();
        write(&fx.root.join("local-types/rsvp/index.d.ts"), "export {};");
        let names = vec!["rsvp".to_string(), "missing".to_string()];
        let resolved = fx.host.resolve_module_names(
            &names,
            &fx.host.input_root().join("a.ts"),
            &NoStandardResolution,
        );
        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].is_some());
        assert!(resolved[1].is_none());
    }
}
