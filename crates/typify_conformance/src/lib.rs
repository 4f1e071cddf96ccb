//! Conformance test helpers for the Typify incremental rebuild cycle.
//!
//! Provides a small in-process checking engine ([`ToyEngine`]) and an on-disk
//! project fixture ([`Workspace`]) so integration tests can drive a real
//! [`Coordinator`] through edit, failure, recovery and removal sequences.
//!
//! The toy engine understands just enough of a source file to be useful:
//!
//! - `import ... from '<spec>'` lines are resolved through the host; an
//!   unresolved import is an error
//! - a `@error <message>` marker anywhere on a line is an error at that
//!   position
//! - code output is the source behind a header comment, declaration output is
//!   the `export` lines, and lines tagged `@internal` are left out of
//!   declarations unless the emit mode keeps them

#![warn(missing_docs)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use typify_config::{CompilerSettings, EmitMode};
use typify_diagnostics::{Diagnostic, Location};
use typify_incremental::{
    Artifact, BuildError, BuildReport, CheckingEngine, Coordinator, CoordinatorOptions, Diff,
    EmitOutput, EngineError, ProgramEmit, ProjectHost, ResolvedModule, TreeSnapshot,
};

/// Marker that makes the toy engine report an error.
pub const ERROR_MARKER: &str = "@error";

/// Marker of declarations stripped from declaration output.
pub const INTERNAL_MARKER: &str = "@internal";

/// Counts of engine calls, for asserting which strategy ran.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineCalls {
    /// `emit_file` calls.
    pub file_emits: usize,
    /// `file_diagnostics` calls.
    pub file_checks: usize,
    /// `emit_program` calls.
    pub program_emits: usize,
    /// `pre_emit_diagnostics` calls.
    pub program_checks: usize,
}

/// A line-oriented stand-in for a real checking engine.
#[derive(Debug, Default)]
pub struct ToyEngine {
    /// Calls received so far.
    pub calls: EngineCalls,
}

impl ToyEngine {
    /// Creates an engine with zeroed call counts.
    pub fn new() -> Self {
        Self::default()
    }

    fn check(host: &ProjectHost, path: &Utf8Path) -> Vec<Diagnostic> {
        let Some(source) = host.read_source(path) else {
            return vec![Diagnostic::error(format!("File '{path}' not found."))];
        };
        let mut diagnostics = Vec::new();
        let mut offset = 0;
        for line in source.split_inclusive('\n') {
            if let Some(column) = line.find(ERROR_MARKER) {
                let message = line[column + ERROR_MARKER.len()..].trim();
                diagnostics.push(
                    Diagnostic::error(message)
                        .at(Location::from_offset(path, &source, offset + column)),
                );
            }
            if let Some((column, specifier)) = import_specifier(line) {
                let names = vec![specifier.to_string()];
                let standard = |spec: &str, containing: &Utf8Path| relative_import(spec, containing);
                let resolved = host.resolve_module_names(&names, path, &standard);
                if resolved.first().is_some_and(Option::is_none) {
                    diagnostics.push(
                        Diagnostic::error(format!("Cannot find module '{specifier}'."))
                            .with_code(2307)
                            .at(Location::from_offset(path, &source, offset + column)),
                    );
                }
            }
            offset += line.len();
        }
        diagnostics
    }

    fn artifacts(host: &ProjectHost, path: &Utf8Path, mode: EmitMode) -> Vec<Artifact> {
        let settings = host.compiler_settings();
        let (Some(out_dir), Ok(relative)) =
            (settings.out_dir.as_ref(), path.strip_prefix(host.input_root()))
        else {
            return Vec::new();
        };
        let name = relative.as_str();
        if name.ends_with(".d.ts") {
            return Vec::new();
        }
        let Some(stem) = name.strip_suffix(".ts").or_else(|| name.strip_suffix(".js")) else {
            return Vec::new();
        };
        let source = host.read_source(path).unwrap_or_default();

        let mut artifacts = vec![Artifact::new(
            out_dir.join(format!("{stem}.js")),
            format!("// emitted from {name}\n{source}"),
        )];
        if settings.source_map == Some(true) {
            artifacts.push(Artifact::new(
                out_dir.join(format!("{stem}.js.map")),
                format!(r#"{{"version":3,"file":"{stem}.js","sources":["{name}"]}}"#),
            ));
        }
        if settings.declaration == Some(true) {
            let strip = settings.strip_internal == Some(true) && mode == EmitMode::Normal;
            let declarations: Vec<&str> = source
                .lines()
                .filter(|line| line.starts_with("export "))
                .filter(|line| !(strip && line.contains(INTERNAL_MARKER)))
                .collect();
            artifacts.push(Artifact::new(
                out_dir.join(format!("{stem}.d.ts")),
                declarations.join("\n"),
            ));
        }
        artifacts
    }
}

impl CheckingEngine for ToyEngine {
    fn emit_file(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
        mode: EmitMode,
    ) -> Result<EmitOutput, EngineError> {
        self.calls.file_emits += 1;
        if !Self::check(host, path).is_empty() {
            return Ok(EmitOutput {
                skipped: true,
                artifacts: Vec::new(),
            });
        }
        Ok(EmitOutput {
            skipped: false,
            artifacts: Self::artifacts(host, path, mode),
        })
    }

    fn file_diagnostics(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        self.calls.file_checks += 1;
        Ok(Self::check(host, path))
    }

    fn emit_program(
        &mut self,
        host: &ProjectHost,
        mode: EmitMode,
    ) -> Result<ProgramEmit, EngineError> {
        self.calls.program_emits += 1;
        let mut emit = ProgramEmit::default();
        for path in host.script_file_names() {
            if Self::check(host, &path).is_empty() {
                emit.artifacts.extend(Self::artifacts(host, &path, mode));
            } else {
                emit.skipped = true;
            }
        }
        Ok(emit)
    }

    fn pre_emit_diagnostics(
        &mut self,
        host: &ProjectHost,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        self.calls.program_checks += 1;
        Ok(host
            .script_file_names()
            .iter()
            .flat_map(|path| Self::check(host, path))
            .collect())
    }
}

/// Finds the specifier of an `import ... from '<spec>'` line and its column.
fn import_specifier(line: &str) -> Option<(usize, &str)> {
    if !line.trim_start().starts_with("import ") {
        return None;
    }
    let from = line.find(" from ")? + " from ".len();
    let rest = &line[from..];
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let end = rest[1..].find(quote)?;
    Some((from, &rest[1..1 + end]))
}

/// Resolves `./` and `../` specifiers against the containing file.
fn relative_import(specifier: &str, containing: &Utf8Path) -> Option<ResolvedModule> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return None;
    }
    let base = containing.parent()?.join(specifier);
    [".ts", ".d.ts", ".js", "/index.ts"]
        .iter()
        .map(|ext| Utf8PathBuf::from(format!("{base}{ext}")))
        .find(|candidate| candidate.is_file())
        .map(|resolved_file_name| ResolvedModule {
            resolved_file_name,
            is_external_library_import: false,
        })
}

/// A temporary project: a project directory holding `package.json`, an input
/// tree and an output cache.
pub struct Workspace {
    _dir: TempDir,
    /// The project directory.
    pub project: Utf8PathBuf,
    /// Root of the input tree.
    pub input: Utf8PathBuf,
    /// Root of the output cache.
    pub cache: Utf8PathBuf,
    snapshot: TreeSnapshot,
}

impl Workspace {
    /// Creates an empty project.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let project = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let input = project.join("tmp/input");
        let cache = project.join("tmp/cache");
        fs::create_dir_all(&input).unwrap();
        fs::write(project.join("package.json"), "{}").unwrap();
        Self {
            _dir: dir,
            project,
            input,
            cache,
            snapshot: TreeSnapshot::empty(),
        }
    }

    /// Writes `content` to `rel` under the input tree.
    pub fn write(&self, rel: &str, content: &str) {
        write_file(&self.input.join(rel), content);
    }

    /// Writes `content` to `rel` under the project directory.
    pub fn write_project(&self, rel: &str, content: &str) {
        write_file(&self.project.join(rel), content);
    }

    /// Deletes `rel` from the input tree.
    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.input.join(rel)).unwrap();
    }

    /// Reads `rel` from the output cache.
    pub fn cached(&self, rel: &str) -> Option<String> {
        fs::read_to_string(self.cache.join(rel)).ok()
    }

    /// Options for a coordinator over this workspace.
    pub fn options(&self, settings: CompilerSettings) -> CoordinatorOptions {
        CoordinatorOptions::new(&self.project, &self.input, &self.cache, settings)
    }

    /// A coordinator with default options and the given settings.
    pub fn coordinator(&self, settings: CompilerSettings) -> Coordinator<ToyEngine> {
        Coordinator::new(self.options(settings), ToyEngine::new()).unwrap()
    }

    /// Rescans the input tree and returns the changes since the last call.
    pub fn changes(&mut self) -> Diff {
        let current = TreeSnapshot::scan(&self.input, &typify_config::default_extensions()).unwrap();
        let diff = TreeSnapshot::diff(&self.snapshot, &current);
        self.snapshot = current;
        diff
    }

    /// Rescans the input tree and rebuilds.
    pub fn rebuild(
        &mut self,
        coordinator: &mut Coordinator<ToyEngine>,
    ) -> Result<BuildReport, BuildError> {
        let diff = self.changes();
        coordinator.rebuild(&diff)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings emitting declarations and source maps.
pub fn full_output_settings() -> CompilerSettings {
    CompilerSettings {
        declaration: Some(true),
        source_map: Some(true),
        ..Default::default()
    }
}

fn write_file(path: &Utf8Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
