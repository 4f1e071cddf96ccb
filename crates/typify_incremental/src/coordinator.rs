//! The incremental build coordinator.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, info_span, trace, warn};
use typify_cache::OutputCacheWriter;
use typify_common::normalize_relative;
use typify_config::resolve::DEFAULT_LOCAL_TYPES;
use typify_config::{default_extensions, CompilerSettings, EmitMode, ResolvedAdapter, ResolverConfig};
use typify_diagnostics::DiagnosticSink;

use crate::diff::{is_recognized, Diff};
use crate::engine::{Artifact, CheckingEngine, EngineError};
use crate::error::BuildError;
use crate::host::ProjectHost;
use crate::registry::FileRegistry;
use crate::resolver::ModuleResolver;

static NEXT_INSTANCE: AtomicUsize = AtomicUsize::new(0);

/// How a successful rebuild was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The whole program was emitted.
    Full,
    /// Only the touched files were emitted.
    Incremental,
    /// The touched files were emitted cleanly after a failed cycle, then the
    /// whole program was emitted again.
    Recovery,
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// How the cycle was carried out.
    pub strategy: Strategy,
    /// Number of artifacts written.
    pub emitted: usize,
    /// Number of artifacts deleted.
    pub removed: usize,
}

/// Whether the first full build has happened yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No rebuild has run; the next one is a full build.
    AwaitingFirstBuild,
    /// The first full build has been attempted.
    Steady,
}

/// The coordinator's state between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildState {
    /// Current phase.
    pub phase: Phase,
    /// Whether the last cycle failed; the next clean cycle then ends with a
    /// full build.
    pub previous_run_failed: bool,
}

/// Construction parameters of a [`Coordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Instance name prefix.
    pub name: String,
    /// Project directory. `node_modules` lookups happen beneath it.
    pub project_dir: Utf8PathBuf,
    /// Root of the input tree.
    pub input_root: Utf8PathBuf,
    /// Root of the output cache.
    pub cache_root: Utf8PathBuf,
    /// Compiler settings handed to the engine.
    pub settings: CompilerSettings,
    /// Root files known before the first diff, relative to the input tree.
    pub root_files: Vec<Utf8PathBuf>,
    /// Local typings folder; defaults to `<project>/local-types`.
    pub local_types: Option<Utf8PathBuf>,
    /// Recognized input extensions; defaults to `.ts` and `.js`.
    pub extensions: Option<Vec<String>>,
    /// Framework typings overrides; defaults to the built-in `ember` entry.
    pub frameworks: Option<BTreeMap<String, Utf8PathBuf>>,
    /// Emit mode passed with every emit request.
    pub emit_mode: EmitMode,
}

impl CoordinatorOptions {
    /// Options with every optional parameter left at its default.
    pub fn new(
        project_dir: impl Into<Utf8PathBuf>,
        input_root: impl Into<Utf8PathBuf>,
        cache_root: impl Into<Utf8PathBuf>,
        settings: CompilerSettings,
    ) -> Self {
        Self {
            name: "typify".to_string(),
            project_dir: project_dir.into(),
            input_root: input_root.into(),
            cache_root: cache_root.into(),
            settings,
            root_files: Vec::new(),
            local_types: None,
            extensions: None,
            frameworks: None,
            emit_mode: EmitMode::Normal,
        }
    }

    /// Options taken from a resolved `typify.toml`.
    pub fn from_adapter(
        adapter: &ResolvedAdapter,
        input_root: impl Into<Utf8PathBuf>,
        cache_root: impl Into<Utf8PathBuf>,
        settings: CompilerSettings,
    ) -> Self {
        Self {
            name: adapter.name.clone(),
            project_dir: adapter.project_dir.clone(),
            input_root: input_root.into(),
            cache_root: cache_root.into(),
            settings,
            root_files: adapter.root_files.iter().map(Utf8PathBuf::from).collect(),
            local_types: Some(adapter.local_types.clone()),
            extensions: Some(adapter.extensions.clone()),
            frameworks: Some(adapter.frameworks.clone()),
            emit_mode: adapter.emit_mode,
        }
    }

    /// Sets the instance name prefix.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the pre-seeded root files.
    pub fn with_root_files(mut self, root_files: Vec<Utf8PathBuf>) -> Self {
        self.root_files = root_files;
        self
    }

    /// Sets the local typings folder.
    pub fn with_local_types(mut self, local_types: impl Into<Utf8PathBuf>) -> Self {
        self.local_types = Some(local_types.into());
        self
    }

    /// Sets the recognized extensions.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Sets the emit mode.
    pub fn with_emit_mode(mut self, emit_mode: EmitMode) -> Self {
        self.emit_mode = emit_mode;
        self
    }
}

/// Drives one compilation unit through successive rebuild cycles.
///
/// The first [`rebuild`](Self::rebuild) always emits the whole program. Later
/// cycles emit only the files named in the diff. A cycle that fails leaves
/// the coordinator flagged, and the next cycle that succeeds incrementally is
/// followed by a full build so errors in files that were not touched are
/// reported again.
///
/// Only files are tracked. Directories never appear in a diff, so a new or
/// deleted directory is visible only through the files inside it, and empty
/// output directories are left behind after removals.
pub struct Coordinator<E> {
    instance: String,
    host: ProjectHost,
    writer: OutputCacheWriter,
    engine: E,
    extensions: Vec<String>,
    emit_mode: EmitMode,
    state: BuildState,
}

impl<E: CheckingEngine> Coordinator<E> {
    /// Creates a coordinator driving `engine`.
    ///
    /// The settings' `rootDir` is forced to the input root and `outDir` to the
    /// cache root.
    pub fn new(options: CoordinatorOptions, engine: E) -> Result<Self, BuildError> {
        let CoordinatorOptions {
            name,
            project_dir,
            input_root,
            cache_root,
            mut settings,
            root_files,
            local_types,
            extensions,
            frameworks,
            emit_mode,
        } = options;

        settings.validate()?;
        settings.root_dir = Some(input_root.clone());
        settings.out_dir = Some(cache_root.clone());

        let roots = root_files
            .iter()
            .map(|p| normalize_relative(p))
            .collect::<Result<Vec<_>, _>>()?;

        let extensions = extensions.unwrap_or_else(default_extensions);
        let local_types = local_types.unwrap_or_else(|| project_dir.join(DEFAULT_LOCAL_TYPES));
        let frameworks = frameworks.unwrap_or_else(|| {
            ResolverConfig::default()
                .frameworks
                .into_iter()
                .map(|(name, path)| (name, project_dir.join(path)))
                .collect()
        });

        let instance = format!("{name}:{}", NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed));
        info!(
            %instance,
            %input_root,
            %cache_root,
            roots = roots.len(),
            "created coordinator"
        );

        let resolver = ModuleResolver::new(project_dir, local_types, frameworks);
        let registry = FileRegistry::with_root_files(roots);
        let host = ProjectHost::new(input_root, settings, registry, resolver);
        let writer = OutputCacheWriter::new(cache_root, extensions.clone());

        Ok(Self {
            instance,
            host,
            writer,
            engine,
            extensions,
            emit_mode,
            state: BuildState {
                phase: Phase::AwaitingFirstBuild,
                previous_run_failed: false,
            },
        })
    }

    /// The instance name, `<name>:<sequence>`.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// State carried into the next cycle.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// The host handed to the engine.
    pub fn host(&self) -> &ProjectHost {
        &self.host
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The output cache root.
    pub fn cache_root(&self) -> &Utf8Path {
        self.writer.cache_root()
    }

    /// Runs one rebuild cycle for `diff`.
    ///
    /// Any failure leaves `previous_run_failed` set.
    pub fn rebuild(&mut self, diff: &Diff) -> Result<BuildReport, BuildError> {
        let span = info_span!("rebuild", instance = %self.instance);
        let _guard = span.enter();

        let result = self.run_cycle(diff);
        match &result {
            Ok(report) => debug!(?report, "rebuild finished"),
            Err(err) => {
                self.state.previous_run_failed = true;
                warn!(
                    diagnostics = err.diagnostics().len(),
                    "rebuild failed"
                );
            }
        }
        result
    }

    fn run_cycle(&mut self, diff: &Diff) -> Result<BuildReport, BuildError> {
        let mut to_emit = Vec::new();
        for path in diff.touched() {
            let path = normalize_relative(path)?;
            if !is_recognized(&path, &self.extensions) {
                trace!(%path, "ignoring unrecognized file");
                continue;
            }
            let revision = self.host.registry_mut().touch(&path);
            trace!(%path, revision, "touched");
            to_emit.push(self.host.input_root().join(&path));
        }

        let mut removed = 0;
        for path in &diff.removed {
            let path = normalize_relative(path)?;
            if !is_recognized(&path, &self.extensions) {
                continue;
            }
            self.host.registry_mut().remove(&path);
            removed += self.writer.remove_artifacts_for(&path)?;
        }

        if self.state.phase == Phase::AwaitingFirstBuild {
            self.state.phase = Phase::Steady;
            let emitted = self.full_build()?;
            return Ok(BuildReport {
                strategy: Strategy::Full,
                emitted,
                removed,
            });
        }

        let mut sink = DiagnosticSink::new();
        let mut emitted = 0;
        for path in &to_emit {
            let output = self
                .engine
                .emit_file(&self.host, path, self.emit_mode)
                .map_err(|source| self.engine_error(source))?;
            if output.skipped {
                let diagnostics = self
                    .engine
                    .file_diagnostics(&self.host, path)
                    .map_err(|source| self.engine_error(source))?;
                debug!(%path, diagnostics = diagnostics.len(), "emit skipped");
                sink.record_file(path, diagnostics);
            } else {
                emitted += self.write_artifacts(&output.artifacts)?;
            }
        }

        if !sink.is_empty() {
            info!(failed = sink.failed_files().len(), "incremental emit failed");
            return Err(BuildError::Diagnostics {
                instance: self.instance.clone(),
                diagnostics: sink.take_all(),
            });
        }

        if self.state.previous_run_failed {
            info!("previous run failed, running a full build");
            self.state.previous_run_failed = false;
            emitted += self.full_build()?;
            return Ok(BuildReport {
                strategy: Strategy::Recovery,
                emitted,
                removed,
            });
        }

        Ok(BuildReport {
            strategy: Strategy::Incremental,
            emitted,
            removed,
        })
    }

    fn full_build(&mut self) -> Result<usize, BuildError> {
        info!(roots = self.host.registry().root_files().len(), "full build");
        let program = self
            .engine
            .emit_program(&self.host, self.emit_mode)
            .map_err(|source| self.engine_error(source))?;
        if program.skipped {
            debug!("program emit skipped");
        }
        let emitted = self.write_artifacts(&program.artifacts)?;

        let mut sink = DiagnosticSink::new();
        sink.extend(
            self.engine
                .pre_emit_diagnostics(&self.host)
                .map_err(|source| self.engine_error(source))?,
        );
        sink.extend(program.diagnostics);

        if !sink.is_empty() {
            self.state.previous_run_failed = true;
            return Err(BuildError::Diagnostics {
                instance: self.instance.clone(),
                diagnostics: sink.take_all(),
            });
        }
        self.state.previous_run_failed = false;
        Ok(emitted)
    }

    fn write_artifacts(&self, artifacts: &[Artifact]) -> Result<usize, BuildError> {
        for artifact in artifacts {
            self.writer.write(&artifact.path, &artifact.content)?;
        }
        Ok(artifacts.len())
    }

    fn engine_error(&self, source: EngineError) -> BuildError {
        BuildError::Engine {
            instance: self.instance.clone(),
            source,
        }
    }
}
