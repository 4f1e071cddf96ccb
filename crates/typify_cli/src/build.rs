//! The build command.
//!
//! 1. Resolve the project directory and load `typify.toml` (defaults when absent)
//! 2. Load the compiler settings file
//! 3. Start the checking engine and create a coordinator
//! 4. Diff the input tree against the last scan and rebuild
//! 5. Render the outcome; in watch mode poll and repeat

use std::error::Error;
use std::thread;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};
use typify_config::{load_config, load_config_from_str, load_settings, resolve_adapter, ProjectConfig};
use typify_diagnostics::{DiagnosticRenderer, JsonRenderer};
use typify_incremental::{BuildError, BuildReport, Coordinator, CoordinatorOptions, Strategy, TreeSnapshot};

use crate::engine::ProcessEngine;
use crate::{Cli, ReportFormat};

/// Output cache location used when `--out` is not given, relative to the
/// project directory.
pub const DEFAULT_OUT_DIR: &str = ".typify/out";

/// Runs the build. Returns 0 on success, 1 on build failure and 2 when the
/// input directory does not exist.
pub fn run(cli: &Cli) -> Result<i32, Box<dyn Error>> {
    let cwd = current_dir()?;
    let project_dir = absolute(&cwd, cli.project.as_deref().unwrap_or("."));
    let input = absolute(&cwd, &cli.input);
    if !input.is_dir() {
        eprintln!("error: input directory {input} does not exist");
        return Ok(2);
    }

    let config = load_project_config(&project_dir, cli.config.as_deref())?;
    let adapter = resolve_adapter(&config, &project_dir)?;
    let settings = load_settings(&adapter.settings_file)?;
    debug!(settings_file = %adapter.settings_file, "loaded compiler settings");

    let command = cli
        .engine
        .clone()
        .or_else(|| config.engine.command.clone())
        .ok_or("no checking engine configured; set [engine] command in typify.toml or pass --engine")?;
    let engine = ProcessEngine::spawn(&command, &config.engine.args, &project_dir)?;

    let out = match &cli.out {
        Some(out) => absolute(&cwd, out),
        None => project_dir.join(DEFAULT_OUT_DIR),
    };
    let options = CoordinatorOptions::from_adapter(&adapter, &input, &out, settings);
    let mut coordinator = Coordinator::new(options, engine)?;

    let mut previous = TreeSnapshot::empty();
    let mut first = true;
    loop {
        let current = TreeSnapshot::scan(&input, &adapter.extensions)?;
        let diff = TreeSnapshot::diff(&previous, &current);
        previous = current;

        if first || !diff.is_empty() {
            first = false;
            info!(
                added = diff.added.len(),
                changed = diff.changed.len(),
                removed = diff.removed.len(),
                "input tree changed"
            );
            let code = match coordinator.rebuild(&diff) {
                Ok(report) => {
                    if !cli.quiet {
                        eprintln!("{}", summary(coordinator.instance(), &report));
                    }
                    0
                }
                Err(err @ BuildError::Diagnostics { .. }) => {
                    render_failure(&err, cli.format);
                    1
                }
                Err(err) if cli.watch => {
                    eprintln!("error: {err}");
                    1
                }
                Err(err) => return Err(err.into()),
            };
            if !cli.watch {
                return Ok(code);
            }
        }
        thread::sleep(Duration::from_millis(cli.interval));
    }
}

/// Loads `typify.toml` from `explicit` if given, else from the project
/// directory, else falls back to the defaults.
fn load_project_config(
    project_dir: &Utf8Path,
    explicit: Option<&str>,
) -> Result<ProjectConfig, Box<dyn Error>> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config file {path}: {e}"))?;
        return Ok(load_config_from_str(&content)?);
    }
    if project_dir.join(typify_config::loader::CONFIG_FILE).is_file() {
        return Ok(load_config(project_dir)?);
    }
    debug!(%project_dir, "no typify.toml, using defaults");
    Ok(ProjectConfig::default())
}

fn summary(instance: &str, report: &BuildReport) -> String {
    let strategy = match report.strategy {
        Strategy::Full => "full",
        Strategy::Incremental => "incremental",
        Strategy::Recovery => "recovery",
    };
    format!(
        "    Finished {strategy} build [{instance}]: {} emitted, {} removed",
        report.emitted, report.removed
    )
}

fn render_failure(err: &BuildError, format: ReportFormat) {
    match format {
        ReportFormat::Text => eprintln!("{err}"),
        ReportFormat::Json => {
            let renderer = JsonRenderer;
            for diag in err.diagnostics() {
                println!("{}", renderer.render(diag));
            }
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| format!("current directory {} is not valid UTF-8", p.display()).into())
}

fn absolute(base: &Utf8Path, path: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
