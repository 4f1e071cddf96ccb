//! A checking engine running as a child process.
//!
//! The adapter and the engine exchange newline-delimited JSON. Every request
//! carries the method, its arguments and a snapshot of the host (root files,
//! their versions, compiler settings):
//!
//! ```text
//! > {"id":1,"method":"emit_file","path":"/in/a.ts","mode":"normal","host":{...}}
//! ```
//!
//! While working on a request the engine may call back into the host, one
//! line per question, and reads the answer from its stdin:
//!
//! ```text
//! < {"kind":"read","path":"/in/b.ts"}
//! > {"kind":"source","content":"export const b = 1;"}
//! < {"kind":"resolve","names":["rsvp"],"containing":"/in/a.ts"}
//! > {"kind":"resolved","modules":[{"resolvedFileName":"...","isExternalLibraryImport":true}]}
//! ```
//!
//! The request ends with a `result` or `error` line carrying the request id.
//! The engine runs its own standard resolution before asking; `resolve`
//! callbacks only go through the project fallbacks.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use typify_config::{CompilerSettings, EmitMode};
use typify_diagnostics::Diagnostic;
use typify_incremental::{
    CheckingEngine, EmitOutput, EngineError, NoStandardResolution, ProgramEmit, ProjectHost,
    ResolvedModule, ScriptVersion,
};

/// Engine entry points, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// [`CheckingEngine::emit_file`].
    EmitFile,
    /// [`CheckingEngine::file_diagnostics`].
    FileDiagnostics,
    /// [`CheckingEngine::emit_program`].
    EmitProgram,
    /// [`CheckingEngine::pre_emit_diagnostics`].
    PreEmitDiagnostics,
}

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Utf8Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<EmitMode>,
    host: HostSnapshot<'a>,
}

#[derive(Serialize)]
struct HostSnapshot<'a> {
    input_root: &'a Utf8Path,
    root_files: Vec<Utf8PathBuf>,
    versions: BTreeMap<Utf8PathBuf, String>,
    settings: &'a CompilerSettings,
}

impl<'a> HostSnapshot<'a> {
    fn of(host: &'a ProjectHost) -> Self {
        let root_files = host.script_file_names();
        let versions = root_files
            .iter()
            .filter_map(|path| match host.script_version(path) {
                version @ ScriptVersion::Revision(_) => Some((path.clone(), version.to_string())),
                ScriptVersion::Unversioned => None,
            })
            .collect();
        Self {
            input_root: host.input_root(),
            root_files,
            versions,
            settings: host.compiler_settings(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineMessage {
    Read {
        path: Utf8PathBuf,
    },
    Resolve {
        names: Vec<String>,
        containing: Utf8PathBuf,
    },
    Result {
        id: u64,
        #[serde(default)]
        value: serde_json::Value,
    },
    Error {
        id: u64,
        message: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum HostReply {
    Source { content: Option<String> },
    Resolved { modules: Vec<Option<ResolvedModule>> },
}

/// One request/response conversation over a pair of line streams.
pub struct RpcChannel<R, W> {
    reader: R,
    writer: W,
    next_id: u64,
}

impl<R: BufRead, W: Write> RpcChannel<R, W> {
    /// Creates a channel reading engine lines from `reader` and writing
    /// requests to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            next_id: 1,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Sends one request and serves host callbacks until its result arrives.
    pub fn call<T: DeserializeOwned>(
        &mut self,
        host: &ProjectHost,
        method: Method,
        path: Option<&Utf8Path>,
        mode: Option<EmitMode>,
    ) -> Result<T, EngineError> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&Request {
            id,
            method,
            path,
            mode,
            host: HostSnapshot::of(host),
        })?;
        trace!(id, ?method, "sent request");

        loop {
            match self.receive()? {
                EngineMessage::Read { path } => {
                    let content = host.read_source(&path);
                    self.send(&HostReply::Source { content })?;
                }
                EngineMessage::Resolve { names, containing } => {
                    let modules =
                        host.resolve_module_names(&names, &containing, &NoStandardResolution);
                    self.send(&HostReply::Resolved { modules })?;
                }
                EngineMessage::Result { id: reply, value } if reply == id => {
                    return serde_json::from_value(value).map_err(|e| {
                        EngineError::Protocol(format!("malformed {method:?} result: {e}"))
                    });
                }
                EngineMessage::Error { id: reply, message } if reply == id => {
                    return Err(EngineError::Failed(message));
                }
                EngineMessage::Result { id: reply, .. } | EngineMessage::Error { id: reply, .. } => {
                    return Err(EngineError::Protocol(format!(
                        "reply to request {reply} while waiting for {id}"
                    )));
                }
            }
        }
    }

    fn send<M: Serialize>(&mut self, message: &M) -> Result<(), EngineError> {
        let line = serde_json::to_string(message)
            .map_err(|e| EngineError::Protocol(format!("cannot encode message: {e}")))?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<EngineMessage, EngineError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(EngineError::Protocol("engine closed its output".into()));
        }
        serde_json::from_str(line.trim_end())
            .map_err(|e| EngineError::Protocol(format!("invalid engine message: {e}")))
    }
}

impl<R: BufRead, W: Write> CheckingEngine for RpcChannel<R, W> {
    fn emit_file(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
        mode: EmitMode,
    ) -> Result<EmitOutput, EngineError> {
        self.call(host, Method::EmitFile, Some(path), Some(mode))
    }

    fn file_diagnostics(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        self.call(host, Method::FileDiagnostics, Some(path), None)
    }

    fn emit_program(
        &mut self,
        host: &ProjectHost,
        mode: EmitMode,
    ) -> Result<ProgramEmit, EngineError> {
        self.call(host, Method::EmitProgram, None, Some(mode))
    }

    fn pre_emit_diagnostics(
        &mut self,
        host: &ProjectHost,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        self.call(host, Method::PreEmitDiagnostics, None, None)
    }
}

/// A checking engine child process.
pub struct ProcessEngine {
    child: Child,
    channel: RpcChannel<BufReader<ChildStdout>, ChildStdin>,
}

impl ProcessEngine {
    /// Starts `command` with `args` in `cwd`.
    pub fn spawn(command: &str, args: &[String], cwd: &Utf8Path) -> Result<Self, EngineError> {
        let mut child = Command::new(command)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: command.to_string(),
                source,
            })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(EngineError::Protocol("engine pipes unavailable".into()));
        };
        debug!(command, pid = child.id(), "started checking engine");
        Ok(Self {
            child,
            channel: RpcChannel::new(BufReader::new(stdout), stdin),
        })
    }
}

impl CheckingEngine for ProcessEngine {
    fn emit_file(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
        mode: EmitMode,
    ) -> Result<EmitOutput, EngineError> {
        self.channel.emit_file(host, path, mode)
    }

    fn file_diagnostics(
        &mut self,
        host: &ProjectHost,
        path: &Utf8Path,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        self.channel.file_diagnostics(host, path)
    }

    fn emit_program(
        &mut self,
        host: &ProjectHost,
        mode: EmitMode,
    ) -> Result<ProgramEmit, EngineError> {
        self.channel.emit_program(host, mode)
    }

    fn pre_emit_diagnostics(
        &mut self,
        host: &ProjectHost,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        self.channel.pre_emit_diagnostics(host)
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            trace!(error = %err, "engine already exited");
        }
        let _ = self.child.wait();
    }
}
