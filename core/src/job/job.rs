use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use lazy_static::lazy_static;
use regex::Regex;

use super::types::{CommandSpec, Dependency, JobRef, JobSpec, ResourceRequest};
use crate::artifact::{absolutize, Artifact};
use crate::backend::{BackendKind, BackendStrategy, JobHandle, JobPaths, SubmitRequest, FUNCTION_SCRIPT_SUFFIX};
use crate::error::{JobError, SubmitError};
use crate::function::{FunctionRegistry, FunctionWrapper};
use crate::script::RenderRequest;

lazy_static! {
    static ref UNSAFE_NAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// How the job's command was given. Decided once, at construction.
#[derive(Debug, Clone)]
pub enum JobKind {
    Shell,
    Function(FunctionWrapper),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Written,
    Submitted,
}

/// A unit of work bound to one backend, with its rendered scripts.
#[derive(Debug)]
pub struct Job {
    name: String,
    command: String,
    backend: BackendKind,
    resources: ResourceRequest,
    dependencies: Vec<Dependency>,
    dir: PathBuf,
    out_dir: PathBuf,
    script_dir: PathBuf,
    paths: JobPaths,
    submission: Artifact,
    execution: Option<Artifact>,
    kind: JobKind,
    state: JobState,
    handle: Option<JobHandle>,
    id: Arc<OnceLock<String>>,
}

impl Job {
    pub fn new(
        spec: JobSpec,
        backend: &dyn BackendStrategy,
        registry: &FunctionRegistry,
    ) -> Result<Self, JobError> {
        let JobSpec {
            name,
            command,
            resources,
            dependencies,
            dir,
            out_dir,
            script_dir,
            function_input,
            function_output,
        } = spec;

        let raw_name = match name {
            Some(name) => name,
            None => guess_name(&command),
        };
        let name = sanitize_name(&raw_name)?;

        let dir = match dir {
            Some(dir) => absolutize(&dir),
            None => std::env::current_dir().map_err(|source| JobError::Io {
                path: ".".to_string(),
                source,
            })?,
        };
        let out_dir = out_dir.map_or_else(|| dir.clone(), |d| dir.join(d));
        let script_dir = script_dir.map_or_else(|| dir.clone(), |d| dir.join(d));

        let (command, kind) = match command {
            CommandSpec::Shell { command, args } => {
                let mut line = command.trim().to_string();
                for arg in args {
                    line.push(' ');
                    line.push_str(&arg);
                }
                if line.trim().is_empty() {
                    return Err(JobError::EmptyCommand(name));
                }
                (line, JobKind::Shell)
            }
            CommandSpec::Function {
                function,
                args,
                imports,
            } => {
                let script = script_dir.join(format!("{name}{FUNCTION_SCRIPT_SUFFIX}"));
                let wrapper = FunctionWrapper::new(
                    registry,
                    &function,
                    args,
                    &imports,
                    &script,
                    function_input,
                    function_output,
                )?;
                (wrapper.command(), JobKind::Function(wrapper))
            }
        };

        let kind_tag = backend.kind();
        let resources = resources.normalized();
        let paths = JobPaths::new(&name, kind_tag, &script_dir, &out_dir);
        let rendered = backend.render(&RenderRequest {
            name: &name,
            command: &command,
            resources: &resources,
            run_dir: &dir,
            paths: &paths,
        });

        let submission = Artifact::new(&paths.submission, rendered.submission);
        let execution = match (&paths.execution, rendered.execution) {
            (Some(path), Some(text)) => Some(Artifact::new(path, text)),
            _ => None,
        };

        tracing::debug!(job = %name, backend = %kind_tag, "job created");
        Ok(Self {
            name,
            command,
            backend: kind_tag,
            resources,
            dependencies,
            dir,
            out_dir,
            script_dir,
            paths,
            submission,
            execution,
            kind,
            state: JobState::Created,
            handle: None,
            id: Arc::new(OnceLock::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shell command the backend runs. For function jobs this invokes the wrapper script.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn resources(&self) -> &ResourceRequest {
        &self.resources
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn paths(&self) -> &JobPaths {
        &self.paths
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    pub fn submission(&self) -> &Artifact {
        &self.submission
    }

    pub fn execution(&self) -> Option<&Artifact> {
        self.execution.as_ref()
    }

    pub fn function(&self) -> Option<&FunctionWrapper> {
        match &self.kind {
            JobKind::Function(wrapper) => Some(wrapper),
            JobKind::Shell => None,
        }
    }

    /// Every artifact this job owns, submission first.
    pub fn artifacts(&self) -> Vec<&Artifact> {
        let mut artifacts = vec![&self.submission];
        artifacts.extend(self.execution.as_ref());
        if let JobKind::Function(wrapper) = &self.kind {
            artifacts.push(wrapper.script());
        }
        artifacts
    }

    /// Lazy reference for jobs that depend on this one.
    pub fn reference(&self) -> JobRef {
        JobRef::new(self.name.clone(), self.id.clone())
    }

    /// Write all artifacts; returns the paths actually written.
    pub fn write(&mut self, overwrite: bool) -> Result<Vec<PathBuf>, JobError> {
        let mut written = Vec::new();
        let mut artifacts: Vec<&mut Artifact> = Vec::new();
        if let Some(execution) = self.execution.as_mut() {
            artifacts.push(execution);
        }
        artifacts.push(&mut self.submission);
        for artifact in artifacts {
            let path = artifact.path().display().to_string();
            if let Some(p) = artifact
                .write(overwrite)
                .map_err(|source| JobError::Io { path, source })?
            {
                written.push(p);
            }
        }
        if let JobKind::Function(wrapper) = &mut self.kind {
            written.extend(wrapper.write(overwrite)?);
        }

        if self.state == JobState::Created {
            self.state = JobState::Written;
        }
        tracing::debug!(job = %self.name, files = written.len(), "job written");
        Ok(written)
    }

    pub fn resolve_dependencies(&self) -> Result<Vec<String>, SubmitError> {
        self.dependencies.iter().map(Dependency::resolve).collect()
    }

    pub fn submit_request(&self, dependencies: Vec<String>, threads: Option<usize>) -> SubmitRequest {
        SubmitRequest {
            name: self.name.clone(),
            script: self.submission.path().to_path_buf(),
            dependencies,
            threads,
            stdout: self.paths.stdout.clone(),
            stderr: self.paths.stderr.clone(),
            function_output: self.function().map(|w| w.output_path().to_path_buf()),
        }
    }

    pub(crate) fn mark_submitted(&mut self, handle: JobHandle) {
        let _ = self.id.set(handle.id_string());
        self.handle = Some(handle);
        self.state = JobState::Submitted;
    }

    /// Remove the artifacts this process wrote, plus stdout/stderr when `delete_outputs`.
    pub fn clean(&mut self, delete_outputs: bool) -> std::io::Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        if let Some(execution) = self.execution.as_mut() {
            if execution.remove()? {
                removed.push(execution.path().to_path_buf());
            }
        }
        if self.submission.remove()? {
            removed.push(self.submission.path().to_path_buf());
        }
        if let JobKind::Function(wrapper) = &mut self.kind {
            removed.extend(wrapper.clean(delete_outputs)?);
        }
        if delete_outputs {
            for path in [&self.paths.stdout, &self.paths.stderr] {
                if path.is_file() {
                    std::fs::remove_file(path)?;
                    removed.push(path.clone());
                }
            }
        }
        Ok(removed)
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Job<{} ({}, {:?})>", self.name, self.backend, self.state)?;
        for artifact in self.artifacts() {
            write!(f, "{artifact}")?;
        }
        Ok(())
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_name(raw: &str) -> Result<String, JobError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(JobError::InvalidName(raw.to_string()));
    }
    Ok(UNSAFE_NAME_CHARS.replace_all(trimmed, "_").into_owned())
}

fn guess_name(command: &CommandSpec) -> String {
    match command {
        CommandSpec::Shell { command, .. } => command
            .split_whitespace()
            .next()
            .and_then(|word| Path::new(word).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        CommandSpec::Function { function, .. } => function.clone(),
    }
}
