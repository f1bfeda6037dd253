use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{JobError, SubmitError};

/// Resources requested for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    #[serde(default = "default_cores")]
    pub cores: u32,

    /// Wall time as `HH:MM:SS`.
    #[serde(default)]
    pub time: Option<String>,

    /// Memory in MB.
    #[serde(default)]
    pub mem: Option<u64>,

    /// Partition (Slurm) or queue (Torque).
    #[serde(default)]
    pub partition: Option<String>,

    #[serde(default)]
    pub modules: Vec<String>,
}

fn default_cores() -> u32 {
    1
}

impl Default for ResourceRequest {
    fn default() -> Self {
        Self {
            cores: default_cores(),
            time: None,
            mem: None,
            partition: None,
            modules: Vec::new(),
        }
    }
}

impl ResourceRequest {
    /// Clamp cores to at least one, drop blank strings and split module lists.
    pub fn normalized(mut self) -> Self {
        self.cores = self.cores.max(1);
        self.time = self.time.filter(|t| !t.trim().is_empty());
        self.partition = self.partition.filter(|p| !p.trim().is_empty());
        self.modules = split_modules(&self.modules);
        self
    }
}

/// Split `,`/`;` separated module entries, keeping first-seen order without duplicates.
pub fn split_modules<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    let mut modules: Vec<String> = Vec::new();
    for entry in entries {
        for module in entry.as_ref().split([',', ';']) {
            let module = module.trim();
            if !module.is_empty() && !modules.iter().any(|m| m == module) {
                modules.push(module.to_string());
            }
        }
    }
    modules
}

/// Lazy handle on another job's identifier.
///
/// The id is filled in when that job is submitted, so a dependent can be built
/// before its dependency has been given a number.
#[derive(Debug, Clone)]
pub struct JobRef {
    name: String,
    id: Arc<OnceLock<String>>,
}

impl JobRef {
    pub(crate) fn new(name: String, id: Arc<OnceLock<String>>) -> Self {
        Self { name, id }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.get().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub enum Dependency {
    /// Canonical digit string.
    Id(String),
    Job(JobRef),
}

impl Dependency {
    pub fn parse(value: &str) -> Result<Self, JobError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(JobError::InvalidDependency(value.to_string()));
        }
        Ok(Self::Id(trimmed.to_string()))
    }

    /// Identifier handed to the backend.
    pub fn resolve(&self) -> Result<String, SubmitError> {
        match self {
            Self::Id(id) => Ok(id.clone()),
            Self::Job(job) => job
                .id()
                .map(str::to_string)
                .ok_or_else(|| SubmitError::UnresolvedDependency(job.name().to_string())),
        }
    }
}

impl std::str::FromStr for Dependency {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for Dependency {
    fn from(id: u64) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<JobRef> for Dependency {
    fn from(job: JobRef) -> Self {
        Self::Job(job)
    }
}

/// What a job runs. Inspected exactly once, by `Job::new`.
#[derive(Debug, Clone)]
pub enum CommandSpec {
    Shell {
        command: String,
        args: Vec<String>,
    },
    Function {
        function: String,
        args: serde_json::Value,
        imports: Vec<String>,
    },
}

/// Everything needed to construct a [`Job`](super::Job).
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: Option<String>,
    pub command: CommandSpec,
    pub resources: ResourceRequest,
    pub dependencies: Vec<Dependency>,
    /// Run directory; the current directory if unset.
    pub dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub script_dir: Option<PathBuf>,
    pub function_input: Option<PathBuf>,
    pub function_output: Option<PathBuf>,
}

impl JobSpec {
    pub fn new(command: CommandSpec) -> Self {
        Self {
            name: None,
            command,
            resources: ResourceRequest::default(),
            dependencies: Vec::new(),
            dir: None,
            out_dir: None,
            script_dir: None,
            function_input: None,
            function_output: None,
        }
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Self::new(CommandSpec::Shell {
            command: command.into(),
            args: Vec::new(),
        })
    }

    pub fn function(function: impl Into<String>, args: serde_json::Value) -> Self {
        Self::new(CommandSpec::Function {
            function: function.into(),
            args,
            imports: Vec::new(),
        })
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn resources(mut self, resources: ResourceRequest) -> Self {
        self.resources = resources;
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<Dependency>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    /// Only meaningful for function jobs; ignored otherwise.
    pub fn imports<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let CommandSpec::Function { imports, .. } = &mut self.command {
            imports.extend(entries.into_iter().map(Into::into));
        }
        self
    }
}
