//! Backend-specific script text.
//!
//! The pre-command and post-command blocks are shared by every backend so job
//! logs look the same wherever a job ran. Rendering is a pure function of its
//! inputs.

mod local;
mod slurm;
mod torque;

use std::path::Path;

use crate::backend::{BackendKind, JobPaths};
use crate::job::ResourceRequest;

pub(crate) const SHEBANG: &str = "#!/bin/bash";
pub(crate) const SCRATCH: &str = "mkdir -p $LOCAL_SCRATCH";

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub name: &'a str,
    /// Shell command as the backend will run it.
    pub command: &'a str,
    pub resources: &'a ResourceRequest,
    /// Directory the command runs in.
    pub run_dir: &'a Path,
    pub paths: &'a JobPaths,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScripts {
    pub submission: String,
    /// Only for backends that launch a separate script from the directive file.
    pub execution: Option<String>,
}

pub fn render(request: &RenderRequest<'_>, backend: BackendKind) -> RenderedScripts {
    match backend {
        BackendKind::Slurm => slurm::render(request),
        BackendKind::Torque => torque::render(request),
        BackendKind::Local => local::render(request),
    }
}

/// Module loads, `cd`, start timestamp and the "Running" announcement.
pub fn pre_command(request: &RenderRequest<'_>) -> String {
    let mut lines: Vec<String> = request
        .resources
        .modules
        .iter()
        .map(|module| format!("module load {module}"))
        .collect();
    lines.push(format!("cd {}", shell_quote(&request.run_dir.display().to_string())));
    lines.push("date +'%d-%H:%M:%S'".to_string());
    lines.push(format!("echo \"Running {}\"", request.name));
    lines.join("\n")
}

/// The job command in a subshell, so an `exit` inside it still reaches the post block.
pub fn command_block(command: &str) -> String {
    format!("(\n{command}\n)")
}

/// Exit-code capture, completion timestamp and a stderr diagnostic on failure.
pub fn post_command() -> &'static str {
    "exitcode=$?
echo Done
date +'%d-%H:%M:%S'
if [[ $exitcode != 0 ]]; then
    echo Exited with code: $exitcode >&2
fi
exit $exitcode"
}

/// Quote `value` for bash when it contains anything outside a conservative safe set.
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
