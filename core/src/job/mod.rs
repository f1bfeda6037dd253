#[allow(clippy::module_inception)]
mod job;
mod types;

pub use job::{sanitize_name, Job, JobKind, JobState};
pub use types::{split_modules, CommandSpec, Dependency, JobRef, JobSpec, ResourceRequest};
