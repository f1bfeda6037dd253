#[allow(clippy::module_inception)]
pub mod error;
pub mod job;
pub mod submit;

pub use error::CliError;
pub use job::JobError;
pub use submit::{CleanError, QueueError, SubmitError};
