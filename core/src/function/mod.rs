//! Remote function jobs.
//!
//! A function job runs a registered, named function in a separate process.
//! Its arguments travel as JSON next to the generated script, and its outcome
//! comes back the same way.

mod registry;
mod runner;
mod types;
mod wrapper;

pub use registry::{FnFunction, FunctionRegistry, RemoteFunction};
pub use runner::{read_outcome, run_function};
pub use types::{CallArgs, FunctionFailure, FunctionOutcome};
pub use wrapper::{import_lines, FunctionWrapper};
