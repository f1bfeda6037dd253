use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use serde_json::Value;

use super::registry::FunctionRegistry;
use super::types::{CallArgs, FunctionFailure, FunctionOutcome};
use crate::error::JobError;

/// Execute the function named in `input` and store its outcome in `output`.
///
/// A function that fails (or panics) still produces an outcome file; only
/// problems reading the input or writing the output are errors here.
pub fn run_function(
    registry: &FunctionRegistry,
    input: &Path,
    output: &Path,
) -> Result<FunctionOutcome, JobError> {
    let raw = std::fs::read(input).map_err(|source| JobError::Io {
        path: input.display().to_string(),
        source,
    })?;
    let (name, args): (String, Value) =
        serde_json::from_slice(&raw).map_err(|e| JobError::InvalidArgs {
            function: input.display().to_string(),
            reason: e.to_string(),
        })?;

    let function = registry
        .get(&name)
        .ok_or_else(|| JobError::NotCallable(name.clone()))?;

    tracing::debug!(function = %name, "running function");
    let args = CallArgs::from(args);
    let outcome = match catch_unwind(AssertUnwindSafe(|| function.call(args))) {
        Ok(Ok(value)) => FunctionOutcome::Returned(value),
        Ok(Err(failure)) => FunctionOutcome::Raised(failure),
        Err(panic) => FunctionOutcome::Raised(FunctionFailure::new("Panic", panic_message(&*panic))),
    };

    let blob = serde_json::to_vec(&outcome).map_err(|e| JobError::InvalidArgs {
        function: name.clone(),
        reason: e.to_string(),
    })?;
    std::fs::write(output, blob).map_err(|source| JobError::Io {
        path: output.display().to_string(),
        source,
    })?;
    Ok(outcome)
}

pub fn read_outcome(path: &Path) -> Result<FunctionOutcome, JobError> {
    let raw = std::fs::read(path).map_err(|source| JobError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|e| JobError::InvalidArgs {
        function: path.display().to_string(),
        reason: format!("unreadable function outcome: {e}"),
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "function panicked".to_string()
    }
}
