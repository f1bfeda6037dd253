use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use super::types::{CallArgs, FunctionFailure};

/// A named function a job can run as its own process.
pub trait RemoteFunction: Send + Sync {
    fn name(&self) -> &str;

    fn call(&self, args: CallArgs) -> Result<Value, FunctionFailure>;
}

/// Adapts a closure into a [`RemoteFunction`].
pub struct FnFunction<F> {
    name: String,
    func: F,
}

impl<F> FnFunction<F>
where
    F: Fn(CallArgs) -> Result<Value, FunctionFailure> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> RemoteFunction for FnFunction<F>
where
    F: Fn(CallArgs) -> Result<Value, FunctionFailure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: CallArgs) -> Result<Value, FunctionFailure> {
        (self.func)(args)
    }
}

/// Functions known to this binary, plus the program that runs them.
///
/// The same registry must be present in the process that writes a function
/// job and in the `run-function` process that executes it.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Arc<dyn RemoteFunction>>,
    runner: Option<PathBuf>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runner(mut self, runner: impl Into<PathBuf>) -> Self {
        self.runner = Some(runner.into());
        self
    }

    pub fn register(&mut self, function: impl RemoteFunction + 'static) -> &mut Self {
        self.functions
            .insert(function.name().to_string(), Arc::new(function));
        self
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(CallArgs) -> Result<Value, FunctionFailure> + Send + Sync + 'static,
    {
        self.register(FnFunction::new(name, func))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RemoteFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Program written into function scripts: the configured runner, else this executable.
    pub fn runner_program(&self) -> PathBuf {
        if let Some(runner) = &self.runner {
            return runner.clone();
        }
        std::env::current_exe().unwrap_or_else(|_| PathBuf::from("jobsub"))
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("runner", &self.runner)
            .finish()
    }
}
