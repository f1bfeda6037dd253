use std::path::{Path, PathBuf};

use serde_json::Value;

use super::registry::FunctionRegistry;
use super::types::CallArgs;
use crate::artifact::{absolutize, Artifact};
use crate::backend::function_side_files;
use crate::error::JobError;
use crate::script::{shell_quote, SHEBANG};

const STATEMENT_PREFIXES: [&str; 4] = ["source ", ". ", "export ", "module "];

/// A registered function plus its arguments, rendered as a runnable script.
///
/// The script sources the import preamble and then execs the runner binary,
/// which reads `[name, args]` from the input file and leaves a
/// `FunctionOutcome` in the output file.
#[derive(Debug, Clone)]
pub struct FunctionWrapper {
    function: String,
    args: CallArgs,
    imports: Vec<String>,
    script: Artifact,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl FunctionWrapper {
    pub fn new(
        registry: &FunctionRegistry,
        function: &str,
        args: Value,
        imports: &[String],
        script_path: &Path,
        input_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
    ) -> Result<Self, JobError> {
        if !registry.contains(function) {
            return Err(JobError::NotCallable(function.to_string()));
        }

        let script_path = absolutize(script_path);
        let (default_input, default_output) = function_side_files(&script_path);
        let input_path = input_path.map_or(default_input, |p| absolutize(&p));
        let output_path = output_path.map_or(default_output, |p| absolutize(&p));
        let imports = import_lines(imports);

        let mut lines = vec![SHEBANG.to_string()];
        lines.extend(imports.iter().cloned());
        lines.push(format!(
            "exec {} run-function --input {} --output {}",
            quoted(&registry.runner_program()),
            quoted(&input_path),
            quoted(&output_path)
        ));

        Ok(Self {
            function: function.to_string(),
            args: CallArgs::from(args),
            imports,
            script: Artifact::new(&script_path, lines.join("\n")),
            input_path,
            output_path,
        })
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &CallArgs {
        &self.args
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn script(&self) -> &Artifact {
        &self.script
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Shell command that runs the wrapper script.
    pub fn command(&self) -> String {
        format!(
            "bash {}",
            shell_quote(&self.script.path().display().to_string())
        )
    }

    /// Write the `[name, args]` tuple. Skipped if the file exists and `overwrite` is off.
    pub fn write_input(&self, overwrite: bool) -> Result<Option<PathBuf>, JobError> {
        if !overwrite && self.input_path.exists() {
            tracing::debug!(path = %self.input_path.display(), "function input exists, not overwriting");
            return Ok(None);
        }
        let blob = serde_json::to_vec(&(&self.function, &self.args)).map_err(|e| {
            JobError::InvalidArgs {
                function: self.function.clone(),
                reason: e.to_string(),
            }
        })?;
        std::fs::write(&self.input_path, blob).map_err(|source| JobError::Io {
            path: self.input_path.display().to_string(),
            source,
        })?;
        Ok(Some(self.input_path.clone()))
    }

    /// Write the script and the input blob; returns the paths actually written.
    pub fn write(&mut self, overwrite: bool) -> Result<Vec<PathBuf>, JobError> {
        let mut written = Vec::new();
        let path = self.script.path().display().to_string();
        if let Some(p) = self
            .script
            .write(overwrite)
            .map_err(|source| JobError::Io { path, source })?
        {
            written.push(p);
        }
        written.extend(self.write_input(overwrite)?);
        Ok(written)
    }

    /// Remove the script if this process wrote it, plus the side files when asked.
    pub fn clean(&mut self, delete_outputs: bool) -> std::io::Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        if self.script.remove()? {
            removed.push(self.script.path().to_path_buf());
        }
        if delete_outputs {
            for path in [&self.input_path, &self.output_path] {
                if path.is_file() {
                    std::fs::remove_file(path)?;
                    removed.push(path.clone());
                }
            }
        }
        Ok(removed)
    }
}

/// Normalize explicit imports: statements stay verbatim, bare names are sourced.
pub fn import_lines<S: AsRef<str>>(imports: &[S]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for entry in imports {
        let entry = entry.as_ref().trim();
        if entry.is_empty() {
            continue;
        }
        let line = if STATEMENT_PREFIXES.iter().any(|p| entry.starts_with(p)) {
            entry.to_string()
        } else {
            format!("source {entry}")
        };
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines
}

fn quoted(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new().with_runner("/opt/jobsub");
        registry.register_fn("add", |_| Ok(json!(0)));
        registry
    }

    #[test]
    fn unknown_function_is_rejected_at_construction() {
        let err = FunctionWrapper::new(
            &registry(),
            "nope",
            json!(null),
            &[],
            Path::new("/tmp/x_func.cluster.sh"),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, JobError::NotCallable(name) if name == "nope"));
    }

    #[test]
    fn script_sources_imports_then_execs_runner() {
        let imports = vec![
            "env.sh".to_string(),
            "module load gcc".to_string(),
            "export A=1".to_string(),
            "env.sh".to_string(),
        ];
        let wrapper = FunctionWrapper::new(
            &registry(),
            "add",
            json!([1, 2]),
            &imports,
            Path::new("/w/add_func.cluster.sh"),
            None,
            None,
        )
        .unwrap();

        assert_eq!(
            wrapper.script().text(),
            "#!/bin/bash
source env.sh
module load gcc
export A=1
exec '/opt/jobsub' run-function --input '/w/add_func.cluster.sh.pickle.in' --output '/w/add_func.cluster.sh.pickle.out'"
        );
        assert_eq!(wrapper.command(), "bash /w/add_func.cluster.sh");
        assert_eq!(wrapper.args(), &CallArgs::Positional(vec![json!(1), json!(2)]));
    }

    #[test]
    fn side_file_overrides_are_honored() {
        let wrapper = FunctionWrapper::new(
            &registry(),
            "add",
            json!(null),
            &[],
            Path::new("/w/add_func.cluster.sh"),
            Some(PathBuf::from("/data/in.json")),
            None,
        )
        .unwrap();
        assert_eq!(wrapper.input_path(), Path::new("/data/in.json"));
        assert_eq!(
            wrapper.output_path(),
            Path::new("/w/add_func.cluster.sh.pickle.out")
        );
    }

    #[test]
    fn write_persists_script_and_tuple() {
        let dir = tempfile::tempdir().unwrap();
        let mut wrapper = FunctionWrapper::new(
            &registry(),
            "add",
            json!({"a": 1}),
            &[],
            &dir.path().join("add_func.cluster.sh"),
            None,
            None,
        )
        .unwrap();

        let written = wrapper.write(false).unwrap();
        assert_eq!(written.len(), 2);
        let blob: (String, Value) =
            serde_json::from_slice(&std::fs::read(wrapper.input_path()).unwrap()).unwrap();
        assert_eq!(blob, ("add".to_string(), json!({"a": 1})));

        assert!(wrapper.write(false).unwrap().is_empty());
    }
}
