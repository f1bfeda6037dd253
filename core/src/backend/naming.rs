use std::path::{Path, PathBuf};

use super::BackendKind;

/// Every file this crate generates carries `.cluster`, so cleanup never matches user files.
pub const STDOUT_SUFFIX: &str = ".cluster.out";
pub const STDERR_SUFFIX: &str = ".cluster.err";
pub const SLURM_SUBMISSION_SUFFIX: &str = ".cluster.sbatch";
pub const SLURM_EXECUTION_SUFFIX: &str = ".cluster.script";
pub const TORQUE_SUBMISSION_SUFFIX: &str = ".cluster.qsub";
pub const LOCAL_SUBMISSION_SUFFIX: &str = ".cluster";
pub const FUNCTION_SCRIPT_SUFFIX: &str = "_func.cluster.sh";
pub const FUNCTION_INPUT_SUFFIX: &str = ".pickle.in";
pub const FUNCTION_OUTPUT_SUFFIX: &str = ".pickle.out";

/// Derived on-disk locations of one job's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub submission: PathBuf,
    pub execution: Option<PathBuf>,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

impl JobPaths {
    pub fn new(name: &str, kind: BackendKind, script_dir: &Path, out_dir: &Path) -> Self {
        Self {
            submission: script_dir.join(format!("{name}{}", kind.submission_suffix())),
            execution: kind
                .execution_suffix()
                .map(|suffix| script_dir.join(format!("{name}{suffix}"))),
            stdout: out_dir.join(format!("{name}{STDOUT_SUFFIX}")),
            stderr: out_dir.join(format!("{name}{STDERR_SUFFIX}")),
        }
    }
}

/// `<script>.pickle.in` / `<script>.pickle.out` next to a function script.
pub fn function_side_files(script: &Path) -> (PathBuf, PathBuf) {
    let base = script.as_os_str().to_string_lossy();
    (
        PathBuf::from(format!("{base}{FUNCTION_INPUT_SUFFIX}")),
        PathBuf::from(format!("{base}{FUNCTION_OUTPUT_SUFFIX}")),
    )
}
