mod local;
mod slurm;
mod torque;

pub use local::LocalBackendStrategy;
pub use slurm::SlurmBackendStrategy;
pub use torque::TorqueBackendStrategy;

pub mod flags {
    //! Dependency flag encodings and id parsers, per scheduler.
    pub use super::slurm::{dependency_flag as slurm_dependency_flag, parse_job_id as parse_slurm_id};
    pub use super::torque::{dependency_args as torque_dependency_args, parse_job_id as parse_torque_id};
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use jobsub_core::api::SubmitRequest;
    use jobsub_core::submit::{CommandOutput, CommandRunner};

    /// Replays canned command outputs and records every call.
    pub(crate) struct ScriptedRunner {
        outputs: Mutex<VecDeque<std::io::Result<CommandOutput>>>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new(outputs: Vec<std::io::Result<CommandOutput>>) -> Self {
            Self {
                outputs: Mutex::new(outputs.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing_then(failures: usize, stdout: &str) -> Self {
            let mut outputs: Vec<_> = (0..failures)
                .map(|_| Ok(failed("Socket timed out on send/recv operation")))
                .collect();
            outputs.push(Ok(CommandOutput {
                code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }));
            Self::new(outputs)
        }

        pub(crate) fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(failed("unexpected extra call")))
        }
    }

    pub(crate) fn failed(stderr: &str) -> CommandOutput {
        CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub(crate) fn request(name: &str, dependencies: Vec<String>) -> SubmitRequest {
        SubmitRequest {
            name: name.to_string(),
            script: PathBuf::from(format!("/jobs/{name}.cluster.sbatch")),
            dependencies,
            threads: None,
            stdout: PathBuf::from(format!("/jobs/{name}.cluster.out")),
            stderr: PathBuf::from(format!("/jobs/{name}.cluster.err")),
            function_output: None,
        }
    }
}
