use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use jobsub_core::config::BackendSelector;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Auto,
    Slurm,
    Torque,
    Local,
}

impl From<BackendKind> for BackendSelector {
    fn from(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Auto => BackendSelector::Auto,
            BackendKind::Slurm => BackendSelector::Slurm,
            BackendKind::Torque => BackendSelector::Torque,
            BackendKind::Local => BackendSelector::Local,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "jobsub", version, about = "Submit jobs to Slurm, Torque or a local pool")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend to use; overrides config and JOBSUB_BACKEND.
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendKind>,

    /// Read this config file instead of the default locations.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a job's scripts and print them.
    Create(JobArgs),
    /// Render a job's scripts and write them to disk.
    Write(JobArgs),
    /// Write and submit a job, printing its id.
    Submit(SubmitArgs),
    /// Remove generated files for the active backend.
    Clean(CleanArgs),
    /// Execute a function job's input file. Used by generated scripts.
    #[command(hide = true)]
    RunFunction(RunFunctionArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct JobArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub cores: Option<u32>,

    /// Wall time as HH:MM:SS.
    #[arg(long)]
    pub time: Option<String>,

    /// Memory in MB.
    #[arg(long)]
    pub mem: Option<u64>,

    /// Partition (Slurm) or queue (Torque).
    #[arg(long)]
    pub partition: Option<String>,

    /// Module to load; repeatable, or comma separated.
    #[arg(long = "module", action = clap::ArgAction::Append)]
    pub modules: Vec<String>,

    /// Job id this job waits for; repeatable.
    #[arg(long = "dep", action = clap::ArgAction::Append)]
    pub deps: Vec<String>,

    /// Run directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long)]
    pub script_dir: Option<PathBuf>,

    /// Start from a named resource profile.
    #[arg(long)]
    pub profile: Option<String>,

    /// Replace scripts that already exist.
    #[arg(long)]
    pub overwrite: bool,

    /// Run a registered function instead of a shell command.
    #[arg(long, conflicts_with = "command")]
    pub function: Option<String>,

    /// JSON arguments for --function.
    #[arg(long = "args", requires = "function")]
    pub function_args: Option<String>,

    /// Shell file or statement sourced before a function runs; repeatable.
    #[arg(long = "import", action = clap::ArgAction::Append, requires = "function")]
    pub imports: Vec<String>,

    #[arg(last = true)]
    pub command: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Local pool size; only applies when the pool is created.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Return right after submitting a local job instead of waiting for it.
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CleanArgs {
    /// Directory to clean; defaults to the current directory.
    pub dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunFunctionArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn command_follows_double_dash() {
        let args = Args::parse_from([
            "jobsub", "--backend", "torque", "create", "--name", "a", "--dep", "3", "--dep", "7",
            "--", "echo", "-n", "hi",
        ]);
        assert_eq!(args.backend, Some(BackendKind::Torque));
        let Commands::Create(job) = args.command else {
            panic!("expected create");
        };
        assert_eq!(job.deps, vec!["3", "7"]);
        assert_eq!(job.command, vec!["echo", "-n", "hi"]);
    }

    #[test]
    fn run_function_is_hidden() {
        let help = Args::command().render_help().to_string();
        assert!(!help.contains("run-function"));
        assert!(help.contains("submit"));
    }
}
