//! Command handlers: turn parsed flags into jobs and run them through the context.

use std::path::Path;

use jobsub_core::api as core_api;
use jobsub_core::error::{CliError, JobError};
use jobsub_core::job::{CommandSpec, Dependency, JobSpec, ResourceRequest};

use crate::commands::cli::{CleanArgs, JobArgs, RunFunctionArgs, SubmitArgs};

/// Resources from `--profile` (if any) with explicit flags on top.
pub fn resolve_resources(args: &JobArgs, cfg: &core_api::AppConfig) -> Result<ResourceRequest, CliError> {
    let mut resources = match &args.profile {
        Some(name) => cfg
            .profile(name)
            .cloned()
            .ok_or_else(|| CliError::Config(format!("unknown resource profile {name:?}")))?,
        None => ResourceRequest::default(),
    };
    if let Some(cores) = args.cores {
        resources.cores = cores;
    }
    if let Some(time) = &args.time {
        resources.time = Some(time.clone());
    }
    if let Some(mem) = args.mem {
        resources.mem = Some(mem);
    }
    if let Some(partition) = &args.partition {
        resources.partition = Some(partition.clone());
    }
    resources.modules.extend(args.modules.iter().cloned());
    Ok(resources.normalized())
}

pub fn build_spec(args: &JobArgs, cfg: &core_api::AppConfig) -> Result<JobSpec, CliError> {
    let command = match &args.function {
        Some(function) => {
            let call_args = match &args.function_args {
                Some(raw) => serde_json::from_str(raw).map_err(|e| JobError::InvalidArgs {
                    function: function.clone(),
                    reason: format!("--args is not valid JSON ({raw:?}): {e}"),
                })?,
                None => serde_json::Value::Null,
            };
            CommandSpec::Function {
                function: function.clone(),
                args: call_args,
                imports: args.imports.clone(),
            }
        }
        None => {
            if args.command.is_empty() {
                let name = args.name.clone().unwrap_or_default();
                return Err(JobError::EmptyCommand(name).into());
            }
            CommandSpec::Shell {
                command: args.command.join(" "),
                args: Vec::new(),
            }
        }
    };

    let mut spec = JobSpec::new(command).resources(resolve_resources(args, cfg)?);
    spec.name = args.name.clone();
    spec.dir = args.dir.clone();
    spec.out_dir = args.out_dir.clone();
    spec.script_dir = args.script_dir.clone();
    for dep in &args.deps {
        spec.dependencies.push(Dependency::parse(dep)?);
    }
    Ok(spec)
}

pub fn create(ctx: &core_api::ClusterContext, args: &JobArgs) -> Result<i32, CliError> {
    let job = ctx.create_job(build_spec(args, ctx.cfg())?)?;
    print!("{job}");
    Ok(0)
}

pub fn write(ctx: &core_api::ClusterContext, args: &JobArgs) -> Result<i32, CliError> {
    let mut job = ctx.create_job(build_spec(args, ctx.cfg())?)?;
    let overwrite = args.overwrite.then_some(true);
    ctx.write_job(&mut job, overwrite)?;
    report_written(&job);
    Ok(0)
}

pub async fn submit(ctx: &core_api::ClusterContext, args: &SubmitArgs) -> Result<i32, CliError> {
    let mut job = ctx.create_job(build_spec(&args.job, ctx.cfg())?)?;
    let overwrite = args.job.overwrite.then_some(true);
    ctx.write_job(&mut job, overwrite)?;
    report_written(&job);

    let ctx = match args.threads {
        Some(threads) => {
            let mut cfg = ctx.cfg().clone();
            cfg.local.threads = Some(threads);
            ctx.with_config(cfg)
        }
        None => ctx.clone(),
    };
    let handle = ctx.submit_job(&mut job).await?;
    println!("{handle}");

    let Some(local) = handle.as_local() else {
        return Ok(0);
    };
    if args.no_wait {
        return Ok(0);
    }
    let outcome = local.get().await?;
    println!(
        "exit code: {} (runtime {}ms)",
        outcome
            .exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string()),
        outcome.runtime().num_milliseconds()
    );
    match &outcome.function {
        Some(core_api::FunctionOutcome::Returned(value)) => println!("result: {value}"),
        Some(core_api::FunctionOutcome::Raised(failure)) => println!("raised: {failure}"),
        None => {}
    }
    Ok(outcome.exit_code.unwrap_or(1))
}

pub fn clean(ctx: &core_api::ClusterContext, args: &CleanArgs) -> Result<i32, CliError> {
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let removed = ctx.clean(&dir)?;
    if removed.is_empty() {
        println!("no {} files in {}", ctx.backend_kind(), dir.display());
    }
    for path in removed {
        println!("removed {}", path.display());
    }
    Ok(0)
}

/// Body of the hidden `run-function` command executed inside function scripts.
pub fn run_function(registry: &core_api::FunctionRegistry, args: &RunFunctionArgs) -> Result<i32, CliError> {
    let outcome = core_api::run_function(registry, &args.input, &args.output)?;
    if let core_api::FunctionOutcome::Raised(failure) = &outcome {
        tracing::info!("function raised {failure}; stored in {}", args.output.display());
    }
    Ok(0)
}

fn report_written(job: &core_api::Job) {
    for artifact in job.artifacts() {
        println!("{}", describe(artifact.path(), artifact.state()));
    }
}

fn describe(path: &Path, state: core_api::WriteState) -> String {
    let label = match state {
        core_api::WriteState::Written => "wrote",
        core_api::WriteState::PreExisting => "kept existing",
        core_api::WriteState::NotWritten => "not written",
    };
    format!("{label} {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_flags_override_profile() {
        let cfg = core_api::AppConfig::default();
        let args = JobArgs {
            profile: Some("large".to_string()),
            cores: Some(4),
            modules: vec!["gcc,samtools".to_string(), "gcc".to_string()],
            ..JobArgs::default()
        };
        let resources = resolve_resources(&args, &cfg).unwrap();
        assert_eq!(resources.cores, 4);
        assert_eq!(resources.time.as_deref(), Some("24:00:00"));
        assert_eq!(resources.mem, Some(32000));
        assert_eq!(resources.modules, vec!["gcc", "samtools"]);
    }

    #[test]
    fn unknown_profile_is_a_config_error() {
        let args = JobArgs {
            profile: Some("huge".to_string()),
            ..JobArgs::default()
        };
        let err = resolve_resources(&args, &core_api::AppConfig::default()).unwrap_err();
        assert!(matches!(&err, CliError::Config(msg) if msg.contains("huge")));
    }

    #[test]
    fn bad_dependency_names_the_value() {
        let args = JobArgs {
            deps: vec!["12".to_string(), "abc".to_string()],
            command: vec!["true".to_string()],
            ..JobArgs::default()
        };
        let err = build_spec(&args, &core_api::AppConfig::default()).unwrap_err();
        assert!(matches!(&err, CliError::Job(JobError::InvalidDependency(v)) if v == "abc"));
    }

    #[test]
    fn function_args_must_be_json() {
        let args = JobArgs {
            function: Some("sum".to_string()),
            function_args: Some("[1, 2".to_string()),
            ..JobArgs::default()
        };
        let err = build_spec(&args, &core_api::AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("[1, 2"));
    }

    #[test]
    fn missing_command_is_rejected() {
        let args = JobArgs {
            name: Some("idle".to_string()),
            ..JobArgs::default()
        };
        let err = build_spec(&args, &core_api::AppConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Job(JobError::EmptyCommand(name)) if name == "idle"));
    }
}
