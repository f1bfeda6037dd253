use clap::Parser;
mod app;
mod commands;
use commands::cli;
use jobsub_core::context::ClusterContext;
use jobsub_core::error;
use jobsub_plugins::factory;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, error::CliError> {
    let args = cli::Args::parse();
    let mut cfg = match &args.config {
        Some(path) => jobsub_core::config::load_file(path)
            .and_then(jobsub_core::config::apply_env_overrides),
        None => jobsub_core::config::load_default(),
    }
    .map_err(|e| error::CliError::Config(e.to_string()))?;
    if let Some(backend) = args.backend {
        cfg.backend = backend.into();
    }
    init_tracing(&cfg.logging).map_err(error::CliError::Config)?;

    // Runs inside a generated script; needs the functions, not a backend.
    if let cli::Commands::RunFunction(run_args) = &args.command {
        let registry = factory::build_registry(&cfg);
        return app::run_function(&registry, run_args);
    }

    let ctx = factory::build_context(cfg);
    dispatch(args.command, ctx).await
}

fn exit_code_for_error(e: &error::CliError) -> i32 {
    // 0: success (a local job's own exit code is passed through)
    // 11: config error
    // 12: scheduler unavailable
    // 13: invalid job
    // 20: submission / IO error
    // 50: internal/uncategorized
    match e {
        error::CliError::Config(_) => 11,
        error::CliError::Queue(_) => 12,
        error::CliError::Job(_) => 13,
        error::CliError::Submit(se) => match se {
            error::SubmitError::Queue(_) => 12,
            error::SubmitError::Job(_) => 13,
            _ => 20,
        },
        error::CliError::Clean(ce) => match ce {
            error::CleanError::Queue(_) => 12,
            error::CleanError::Io { .. } => 20,
        },
        error::CliError::Io(_) => 20,
        error::CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(cmd: cli::Commands, ctx: ClusterContext) -> Result<i32, error::CliError> {
    match cmd {
        cli::Commands::Create(job_args) => app::create(&ctx, &job_args),
        cli::Commands::Write(job_args) => app::write(&ctx, &job_args),
        cli::Commands::Submit(submit_args) => app::submit(&ctx, &submit_args).await,
        cli::Commands::Clean(clean_args) => app::clean(&ctx, &clean_args),
        cli::Commands::RunFunction(run_args) => app::run_function(ctx.registry(), &run_args),
    }
}

fn init_tracing(logging: &jobsub_core::config::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("jobsub"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("jobsub.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
