use std::path::{Path, PathBuf};

use super::types::{AppConfig, BackendSelector};

/// Get the default jobsub data directory: ~/.jobsub
pub fn get_jobsub_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".jobsub"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.jobsub/config.toml
    let user_config = get_jobsub_data_dir()?.join("config.toml");

    // Priority 2: ./jobsub.toml
    let local_config = Path::new("jobsub.toml");

    let cfg = if user_config.exists() {
        load_file(&user_config)?
    } else if local_config.exists() {
        load_file(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(cfg)
}

pub fn load_file(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read {} failed: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("parse {} failed: {e}", path.display()))?;
    Ok(cfg)
}

pub fn apply_env_overrides(mut cfg: AppConfig) -> anyhow::Result<AppConfig> {
    if let Ok(v) = std::env::var("JOBSUB_BACKEND") {
        if !v.trim().is_empty() {
            cfg.backend = v
                .parse::<BackendSelector>()
                .map_err(|e| anyhow::anyhow!("JOBSUB_BACKEND: {e}"))?;
        }
    }
    if let Ok(v) = std::env::var("JOBSUB_THREADS") {
        if !v.trim().is_empty() {
            let threads = v
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("JOBSUB_THREADS must be a number, got {v:?}"))?;
            cfg.local.threads = Some(threads);
        }
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_submission_policy() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.backend, BackendSelector::Auto);
        assert_eq!(cfg.submit.max_retries, 5);
        assert_eq!(cfg.submit.retry_delay_ms, 1000);
        assert!(!cfg.jobs.overwrite);
        assert!(cfg.local.threads.is_none());
        assert_eq!(cfg.profile("large").map(|p| p.cores), Some(16));
    }

    #[test]
    fn load_file_reads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
backend = "torque"

[local]
threads = 3

[profiles.gpu]
cores = 8
partition = "gpu"
"#
        )
        .unwrap();

        let cfg = load_file(file.path()).unwrap();
        assert_eq!(cfg.backend, BackendSelector::Torque);
        assert_eq!(cfg.local.threads, Some(3));
        assert_eq!(cfg.submit.max_retries, 5);

        let gpu = cfg.profile("gpu").unwrap();
        assert_eq!(gpu.cores, 8);
        assert_eq!(gpu.partition.as_deref(), Some("gpu"));
        assert!(gpu.time.is_none());
    }

    #[test]
    fn backend_selector_accepts_aliases() {
        assert_eq!("PBS".parse::<BackendSelector>(), Ok(BackendSelector::Torque));
        assert_eq!("normal".parse::<BackendSelector>(), Ok(BackendSelector::Local));
        assert!("lsf".parse::<BackendSelector>().is_err());
    }
}
