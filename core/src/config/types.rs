use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::job::ResourceRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendSelector,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub submit: SubmitConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub jobs: JobsConfig,

    #[serde(default)]
    pub function: FunctionConfig,

    #[serde(default = "default_profiles")]
    pub profiles: BTreeMap<String, ResourceRequest>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendSelector::default(),
            logging: LoggingConfig::default(),
            submit: SubmitConfig::default(),
            local: LocalConfig::default(),
            jobs: JobsConfig::default(),
            function: FunctionConfig::default(),
            profiles: default_profiles(),
        }
    }
}

impl AppConfig {
    pub fn profile(&self, name: &str) -> Option<&ResourceRequest> {
        self.profiles.get(name)
    }
}

fn default_profiles() -> BTreeMap<String, ResourceRequest> {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "default".to_string(),
        ResourceRequest {
            cores: 1,
            time: Some("02:00:00".to_string()),
            mem: Some(4000),
            partition: None,
            modules: Vec::new(),
        },
    );
    profiles.insert(
        "large".to_string(),
        ResourceRequest {
            cores: 16,
            time: Some("24:00:00".to_string()),
            mem: Some(32000),
            partition: None,
            modules: Vec::new(),
        },
    );
    profiles
}

/// Which backend to use. `Auto` is resolved once, when the context is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSelector {
    #[default]
    Auto,
    Slurm,
    Torque,
    Local,
}

impl BackendSelector {
    pub fn fixed(self) -> Option<BackendKind> {
        match self {
            Self::Auto => None,
            Self::Slurm => Some(BackendKind::Slurm),
            Self::Torque => Some(BackendKind::Torque),
            Self::Local => Some(BackendKind::Local),
        }
    }
}

impl std::str::FromStr for BackendSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "slurm" => Ok(Self::Slurm),
            "torque" | "pbs" => Ok(Self::Torque),
            "local" | "normal" => Ok(Self::Local),
            other => Err(format!("unknown backend {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "jobsub_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Extra attempts after the first failed `sbatch`/`qsub` call.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Worker pool size. Falls back to the number of CPUs.
    #[serde(default)]
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Run directory; defaults to the current directory.
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default)]
    pub out_dir: Option<String>,

    #[serde(default)]
    pub script_dir: Option<String>,

    /// Replace artifacts that already exist on disk.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Binary invoked by function scripts; the current executable if unset.
    #[serde(default)]
    pub runner: Option<String>,
}
