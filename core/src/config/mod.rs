mod load;
mod types;

pub use load::{apply_env_overrides, get_jobsub_data_dir, load_default, load_file};
pub use types::{
    AppConfig, BackendSelector, FunctionConfig, JobsConfig, LocalConfig, LoggingConfig,
    SubmitConfig,
};
