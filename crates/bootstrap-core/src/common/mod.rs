pub mod config;

pub use config::{
    CheckpointConfig, ConfigError, DEFAULT_ROOT_PRECISION, DEFAULT_ROUND, DEFAULT_THRESHOLD,
    PlotConfig, RunConfig, load_run_config,
};
