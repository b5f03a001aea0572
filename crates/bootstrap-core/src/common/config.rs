//! Run configuration for the refinement engine.
//!
//! One immutable value, deserialized from camelCase JSON and checked once by
//! [`RunConfig::validate`] before any round runs.

use crate::domain::{BootstrapError, BootstrapResult, IntersectionMode, SolveMode};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROUND: usize = 10;
pub const DEFAULT_THRESHOLD: f64 = 1.0e-2;
pub const DEFAULT_ROOT_PRECISION: f64 = 1.0e-10;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    /// Largest determinant order to compute.
    pub round: usize,
    /// Intervals narrower than this are confirmed.
    pub threshold: f64,
    pub initial_interval: Region,
    pub mode: SolveMode,
    pub intersection: IntersectionMode,
    /// Union the confirmed set back into every round's surviving region.
    pub remerge_confirmed: bool,
    /// Width below which a root bracket stops being refined.
    pub root_precision: f64,
    pub checkpoint: Option<CheckpointConfig>,
    pub plot: Option<PlotConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            round: DEFAULT_ROUND,
            threshold: DEFAULT_THRESHOLD,
            initial_interval: Region::non_negative(),
            mode: SolveMode::default(),
            intersection: IntersectionMode::default(),
            remerge_confirmed: true,
            root_precision: DEFAULT_ROOT_PRECISION,
            checkpoint: None,
            plot: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckpointConfig {
    /// Defaults to `energy_intervals_<key>.json` in the output directory.
    pub history_path: Option<PathBuf>,
    /// Defaults to `confirmed_intervals_<key>.json` in the output directory.
    pub confirmed_path: Option<PathBuf>,
    pub save_every_round: bool,
    /// Resume with an empty confirmed set when only the history file exists.
    pub accept_missing_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlotConfig {
    /// Plot every `step`-th round.
    pub step: usize,
    pub x_inf: f64,
    pub x_sup: f64,
    /// Defaults to `result_N<round>_<key>.png` in the output directory.
    pub output_path: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            step: 1,
            x_inf: 0.0,
            x_sup: 20.0,
            output_path: None,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> BootstrapResult<()> {
        if self.round == 0 {
            return Err(BootstrapError::input_validation(
                "INPUT.ROUND",
                "round must be at least 1",
            ));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(BootstrapError::input_validation(
                "INPUT.THRESHOLD",
                format!(
                    "threshold must be a positive finite number, got {}",
                    self.threshold
                ),
            ));
        }
        if !self.root_precision.is_finite() || self.root_precision <= 0.0 {
            return Err(BootstrapError::input_validation(
                "INPUT.ROOT_PRECISION",
                format!(
                    "root precision must be a positive finite number, got {}",
                    self.root_precision
                ),
            ));
        }
        if self.initial_interval.is_empty() {
            return Err(BootstrapError::input_validation(
                "INPUT.INITIAL_INTERVAL",
                "initial interval must not be empty",
            ));
        }
        if let Some(plot) = &self.plot {
            plot.validate()?;
        }
        Ok(())
    }
}

impl PlotConfig {
    pub fn validate(&self) -> BootstrapResult<()> {
        if self.step == 0 {
            return Err(BootstrapError::input_validation(
                "INPUT.PLOT_STEP",
                "plot step must be at least 1",
            ));
        }
        if !self.x_inf.is_finite() || !self.x_sup.is_finite() || self.x_inf >= self.x_sup {
            return Err(BootstrapError::input_validation(
                "INPUT.PLOT_RANGE",
                format!(
                    "plot range must satisfy finite x_inf < x_sup, got [{}, {}]",
                    self.x_inf, self.x_sup
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read run configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse run configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ConfigError> for BootstrapError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Read { .. } => BootstrapError::io_system("IO.CONFIG_READ", error.to_string()),
            ConfigError::Parse { .. } => {
                BootstrapError::input_validation("INPUT.CONFIG_PARSE", error.to_string())
            }
        }
    }
}

pub fn load_run_config(path: impl AsRef<Path>) -> Result<RunConfig, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
