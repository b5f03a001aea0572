use bootstrap_core::common::RunConfig;
use bootstrap_core::domain::BootstrapError;
use bootstrap_core::providers::PotentialSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Potential, run configuration and output directory of one run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JobFile {
    pub potential: PotentialSpec,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, thiserror::Error)]
pub(super) enum JobError {
    #[error("failed to read job file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse job file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<JobError> for BootstrapError {
    fn from(error: JobError) -> Self {
        match error {
            JobError::Read { .. } => BootstrapError::io_system("IO.JOB_READ", error.to_string()),
            JobError::Parse { .. } => {
                BootstrapError::input_validation("INPUT.JOB_PARSE", error.to_string())
            }
        }
    }
}

/// Loads a job file. A relative output directory is taken relative to the
/// job file, and relative checkpoint and plot paths relative to the output
/// directory.
pub(super) fn load_job(path: &Path) -> Result<JobFile, JobError> {
    let source = fs::read_to_string(path).map_err(|source| JobError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut job: JobFile = serde_json::from_str(&source).map_err(|source| JobError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    job.output_dir = base.join(&job.output_dir);
    if let Some(checkpoint) = job.run.checkpoint.as_mut() {
        resolve(&job.output_dir, &mut checkpoint.history_path);
        resolve(&job.output_dir, &mut checkpoint.confirmed_path);
    }
    if let Some(plot) = job.run.plot.as_mut() {
        resolve(&job.output_dir, &mut plot.output_path);
    }
    Ok(job)
}

fn resolve(base: &Path, path: &mut Option<PathBuf>) {
    if let Some(relative) = path.as_mut() {
        *relative = base.join(&*relative);
    }
}
