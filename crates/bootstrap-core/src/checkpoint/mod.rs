//! Round history and confirmed set persisted as a pair of JSON files.
//!
//! Both files are written through a temporary file in the target directory
//! and renamed into place, so a crash never leaves a truncated checkpoint.

use crate::common::CheckpointConfig;
use crate::domain::BootstrapError;
use crate::region::Region;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub fn history_file_name(key: &str) -> String {
    format!("energy_intervals_{key}.json")
}

pub fn confirmed_file_name(key: &str) -> String {
    format!("confirmed_intervals_{key}.json")
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Checkpoint {
    /// `history[i]` is the region surviving round `i + 1`.
    pub history: Vec<Region>,
    pub confirmed: Region,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("failed to read checkpoint '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse checkpoint '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode checkpoint '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write checkpoint '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "checkpoint '{}' exists but its companion '{}' is missing",
        present.display(),
        missing.display()
    )]
    Inconsistent { present: PathBuf, missing: PathBuf },
}

impl From<CheckpointError> for BootstrapError {
    fn from(error: CheckpointError) -> Self {
        let message = error.to_string();
        match error {
            CheckpointError::Read { .. } => BootstrapError::io_system("IO.CHECKPOINT_READ", message),
            CheckpointError::Write { .. } => {
                BootstrapError::io_system("IO.CHECKPOINT_WRITE", message)
            }
            CheckpointError::Parse { .. } => {
                BootstrapError::input_validation("INPUT.CHECKPOINT_PARSE", message)
            }
            CheckpointError::Encode { .. } => {
                BootstrapError::internal("INTERNAL.CHECKPOINT_ENCODE", message)
            }
            CheckpointError::Inconsistent { .. } => {
                BootstrapError::input_validation("INPUT.CHECKPOINT_INCONSISTENT", message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointStore {
    history_path: PathBuf,
    confirmed_path: PathBuf,
    save_every_round: bool,
    accept_missing_confirmed: bool,
}

impl CheckpointStore {
    pub fn new(history_path: impl Into<PathBuf>, confirmed_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            confirmed_path: confirmed_path.into(),
            save_every_round: false,
            accept_missing_confirmed: false,
        }
    }

    /// Keyed default file names inside `directory`.
    pub fn in_directory(directory: &Path, key: &str) -> Self {
        Self::new(
            directory.join(history_file_name(key)),
            directory.join(confirmed_file_name(key)),
        )
    }

    /// Explicit paths from `config`, falling back to the keyed names in `directory`.
    pub fn from_config(config: &CheckpointConfig, directory: &Path, key: &str) -> Self {
        let defaults = Self::in_directory(directory, key);
        Self {
            history_path: config
                .history_path
                .clone()
                .unwrap_or(defaults.history_path),
            confirmed_path: config
                .confirmed_path
                .clone()
                .unwrap_or(defaults.confirmed_path),
            save_every_round: config.save_every_round,
            accept_missing_confirmed: config.accept_missing_confirmed,
        }
    }

    pub fn with_save_every_round(mut self, save_every_round: bool) -> Self {
        self.save_every_round = save_every_round;
        self
    }

    pub fn with_accept_missing_confirmed(mut self, accept_missing_confirmed: bool) -> Self {
        self.accept_missing_confirmed = accept_missing_confirmed;
        self
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn confirmed_path(&self) -> &Path {
        &self.confirmed_path
    }

    pub fn save_every_round(&self) -> bool {
        self.save_every_round
    }

    /// `Ok(None)` when neither file exists.
    pub fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let has_history = self.history_path.is_file();
        let has_confirmed = self.confirmed_path.is_file();

        let checkpoint = match (has_history, has_confirmed) {
            (false, false) => return Ok(None),
            (true, true) => Checkpoint {
                history: read_json(&self.history_path)?,
                confirmed: read_json(&self.confirmed_path)?,
            },
            (true, false) if self.accept_missing_confirmed => Checkpoint {
                history: read_json(&self.history_path)?,
                confirmed: Region::empty(),
            },
            (true, false) => {
                return Err(CheckpointError::Inconsistent {
                    present: self.history_path.clone(),
                    missing: self.confirmed_path.clone(),
                });
            }
            (false, true) => {
                return Err(CheckpointError::Inconsistent {
                    present: self.confirmed_path.clone(),
                    missing: self.history_path.clone(),
                });
            }
        };

        info!(
            rounds = checkpoint.history.len(),
            confirmed = %checkpoint.confirmed,
            path = %self.history_path.display(),
            "loaded checkpoint"
        );
        Ok(Some(checkpoint))
    }

    pub fn save(&self, history: &[Region], confirmed: &Region) -> Result<(), CheckpointError> {
        write_json_atomic(&self.history_path, history)?;
        write_json_atomic(&self.confirmed_path, confirmed)?;
        debug!(
            rounds = history.len(),
            path = %self.history_path.display(),
            "saved checkpoint"
        );
        Ok(())
    }
}

/// Round history stored at `path`, as written by [`CheckpointStore::save`].
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<Region>, CheckpointError> {
    read_json(path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CheckpointError> {
    let source = fs::read_to_string(path).map_err(|source| CheckpointError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| CheckpointError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CheckpointError> {
    let write_error = |source: std::io::Error| CheckpointError::Write {
        path: path.to_path_buf(),
        source,
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(write_error)?;

    let mut file = NamedTempFile::new_in(directory).map_err(write_error)?;
    serde_json::to_writer_pretty(&mut file, value).map_err(|source| CheckpointError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(b"\n").map_err(write_error)?;
    file.flush().map_err(write_error)?;
    file.persist(path).map_err(|error| write_error(error.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CheckpointError, CheckpointStore, load_history};
    use crate::common::CheckpointConfig;
    use crate::domain::{BootstrapError, BootstrapErrorCategory};
    use crate::region::{Interval, Region};
    use std::fs;
    use tempfile::TempDir;

    fn sample_history() -> Vec<Region> {
        vec![
            Region::non_negative(),
            Region::from_intervals([
                Interval::new(0.25, 0.75, true, false).expect("non-empty"),
                Interval::at_least(1.5).expect("non-empty"),
            ]),
        ]
    }

    fn sample_confirmed() -> Region {
        Region::from(Interval::closed(0.70, 0.71).expect("non-empty"))
    }

    #[test]
    fn save_then_load_reproduces_history_and_confirmed_set() {
        let temp = TempDir::new().expect("tempdir should be created");
        let store = CheckpointStore::in_directory(temp.path(), "k1.00");

        store
            .save(&sample_history(), &sample_confirmed())
            .expect("checkpoint should be written");
        let checkpoint = store
            .load()
            .expect("checkpoint should load")
            .expect("checkpoint should exist");

        assert_eq!(checkpoint.history, sample_history());
        assert_eq!(checkpoint.confirmed, sample_confirmed());
        assert!(temp.path().join("energy_intervals_k1.00.json").is_file());
        assert!(temp.path().join("confirmed_intervals_k1.00.json").is_file());
    }

    #[test]
    fn full_precision_endpoints_survive_a_round_trip() {
        let temp = TempDir::new().expect("tempdir should be created");
        let store = CheckpointStore::in_directory(temp.path(), "k1.00");

        let history: Vec<Region> = (1..=5000)
            .map(|step| {
                let step = f64::from(step);
                let lower = step.sqrt() * std::f64::consts::PI;
                let upper = lower + 1.0 / (step + 7.0);
                Region::from_intervals([
                    Interval::closed(lower, upper).expect("non-empty"),
                    Interval::at_least(upper + step.ln_1p()).expect("non-empty"),
                ])
            })
            .collect();
        let confirmed = Region::from(
            Interval::closed(0.679_858_123_456_789_1, 0.679_858_123_456_789_1 + 1.0e-3)
                .expect("non-empty"),
        );

        store
            .save(&history, &confirmed)
            .expect("checkpoint should be written");
        let checkpoint = store
            .load()
            .expect("checkpoint should load")
            .expect("checkpoint should exist");

        let mismatches = history
            .iter()
            .zip(&checkpoint.history)
            .filter(|(saved, loaded)| saved != loaded)
            .count();
        assert_eq!(mismatches, 0);
        assert_eq!(checkpoint.history.len(), history.len());
        assert_eq!(checkpoint.confirmed, confirmed);
    }

    #[test]
    fn infinite_bounds_are_written_as_strings() {
        let temp = TempDir::new().expect("tempdir should be created");
        let store = CheckpointStore::in_directory(temp.path(), "k1.00");
        store
            .save(&sample_history(), &Region::empty())
            .expect("checkpoint should be written");

        let text = fs::read_to_string(store.history_path()).expect("history should be readable");
        assert!(text.contains("\"inf\""));
        assert_eq!(
            load_history(store.history_path()).expect("history should parse"),
            sample_history()
        );
    }

    #[test]
    fn missing_files_mean_no_checkpoint() {
        let temp = TempDir::new().expect("tempdir should be created");
        let store = CheckpointStore::in_directory(temp.path(), "k1.00");
        assert!(store.load().expect("load should succeed").is_none());
    }

    #[test]
    fn missing_confirmed_file_is_an_inconsistency_unless_accepted() {
        let temp = TempDir::new().expect("tempdir should be created");
        let store = CheckpointStore::in_directory(temp.path(), "k1.00_l1");
        store
            .save(&sample_history(), &sample_confirmed())
            .expect("checkpoint should be written");
        fs::remove_file(store.confirmed_path()).expect("confirmed file should be removed");

        let error = store.load().expect_err("inconsistent checkpoint");
        assert!(matches!(error, CheckpointError::Inconsistent { .. }));
        let error = BootstrapError::from(error);
        assert_eq!(error.placeholder(), "INPUT.CHECKPOINT_INCONSISTENT");
        assert!(error.category().is_recoverable());

        let lenient = store.clone().with_accept_missing_confirmed(true);
        let checkpoint = lenient
            .load()
            .expect("lenient load should succeed")
            .expect("history should exist");
        assert_eq!(checkpoint.history, sample_history());
        assert!(checkpoint.confirmed.is_empty());
    }

    #[test]
    fn confirmed_file_without_history_is_rejected() {
        let temp = TempDir::new().expect("tempdir should be created");
        let store = CheckpointStore::in_directory(temp.path(), "k1.00");
        store
            .save(&sample_history(), &sample_confirmed())
            .expect("checkpoint should be written");
        fs::remove_file(store.history_path()).expect("history file should be removed");

        let store = store.with_accept_missing_confirmed(true);
        assert!(matches!(
            store.load(),
            Err(CheckpointError::Inconsistent { .. })
        ));
    }

    #[test]
    fn malformed_checkpoint_is_a_parse_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let store = CheckpointStore::in_directory(temp.path(), "k1.00");
        fs::write(store.history_path(), "[{\"lower\": 2.0, \"upper\": 1.0}]")
            .expect("history should be written");
        fs::write(store.confirmed_path(), "[]").expect("confirmed should be written");

        let error = BootstrapError::from(store.load().expect_err("empty interval in file"));
        assert_eq!(error.placeholder(), "INPUT.CHECKPOINT_PARSE");
        assert_eq!(error.category(), BootstrapErrorCategory::InputValidationError);
    }

    #[test]
    fn config_paths_override_the_keyed_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let config = CheckpointConfig {
            history_path: Some(temp.path().join("custom.json")),
            save_every_round: true,
            ..CheckpointConfig::default()
        };
        let store = CheckpointStore::from_config(&config, temp.path(), "k2.00");

        assert_eq!(store.history_path(), temp.path().join("custom.json"));
        assert_eq!(
            store.confirmed_path(),
            temp.path().join("confirmed_intervals_k2.00.json")
        );
        assert!(store.save_every_round());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let temp = TempDir::new().expect("tempdir should be created");
        let nested = temp.path().join("runs").join("harmonic");
        let store = CheckpointStore::in_directory(&nested, "k1.00");
        store
            .save(&sample_history(), &sample_confirmed())
            .expect("checkpoint should be written");
        assert!(nested.join("energy_intervals_k1.00.json").is_file());
    }
}
