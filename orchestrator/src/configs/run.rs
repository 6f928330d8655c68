use std::{
    fs,
    num::{IntErrorKind, NonZeroUsize},
    path::{Path, PathBuf},
    thread,
};

use comms::specs::{ModelSpec, Schedule};
use kernel::Model;
use log::debug;

use super::{Coefficients, Mode, ModelKind};
use crate::{OrchestratorError, Result};

/// Everything the operator can tune about a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: Mode,
    pub model: ModelKind,
    /// The directory holding the datasets, also the default place of the other inputs.
    pub data_dir: PathBuf,
    pub coeffs: Option<PathBuf>,
    pub sizes: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// The thread counts to go through, the mode's default if empty.
    pub threads: Vec<usize>,
    pub schedule: Option<Schedule>,
    /// Keep the rows of previous runs in the output.
    pub append: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            model: ModelKind::default(),
            data_dir: PathBuf::from("point_lists"),
            coeffs: None,
            sizes: None,
            output: None,
            threads: Vec::new(),
            schedule: None,
            append: false,
        }
    }
}

impl RunConfig {
    pub fn coeffs_path(&self) -> PathBuf {
        self.coeffs
            .clone()
            .unwrap_or_else(|| self.data_dir.join("coeffs.json"))
    }

    pub fn sizes_path(&self) -> PathBuf {
        self.sizes
            .clone()
            .unwrap_or_else(|| self.data_dir.join("sizes.txt"))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.mode.default_output())
    }

    /// Checks the config against the amount of workers and resolves the thread counts.
    ///
    /// # Arguments
    /// * `workers` - The amount of workers the run was launched with.
    ///
    /// # Returns
    /// The thread counts to iterate or an `InvalidConfig` error.
    pub fn validate(&self, workers: NonZeroUsize) -> Result<Vec<NonZeroUsize>> {
        let invalid = |msg: String| Err(OrchestratorError::InvalidConfig(msg));

        let threads = match self.mode {
            Mode::Threads if workers.get() > 1 => {
                return invalid(format!(
                    "the threads mode runs on a single worker, got {workers}"
                ));
            }
            Mode::Processes if self.threads.iter().any(|&t| t != 1) => {
                return invalid("the processes mode runs a single thread per worker".into());
            }
            Mode::Processes => vec![1],
            _ if !self.threads.is_empty() => self.threads.clone(),
            Mode::Threads => Mode::DEFAULT_THREADS.to_vec(),
            Mode::Hybrid => vec![thread::available_parallelism().map_or(1, NonZeroUsize::get)],
        };

        threads
            .into_iter()
            .map(|t| {
                NonZeroUsize::new(t).ok_or_else(|| {
                    OrchestratorError::InvalidConfig("thread counts must be positive".into())
                })
            })
            .collect()
    }
}

/// A validated run, only the coordinator builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub mode: Mode,
    pub model: ModelSpec,
    pub schedule: Schedule,
    pub data_dir: PathBuf,
    /// The datasets to process, in order.
    pub sizes: Vec<u64>,
    pub threads: Vec<NonZeroUsize>,
    pub output: PathBuf,
    pub append: bool,
}

impl RunPlan {
    /// Validates `config` and loads every input the run needs before any round starts.
    ///
    /// # Arguments
    /// * `config` - The operator's configuration.
    /// * `workers` - The amount of workers the run was launched with.
    ///
    /// # Errors
    /// `InvalidConfig` for bad inputs and `DatasetOpen` if a dataset is missing.
    pub fn load(config: &RunConfig, workers: NonZeroUsize) -> Result<Self> {
        let threads = config.validate(workers)?;

        let coeffs = Coefficients::load(config.coeffs_path())?;
        let model = config.model.spec(&coeffs)?;

        let sizes_path = config.sizes_path();
        let text = fs::read_to_string(&sizes_path).map_err(|e| {
            OrchestratorError::InvalidConfig(format!(
                "couldn't read sizes from {}: {e}",
                sizes_path.display()
            ))
        })?;

        let plan = Self {
            mode: config.mode,
            model,
            schedule: config
                .schedule
                .unwrap_or_else(|| Model::from(model).default_schedule()),
            data_dir: config.data_dir.clone(),
            sizes: parse_sizes(&text)?,
            threads,
            output: config.output_path(),
            append: config.append,
        };

        plan.check_datasets()?;
        debug!(sizes = plan.sizes.len(), threads = plan.threads.len(); "run plan loaded");
        Ok(plan)
    }

    /// The file holding the dataset of `size` points.
    pub fn dataset_path(&self, size: u64) -> PathBuf {
        dataset_path(&self.data_dir, size)
    }

    /// Makes sure every dataset exists, so a missing one can't abort a run halfway.
    pub fn check_datasets(&self) -> Result<()> {
        for &size in &self.sizes {
            let path = self.dataset_path(size);
            if let Err(source) = fs::metadata(&path) {
                return Err(OrchestratorError::DatasetOpen { path, source });
            }
        }

        Ok(())
    }
}

pub(crate) fn dataset_path(dir: &Path, size: u64) -> PathBuf {
    dir.join(format!("points_{size}.txt"))
}

/// Parses a whitespace separated list of dataset sizes.
///
/// Reading stops at the first token that isn't an integer.
///
/// # Errors
/// `InvalidConfig` if a size isn't positive, doesn't fit a `u64` or there are none.
pub fn parse_sizes(text: &str) -> Result<Vec<u64>> {
    let mut sizes = Vec::new();

    for token in text.split_whitespace() {
        let size = match token.parse::<i64>() {
            Ok(size) => u64::try_from(size).ok().filter(|&size| size > 0),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => token.parse::<u64>().ok(),
                IntErrorKind::NegOverflow => None,
                _ => break,
            },
        };

        let size = size.ok_or_else(|| {
            OrchestratorError::InvalidConfig(format!(
                "dataset sizes must be positive and fit in 64 bits, got {token}"
            ))
        })?;
        sizes.push(size);
    }

    if sizes.is_empty() {
        return Err(OrchestratorError::InvalidConfig(
            "the size list is empty".into(),
        ));
    }

    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn nz(values: &[usize]) -> Vec<NonZeroUsize> {
        values.iter().map(|&n| workers(n)).collect()
    }

    #[test]
    fn sizes_stop_at_the_first_non_integer() {
        assert_eq!(parse_sizes("10 100\n1000\n").unwrap(), [10, 100, 1000]);
        assert_eq!(parse_sizes("10 20 end 30").unwrap(), [10, 20]);
    }

    #[test]
    fn non_positive_or_missing_sizes_are_config_errors() {
        assert!(matches!(
            parse_sizes("10 -1"),
            Err(OrchestratorError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_sizes("0"),
            Err(OrchestratorError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_sizes("  \n"),
            Err(OrchestratorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn overflowing_sizes_are_config_errors() {
        assert_eq!(
            parse_sizes("10 18446744073709551615").unwrap(),
            [10, u64::MAX]
        );
        assert!(matches!(
            parse_sizes("10 99999999999999999999 30"),
            Err(OrchestratorError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_sizes("10 -99999999999999999999"),
            Err(OrchestratorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn threads_mode_iterates_the_default_list_on_one_worker() {
        let config = RunConfig {
            mode: Mode::Threads,
            ..Default::default()
        };

        assert_eq!(config.validate(workers(1)).unwrap(), nz(&[1, 2, 4, 8, 12]));
        assert!(config.validate(workers(2)).is_err());
    }

    #[test]
    fn processes_mode_pins_a_single_thread() {
        let mut config = RunConfig {
            mode: Mode::Processes,
            ..Default::default()
        };
        assert_eq!(config.validate(workers(4)).unwrap(), nz(&[1]));

        config.threads = vec![2];
        assert!(config.validate(workers(4)).is_err());
    }

    #[test]
    fn hybrid_mode_takes_the_given_threads() {
        let config = RunConfig {
            threads: vec![1, 3],
            ..Default::default()
        };
        assert_eq!(config.validate(workers(3)).unwrap(), nz(&[1, 3]));

        let config = RunConfig {
            threads: vec![0],
            ..Default::default()
        };
        assert!(config.validate(workers(3)).is_err());
    }

    #[test]
    fn default_paths_follow_the_data_dir_and_mode() {
        let config = RunConfig {
            mode: Mode::Processes,
            data_dir: PathBuf::from("data"),
            ..Default::default()
        };

        assert_eq!(config.coeffs_path(), Path::new("data/coeffs.json"));
        assert_eq!(config.sizes_path(), Path::new("data/sizes.txt"));
        assert_eq!(config.output_path(), Path::new("out/results.processes.csv"));
    }

    #[test]
    fn plan_loads_every_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("coeffs.json"), r#"{"a":1,"b":0,"c":0,"d":0}"#).unwrap();
        fs::write(dir.path().join("sizes.txt"), "5\n10\n").unwrap();
        File::create(dir.path().join("points_5.txt")).unwrap();
        File::create(dir.path().join("points_10.txt")).unwrap();

        let config = RunConfig {
            data_dir: dir.path().to_path_buf(),
            threads: vec![2],
            ..Default::default()
        };
        let plan = RunPlan::load(&config, workers(2)).unwrap();

        assert_eq!(plan.sizes, [5, 10]);
        assert_eq!(plan.threads, nz(&[2]));
        assert_eq!(plan.schedule, Schedule::Static);
        assert_eq!(plan.dataset_path(10), dir.path().join("points_10.txt"));
    }

    #[test]
    fn missing_dataset_is_detected_before_the_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("coeffs.json"), r#"{"a":1,"b":0,"c":0,"d":0}"#).unwrap();
        fs::write(dir.path().join("sizes.txt"), "5 10").unwrap();
        File::create(dir.path().join("points_5.txt")).unwrap();

        let config = RunConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        match RunPlan::load(&config, workers(1)) {
            Err(OrchestratorError::DatasetOpen { path, .. }) => {
                assert_eq!(path, dir.path().join("points_10.txt"))
            }
            other => panic!("expected a missing dataset, got {other:?}"),
        }
    }

    #[test]
    fn missing_sizes_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("coeffs.json"), r#"{"a":1,"b":0,"c":0,"d":0}"#).unwrap();

        let config = RunConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        assert!(matches!(
            RunPlan::load(&config, workers(1)),
            Err(OrchestratorError::InvalidConfig(_))
        ));
    }
}
