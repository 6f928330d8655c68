use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use kernel::RoundOutcome;

use crate::configs::Mode;

/// The row written for a single round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRecord {
    pub workers: usize,
    pub threads: usize,
    pub points: usize,
    pub elapsed: Duration,
}

impl From<&RoundOutcome> for ResultRecord {
    fn from(outcome: &RoundOutcome) -> Self {
        Self {
            workers: outcome.workers,
            threads: outcome.spec.threads.get(),
            points: outcome.spec.points,
            elapsed: outcome.elapsed,
        }
    }
}

impl ResultRecord {
    /// Formats the csv row of this record, the columns depend on the `mode`.
    pub fn row(&self, mode: Mode) -> String {
        let Self {
            workers,
            threads,
            points,
            ..
        } = *self;
        let secs = self.elapsed.as_secs_f64();

        match mode {
            Mode::Threads => format!("{threads},{points},{secs:.6}"),
            Mode::Processes => format!("{workers},{points},{secs:.6}"),
            Mode::Hybrid => format!("{workers},{threads},{points},{secs:.6}"),
        }
    }
}

/// The line shown to the operator after every round.
pub fn operator_line(dataset: &Path, outcome: &RoundOutcome) -> String {
    format!(
        "Processes: {} | Threads/Process: {} | File: {} | Matches: {} / {} | Computation Time: {:.6} sec",
        outcome.workers,
        outcome.spec.threads,
        dataset.display(),
        outcome.matches,
        outcome.spec.points,
        outcome.elapsed.as_secs_f64(),
    )
}

/// The append only table of results of a run.
pub struct ResultSink {
    mode: Mode,
    path: PathBuf,
    out: BufWriter<File>,
}

impl ResultSink {
    /// Opens the results file, creating its parent directories.
    ///
    /// # Arguments
    /// * `path` - Where to write the results.
    /// * `mode` - The mode of the run, it selects the columns.
    /// * `append` - Keep the rows already in the file instead of truncating it.
    ///
    /// # Returns
    /// The sink or an io error if occurred.
    pub fn open<P: AsRef<Path>>(path: P, mode: Mode, append: bool) -> io::Result<Self> {
        let path = path.as_ref();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;

        Ok(Self {
            mode,
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a row and flushes it, so an aborted run keeps every finished round.
    pub fn record(&mut self, record: &ResultRecord) -> io::Result<()> {
        writeln!(self.out, "{}", record.row(self.mode))?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use comms::specs::{RoundSpec, Schedule};

    use super::*;

    fn record() -> ResultRecord {
        ResultRecord {
            workers: 3,
            threads: 4,
            points: 1000,
            elapsed: Duration::from_micros(1_500_250),
        }
    }

    #[test]
    fn rows_follow_the_mode() {
        assert_eq!(record().row(Mode::Threads), "4,1000,1.500250");
        assert_eq!(record().row(Mode::Processes), "3,1000,1.500250");
        assert_eq!(record().row(Mode::Hybrid), "3,4,1000,1.500250");
    }

    #[test]
    fn operator_line_reports_the_round() {
        let outcome = RoundOutcome {
            spec: RoundSpec {
                dataset: 5,
                points: 5,
                threads: NonZeroUsize::new(4).unwrap(),
                schedule: Schedule::Static,
            },
            workers: 2,
            matches: 4,
            elapsed: Duration::from_millis(250),
        };

        assert_eq!(
            operator_line(Path::new("point_lists/points_5.txt"), &outcome),
            "Processes: 2 | Threads/Process: 4 | File: point_lists/points_5.txt | Matches: 4 / 5 | Computation Time: 0.250000 sec"
        );
        assert_eq!(ResultRecord::from(&outcome).row(Mode::Hybrid), "2,4,5,0.250000");
    }

    #[test]
    fn fresh_run_truncates_and_append_keeps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.hybrid.csv");

        let mut sink = ResultSink::open(&path, Mode::Hybrid, false).unwrap();
        sink.record(&record()).unwrap();
        drop(sink);

        let mut sink = ResultSink::open(&path, Mode::Hybrid, true).unwrap();
        sink.record(&record()).unwrap();
        drop(sink);
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);

        let sink = ResultSink::open(&path, Mode::Hybrid, false).unwrap();
        assert_eq!(sink.path(), path);
        assert!(fs::read_to_string(&path).unwrap().is_empty());
    }
}
