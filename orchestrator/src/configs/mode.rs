use std::{fmt, path::PathBuf, str::FromStr};

/// Which kind of parallelism a run iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// A single worker, the thread count is iterated.
    Threads,
    /// Many workers with a single thread each.
    Processes,
    /// Many workers, the thread count of each one is iterated.
    #[default]
    Hybrid,
}

impl Mode {
    /// The thread counts a thread-only run goes through when none are given.
    pub const DEFAULT_THREADS: [usize; 5] = [1, 2, 4, 8, 12];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Threads => "threads",
            Mode::Processes => "processes",
            Mode::Hybrid => "hybrid",
        }
    }

    /// The results file used when none is configured.
    pub fn default_output(self) -> PathBuf {
        PathBuf::from("out").join(format!("results.{}.csv", self.name()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threads" | "omp" => Ok(Mode::Threads),
            "processes" | "mpi" => Ok(Mode::Processes),
            "hybrid" => Ok(Mode::Hybrid),
            other => Err(format!(
                "unknown mode {other}, expected threads, processes or hybrid"
            )),
        }
    }
}
