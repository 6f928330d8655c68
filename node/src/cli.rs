use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use comms::specs::Schedule;
use orchestrator::{Mode, ModelKind, RunConfig};

/// Checks which points of a dataset lie on a model's curve, across workers and threads.
#[derive(Parser, Debug)]
#[command(name = "pointcheck", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lead a run as the coordinator
    ///
    /// Examples:
    ///   pointcheck run --mode threads
    ///   pointcheck run --procs 4 --threads 1,2,4
    Run(RunArgs),

    /// Join a run led by a coordinator
    Worker {
        /// Address of the coordinator
        #[arg(long, env = "POINTCHECK_CONNECT")]
        connect: SocketAddr,
    },

    /// Write coefficients, a size list and one dataset per size
    Generate(GenerateArgs),

    /// Print the speedup and efficiency of a results file
    Summary {
        /// Results file written by `run`
        #[arg(value_name = "RESULTS")]
        results: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Parallelism to iterate over: threads, processes or hybrid
    #[arg(long, env = "POINTCHECK_MODE", default_value = "hybrid")]
    pub mode: Mode,

    /// Model to check points against: cubic, quintic or transcendental
    #[arg(long, env = "POINTCHECK_MODEL", default_value = "cubic")]
    pub model: ModelKind,

    /// Directory holding the datasets
    #[arg(long, env = "POINTCHECK_DATA_DIR", default_value = "point_lists")]
    pub data_dir: PathBuf,

    /// Coefficients file [default: <DATA_DIR>/coeffs.json]
    #[arg(long, env = "POINTCHECK_COEFFS")]
    pub coeffs: Option<PathBuf>,

    /// Size list file [default: <DATA_DIR>/sizes.txt]
    #[arg(long, env = "POINTCHECK_SIZES")]
    pub sizes: Option<PathBuf>,

    /// Results file [default: out/results.<MODE>.csv]
    #[arg(long, env = "POINTCHECK_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Thread counts to go through, comma separated
    #[arg(long, env = "POINTCHECK_THREADS", value_delimiter = ',')]
    pub threads: Vec<usize>,

    /// How threads split a share: static or dynamic [default: by model]
    #[arg(long, value_parser = parse_schedule)]
    pub schedule: Option<Schedule>,

    /// Keep the rows of previous runs
    #[arg(long)]
    pub append: bool,

    /// Amount of workers, the coordinator included
    #[arg(short = 'p', long, env = "POINTCHECK_PROCS", default_value = "1")]
    pub procs: NonZeroUsize,

    /// Address the coordinator listens at for workers
    #[arg(long, env = "POINTCHECK_LISTEN", default_value = "127.0.0.1:8765")]
    pub listen: SocketAddr,

    /// Wait for workers started by hand instead of spawning them
    #[arg(long)]
    pub no_spawn: bool,
}

impl RunArgs {
    pub fn config(&self) -> RunConfig {
        RunConfig {
            mode: self.mode,
            model: self.model,
            data_dir: self.data_dir.clone(),
            coeffs: self.coeffs.clone(),
            sizes: self.sizes.clone(),
            output: self.output.clone(),
            threads: self.threads.clone(),
            schedule: self.schedule,
            append: self.append,
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Model the points are generated from
    #[arg(long, default_value = "cubic")]
    pub model: ModelKind,

    /// Directory to write into
    #[arg(long, default_value = "point_lists")]
    pub data_dir: PathBuf,

    /// Dataset sizes, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub sizes: Vec<u64>,

    /// Coefficients file to use instead of the model's defaults
    #[arg(long)]
    pub coeffs: Option<PathBuf>,

    /// Seed for reproducible datasets
    #[arg(long)]
    pub seed: Option<u64>,
}

fn parse_schedule(s: &str) -> Result<Schedule, String> {
    match s {
        "static" => Ok(Schedule::Static),
        "dynamic" => Ok(Schedule::Dynamic),
        other => Err(format!("unknown schedule {other}, expected static or dynamic")),
    }
}
