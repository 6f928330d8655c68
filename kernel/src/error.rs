use std::{error::Error, fmt, io};

use rayon::ThreadPoolBuildError;

/// The result type of every collective operation.
pub type Result<T> = std::result::Result<T, ExchangeErr>;

/// Failures of a distributed round, any of them aborts the whole run.
#[derive(Debug)]
pub enum ExchangeErr {
    Io(io::Error),
    /// Another worker aborted the run.
    Aborted(String),
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },
    ShareMismatch {
        xs: usize,
        ys: usize,
        expected: usize,
    },
    /// A value that only the coordinator can provide was not given to it.
    MissingRoot(&'static str),
    /// The scanning threads could not be spawned or panicked.
    Compute(String),
}

impl fmt::Display for ExchangeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeErr::Io(e) => write!(f, "io error: {e}"),
            ExchangeErr::Aborted(reason) => write!(f, "run aborted: {reason}"),
            ExchangeErr::UnexpectedMessage { expected, got } => {
                write!(f, "unexpected message: expected {expected}, got {got}")
            }
            ExchangeErr::ShareMismatch { xs, ys, expected } => write!(
                f,
                "received share doesn't match the plan: got {xs} xs and {ys} ys, expected {expected}"
            ),
            ExchangeErr::MissingRoot(what) => {
                write!(f, "the coordinator must provide the {what}")
            }
            ExchangeErr::Compute(detail) => write!(f, "compute failure: {detail}"),
        }
    }
}

impl Error for ExchangeErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExchangeErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ExchangeErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ThreadPoolBuildError> for ExchangeErr {
    fn from(value: ThreadPoolBuildError) -> Self {
        Self::Compute(value.to_string())
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<ExchangeErr> for io::Error {
    fn from(value: ExchangeErr) -> Self {
        match value {
            ExchangeErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
