use std::{error::Error, fmt, io, net::SocketAddr};

use kernel::ExchangeErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Worker runtime failures.
#[derive(Debug)]
pub enum WorkerErr {
    Connect { addr: SocketAddr, source: io::Error },
    Exchange(ExchangeErr),
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Connect { addr, source } => {
                write!(f, "couldn't reach the coordinator at {addr}: {source}")
            }
            WorkerErr::Exchange(e) => write!(f, "{e}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Connect { source, .. } => Some(source),
            WorkerErr::Exchange(e) => e.source(),
        }
    }
}

impl From<ExchangeErr> for WorkerErr {
    fn from(value: ExchangeErr) -> Self {
        Self::Exchange(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<WorkerErr> for io::Error {
    fn from(value: WorkerErr) -> Self {
        match value {
            WorkerErr::Connect { source, .. } => source,
            WorkerErr::Exchange(e) => e.into(),
        }
    }
}
