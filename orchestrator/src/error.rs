use std::{fmt, io, path::PathBuf};

use kernel::ExchangeErr;

/// The orchestrator module's result type.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// All errors that can occur in the orchestrator.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Invalid configuration, caught before any round starts.
    InvalidConfig(String),
    /// A dataset named by the size list couldn't be opened.
    DatasetOpen { path: PathBuf, source: io::Error },
    /// A collective operation failed, the whole run is lost.
    Exchange(ExchangeErr),
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::DatasetOpen { path, source } => {
                write!(f, "couldn't open dataset {}: {source}", path.display())
            }
            Self::Exchange(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DatasetOpen { source, .. } => Some(source),
            Self::Exchange(e) => e.source(),
            Self::Io(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<io::Error> for OrchestratorError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ExchangeErr> for OrchestratorError {
    fn from(e: ExchangeErr) -> Self {
        Self::Exchange(e)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<OrchestratorError> for io::Error {
    fn from(value: OrchestratorError) -> Self {
        match value {
            OrchestratorError::Io(e) => e,
            OrchestratorError::Exchange(e) => e.into(),
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}
