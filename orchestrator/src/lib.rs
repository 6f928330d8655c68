pub mod configs;
pub mod controller;
pub mod error;
pub mod generate;
pub mod sink;
pub mod summary;

pub use configs::{Mode, ModelKind, RunConfig, RunPlan};
pub use controller::lead;
pub use error::{OrchestratorError, Result};
pub use generate::generate;
pub use sink::{ResultRecord, ResultSink};
