mod mode;
mod model;
mod run;

pub use mode::Mode;
pub use model::{Coefficients, ModelKind};
pub(crate) use run::dataset_path;
pub use run::{RunConfig, RunPlan, parse_sizes};
