mod model;
mod round;

pub use model::ModelSpec;
pub use round::{RoundSpec, Schedule};
