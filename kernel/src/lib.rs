pub mod error;
pub mod exchange;
pub mod model;
pub mod partition;
pub mod points;
pub mod round;
pub mod scan;

pub use error::{ExchangeErr, Result};
pub use exchange::{Exchange, Partial, Solo};
pub use model::{Evaluator, Model, TOLERANCE};
pub use partition::{Part, Plan};
pub use points::PointSet;
pub use round::{RoundOutcome, run_round};
pub use scan::{MatchTally, Scanner};
