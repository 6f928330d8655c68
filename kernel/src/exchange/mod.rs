//! Collective operations between a fixed set of cooperating workers.
//!
//! Worker `0` is the coordinator, it owns the dataset before distribution and
//! is the only one that observes the combined results.

mod solo;
pub mod wire;

use std::time::Duration;

use comms::specs::{ModelSpec, RoundSpec};

use crate::{PointSet, Result, partition::Plan};

pub use solo::Solo;

/// The per worker contribution to a round.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Partial {
    pub matches: u64,
    pub elapsed: Duration,
}

impl Partial {
    /// Combines two contributions, matches are summed and the slowest time wins.
    pub fn merge(self, other: Partial) -> Partial {
        Partial {
            matches: self.matches + other.matches,
            elapsed: self.elapsed.max(other.elapsed),
        }
    }
}

/// A communicator implementing every collective the run needs.
///
/// Every worker must call the same operations in the same order. Arguments that
/// only the coordinator owns are `Some` on rank 0 and `None` elsewhere.
#[allow(unused)]
#[trait_variant::make(Exchange: Send)]
pub trait LocalExchange {
    /// The rank of this worker, `0` is the coordinator.
    fn rank(&self) -> usize;

    /// The amount of workers taking part in the run.
    fn world(&self) -> std::num::NonZeroUsize;

    /// Sends the coordinator's model to every worker.
    ///
    /// # Returns
    /// The model, on every worker.
    async fn broadcast_model(&mut self, model: Option<ModelSpec>) -> Result<ModelSpec>;

    /// Sends the next round, or `None` when there are no more rounds, to every worker.
    async fn broadcast_round(&mut self, round: Option<RoundSpec>) -> Result<Option<RoundSpec>>;

    /// Splits the coordinator's points following `plan` and hands every worker its share.
    ///
    /// Blocks until every worker received its share, so computing can start at
    /// the same time everywhere.
    ///
    /// # Returns
    /// The share of this worker, in the original order.
    async fn distribute(&mut self, points: Option<&PointSet>, plan: &Plan) -> Result<PointSet>;

    /// Merges the contributions of every worker.
    ///
    /// # Returns
    /// `Some` with the combined contribution on the coordinator, `None` elsewhere.
    async fn combine(&mut self, partial: Partial) -> Result<Option<Partial>>;

    /// Blocks until every worker reached this point.
    async fn barrier(&mut self) -> Result<()>;

    /// Tells every other worker that the run can't go on, best effort.
    async fn abort(&mut self, reason: &str);

    /// Closes the communication after the last round.
    async fn finish(&mut self) -> Result<()>;
}
