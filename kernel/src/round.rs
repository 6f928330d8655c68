use std::time::{Duration, Instant};

use comms::specs::RoundSpec;
use log::{debug, info};

use crate::{
    Exchange, ExchangeErr, Model, PointSet, Result, Scanner, exchange::Partial, partition::Plan,
};

/// The combined result of a round, only observed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundOutcome {
    pub spec: RoundSpec,
    pub workers: usize,
    pub matches: u64,
    /// The compute time of the slowest worker.
    pub elapsed: Duration,
}

/// Runs one distribute-compute-combine round, every worker must call it with the same `spec`.
///
/// Only the compute phase is timed: the clock starts once every worker holds its
/// share and stops before the contributions are combined.
///
/// # Arguments
/// * `exchange` - The communicator of this worker.
/// * `model` - The model to check the points against.
/// * `spec` - The round every worker agreed on.
/// * `points` - The full dataset on the coordinator, `None` elsewhere.
///
/// # Returns
/// `Some` with the combined outcome on the coordinator, `None` elsewhere.
pub async fn run_round<E: Exchange>(
    exchange: &mut E,
    model: &Model,
    spec: RoundSpec,
    points: Option<&PointSet>,
) -> Result<Option<RoundOutcome>> {
    let rank = exchange.rank();
    let workers = exchange.world();
    let plan = Plan::new(spec.points, workers);

    let scanner = Scanner::new(spec.threads, spec.schedule)?;
    let share = exchange.distribute(points, &plan).await?;

    debug!(rank = rank, points = share.len(); "received share");

    let model = *model;
    let local = tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        let matches = scanner.count(&model, &share);
        Partial {
            matches,
            elapsed: start.elapsed(),
        }
    })
    .await
    .map_err(|e| ExchangeErr::Compute(e.to_string()))?;

    debug!(
        rank = rank,
        matches = local.matches,
        secs = local.elapsed.as_secs_f64();
        "local scan done"
    );

    let Some(total) = exchange.combine(local).await? else {
        return Ok(None);
    };

    info!(
        dataset = spec.dataset,
        workers = workers.get(),
        threads = spec.threads.get(),
        matches = total.matches;
        "round done"
    );

    Ok(Some(RoundOutcome {
        spec,
        workers: workers.get(),
        matches: total.matches,
        elapsed: total.elapsed,
    }))
}
