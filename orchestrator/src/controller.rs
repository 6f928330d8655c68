use std::io::Write;

use comms::specs::RoundSpec;
use kernel::{Exchange, ExchangeErr, Model, PointSet, RoundOutcome, run_round};
use log::{debug, info};

use crate::{
    OrchestratorError, Result,
    configs::RunPlan,
    sink::{ResultRecord, ResultSink, operator_line},
};

/// Leads every round of `plan` from the coordinator.
///
/// Datasets are loaded once and reused by every thread count. A failure aborts
/// the run on every worker.
///
/// # Arguments
/// * `exchange` - The communicator of rank `0`.
/// * `plan` - The validated run.
/// * `sink` - Where the result rows go.
/// * `report` - Where the operator lines go.
///
/// # Returns
/// The outcome of every round in order.
pub async fn lead<E, W>(
    exchange: &mut E,
    plan: &RunPlan,
    sink: &mut ResultSink,
    report: &mut W,
) -> Result<Vec<RoundOutcome>>
where
    E: Exchange,
    W: Write + Send,
{
    if exchange.rank() != 0 {
        return Err(OrchestratorError::InvalidConfig(
            "only the coordinator can lead a run".into(),
        ));
    }

    match lead_rounds(exchange, plan, sink, report).await {
        Ok(outcomes) => Ok(outcomes),
        Err(e) => {
            // Only the failing member knows about its own abort.
            let reason = match &e {
                OrchestratorError::Exchange(ExchangeErr::Aborted(reason)) => reason.clone(),
                other => other.to_string(),
            };
            exchange.abort(&reason).await;

            Err(e)
        }
    }
}

async fn lead_rounds<E, W>(
    exchange: &mut E,
    plan: &RunPlan,
    sink: &mut ResultSink,
    report: &mut W,
) -> Result<Vec<RoundOutcome>>
where
    E: Exchange,
    W: Write + Send,
{
    let model = Model::from(exchange.broadcast_model(Some(plan.model)).await?);
    let mut outcomes = Vec::with_capacity(plan.sizes.len() * plan.threads.len());

    for &size in &plan.sizes {
        let path = plan.dataset_path(size);
        let points = PointSet::load(&path)
            .map_err(|source| OrchestratorError::DatasetOpen {
                path: path.clone(),
                source,
            })?;

        debug!(dataset = size, points = points.len(); "dataset loaded");

        for &threads in &plan.threads {
            let spec = RoundSpec {
                dataset: size,
                points: points.len(),
                threads,
                schedule: plan.schedule,
            };

            exchange.broadcast_round(Some(spec)).await?;
            let outcome = run_round(exchange, &model, spec, Some(&points))
                .await?
                .ok_or(ExchangeErr::MissingRoot("combined tally"))?;

            writeln!(report, "{}", operator_line(&path, &outcome))?;
            sink.record(&ResultRecord::from(&outcome))?;

            exchange.barrier().await?;
            outcomes.push(outcome);
        }
    }

    exchange.broadcast_round(None).await?;
    exchange.finish().await?;

    info!(rounds = outcomes.len(); "run finished, results in {}", sink.path().display());
    Ok(outcomes)
}
