use std::num::NonZeroUsize;

use comms::specs::{ModelSpec, RoundSpec};
use log::warn;

use super::{Exchange, Partial};
use crate::{ExchangeErr, PointSet, Result, partition::Plan};

/// The exchange of a run with a single worker, every collective is local.
#[derive(Debug, Default, Clone, Copy)]
pub struct Solo;

impl Exchange for Solo {
    fn rank(&self) -> usize {
        0
    }

    fn world(&self) -> NonZeroUsize {
        NonZeroUsize::MIN
    }

    async fn broadcast_model(&mut self, model: Option<ModelSpec>) -> Result<ModelSpec> {
        model.ok_or(ExchangeErr::MissingRoot("model"))
    }

    async fn broadcast_round(&mut self, round: Option<RoundSpec>) -> Result<Option<RoundSpec>> {
        Ok(round)
    }

    async fn distribute(&mut self, points: Option<&PointSet>, plan: &Plan) -> Result<PointSet> {
        let points = points.ok_or(ExchangeErr::MissingRoot("points"))?;
        Ok(points.slice(plan.part(0).range()))
    }

    async fn combine(&mut self, partial: Partial) -> Result<Option<Partial>> {
        Ok(Some(partial))
    }

    async fn barrier(&mut self) -> Result<()> {
        Ok(())
    }

    async fn abort(&mut self, reason: &str) {
        warn!("aborting run: {reason}");
    }

    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
