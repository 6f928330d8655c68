use kernel::{Exchange, ExchangeErr, Model, run_round};
use log::{debug, info};

use crate::Result;

/// Follows the rounds led by the coordinator until it says there are no more.
pub struct Worker<E: Exchange> {
    exchange: E,
}

impl<E: Exchange> Worker<E> {
    /// Creates a new `Worker`.
    ///
    /// # Arguments
    /// * `exchange` - The communicator of this worker, never rank `0`.
    pub fn new(exchange: E) -> Self {
        Self { exchange }
    }

    /// Runs every round the coordinator announces.
    ///
    /// A local failure is reported to the coordinator before returning it.
    ///
    /// # Returns
    /// The amount of rounds run or the error that stopped the run.
    pub async fn run(mut self) -> Result<usize> {
        match self.follow().await {
            Ok(rounds) => {
                info!(rank = self.exchange.rank(), rounds = rounds; "run finished");
                Ok(rounds)
            }
            Err(e) => {
                // No one is left to notify if the coordinator aborted or hung up.
                if !matches!(e, ExchangeErr::Aborted(_) | ExchangeErr::Io(_)) {
                    self.exchange.abort(&e.to_string()).await;
                }

                Err(e.into())
            }
        }
    }

    async fn follow(&mut self) -> kernel::Result<usize> {
        let spec = self.exchange.broadcast_model(None).await?;
        debug!(rank = self.exchange.rank(), model = spec.name(); "received model");

        let model = Model::from(spec);

        let mut rounds = 0;
        while let Some(spec) = self.exchange.broadcast_round(None).await? {
            run_round(&mut self.exchange, &model, spec, None).await?;
            self.exchange.barrier().await?;
            rounds += 1;
        }

        self.exchange.finish().await?;
        Ok(rounds)
    }
}
