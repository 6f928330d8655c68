use std::num::NonZeroUsize;

use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg},
    specs::{ModelSpec, RoundSpec},
};
use kernel::{
    Exchange, ExchangeErr, Partial, PointSet, Result,
    exchange::wire::{self, unexpected_command},
    partition::Plan,
};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};

/// The exchange of every rank but `0`, it only talks to the coordinator.
pub struct Member<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rank: usize,
    world: NonZeroUsize,
    rx: OnoReceiver<R>,
    tx: OnoSender<W>,
    rx_buf: Vec<f64>,
}

impl<R, W> Member<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Waits for the coordinator to assign this member a rank.
    ///
    /// # Arguments
    /// * `rx` - The receiving end of the communication with the coordinator.
    /// * `tx` - The sending end of the communication with the coordinator.
    ///
    /// # Returns
    /// A new `Member` or an error if the coordinator didn't send a valid `Join`.
    pub async fn join(mut rx: OnoReceiver<R>, tx: OnoSender<W>) -> Result<Self> {
        let mut rx_buf = Vec::new();

        let (rank, world) = match wire::recv_command(&mut rx, &mut rx_buf, "control/join").await? {
            Command::Join { rank, world } => (rank, world),
            other => return Err(unexpected_command("control/join", other)),
        };

        let world = NonZeroUsize::new(world)
            .filter(|world| (1..world.get()).contains(&rank))
            .ok_or(ExchangeErr::UnexpectedMessage {
                expected: "a rank inside the world",
                got: "control/join",
            })?;

        debug!(rank = rank, world = world.get(); "joined the run");

        Ok(Self {
            rank,
            world,
            rx,
            tx,
            rx_buf,
        })
    }

    async fn expect(&mut self, expected: &'static str) -> Result<Command> {
        wire::recv_command(&mut self.rx, &mut self.rx_buf, expected).await
    }
}

impl<R, W> Exchange for Member<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn rank(&self) -> usize {
        self.rank
    }

    fn world(&self) -> NonZeroUsize {
        self.world
    }

    async fn broadcast_model(&mut self, _: Option<ModelSpec>) -> Result<ModelSpec> {
        match self.expect("control/model").await? {
            Command::Model(spec) => Ok(spec),
            other => Err(unexpected_command("control/model", other)),
        }
    }

    async fn broadcast_round(&mut self, _: Option<RoundSpec>) -> Result<Option<RoundSpec>> {
        match self.expect("control/round").await? {
            Command::Round(spec) => Ok(Some(spec)),
            Command::Finish => Ok(None),
            other => Err(unexpected_command("control/round", other)),
        }
    }

    async fn distribute(&mut self, _: Option<&PointSet>, plan: &Plan) -> Result<PointSet> {
        let len = plan.part(self.rank).count;
        let share = wire::recv_share(&mut self.rx, &mut self.rx_buf, len).await?;

        self.barrier().await?;
        Ok(share)
    }

    async fn combine(&mut self, partial: Partial) -> Result<Option<Partial>> {
        let msg = Msg::Control(Command::Tally {
            matches: partial.matches,
            elapsed_secs: partial.elapsed.as_secs_f64(),
        });

        self.tx.send(&msg).await?;
        Ok(None)
    }

    async fn barrier(&mut self) -> Result<()> {
        self.tx.send(&Msg::Control(Command::Ready)).await?;

        match self.expect("control/release").await? {
            Command::Release => Ok(()),
            other => Err(unexpected_command("control/release", other)),
        }
    }

    async fn abort(&mut self, reason: &str) {
        warn!(rank = self.rank; "aborting run: {reason}");

        if let Err(e) = self.tx.send(&Msg::Err(reason.into())).await {
            debug!(rank = self.rank; "couldn't notify the coordinator: {e}");
        }
    }

    async fn finish(&mut self) -> Result<()> {
        match self.expect("control/disconnect").await? {
            Command::Disconnect => {}
            other => return Err(unexpected_command("control/disconnect", other)),
        }

        self.tx.send(&Msg::Control(Command::Disconnect)).await?;
        Ok(())
    }
}
