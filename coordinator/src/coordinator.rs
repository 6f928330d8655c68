use std::{num::NonZeroUsize, time::Duration};

use comms::{
    Frame, OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
    specs::{ModelSpec, RoundSpec},
};
use futures::future;
use kernel::{
    Exchange, ExchangeErr, Partial, PointSet, Result,
    exchange::wire::{self, unexpected_command},
    partition::Plan,
};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};

/// The coordinator's end of the connection with a single member.
struct Peer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rank: usize,
    rx: OnoReceiver<R>,
    tx: OnoSender<W>,
    rx_buf: Vec<f64>,
}

impl<R, W> Peer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Waits for a command matching `expected`.
    async fn expect(&mut self, expected: &'static str) -> Result<Command> {
        wire::recv_command(&mut self.rx, &mut self.rx_buf, expected).await
    }
}

/// The exchange of rank `0`, it owns the dataset and talks to every member.
pub struct Coordinator<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    peers: Vec<Peer<R, W>>,
}

impl<R, W> Coordinator<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a new `Coordinator` and tells every member its rank.
    ///
    /// Members are ranked in the order of `channels`, starting from `1`.
    ///
    /// # Arguments
    /// * `channels` - The communication with every member.
    ///
    /// # Returns
    /// The coordinator or an error if a member couldn't be reached.
    pub async fn new(channels: Vec<(OnoReceiver<R>, OnoSender<W>)>) -> Result<Self> {
        let world = channels.len() + 1;

        let mut peers: Vec<_> = channels
            .into_iter()
            .enumerate()
            .map(|(i, (rx, tx))| Peer {
                rank: i + 1,
                rx,
                tx,
                rx_buf: Vec::new(),
            })
            .collect();

        for peer in &mut peers {
            let msg = Msg::Control(Command::Join {
                rank: peer.rank,
                world,
            });
            peer.tx.send(&msg).await?;
        }

        debug!(world = world; "members joined");
        Ok(Self { peers })
    }

    /// Sends the same command to every member.
    async fn send_all(&mut self, cmd: Command) -> Result<()> {
        let msg = Msg::Control(cmd);
        let frame = &Frame::new(&msg);

        let futs = self
            .peers
            .iter_mut()
            .map(|peer| async move { peer.tx.send_frame(frame).await });

        future::try_join_all(futs).await?;
        Ok(())
    }
}

impl<R, W> Exchange for Coordinator<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn rank(&self) -> usize {
        0
    }

    fn world(&self) -> NonZeroUsize {
        NonZeroUsize::MIN.saturating_add(self.peers.len())
    }

    async fn broadcast_model(&mut self, model: Option<ModelSpec>) -> Result<ModelSpec> {
        let model = model.ok_or(ExchangeErr::MissingRoot("model"))?;
        self.send_all(Command::Model(model)).await?;
        Ok(model)
    }

    async fn broadcast_round(&mut self, round: Option<RoundSpec>) -> Result<Option<RoundSpec>> {
        let cmd = match round {
            Some(spec) => Command::Round(spec),
            None => Command::Finish,
        };

        self.send_all(cmd).await?;
        Ok(round)
    }

    async fn distribute(&mut self, points: Option<&PointSet>, plan: &Plan) -> Result<PointSet> {
        let points = points.ok_or(ExchangeErr::MissingRoot("points"))?;
        let (xs, ys) = (points.xs(), points.ys());

        let futs = self.peers.iter_mut().map(|peer| async move {
            let range = plan.part(peer.rank).range();

            peer.tx.send(&Msg::Data(Payload::Xs(&xs[range.clone()]))).await?;
            peer.tx.send(&Msg::Data(Payload::Ys(&ys[range]))).await
        });

        future::try_join_all(futs).await?;

        let share = points.slice(plan.part(0).range());
        self.barrier().await?;
        Ok(share)
    }

    async fn combine(&mut self, partial: Partial) -> Result<Option<Partial>> {
        let futs = self.peers.iter_mut().map(|peer| async move {
            match peer.expect("control/tally").await? {
                Command::Tally {
                    matches,
                    elapsed_secs,
                } => match Duration::try_from_secs_f64(elapsed_secs) {
                    Ok(elapsed) => Ok(Partial { matches, elapsed }),
                    Err(_) => {
                        warn!(rank = peer.rank; "rejecting tally with elapsed time {elapsed_secs}");
                        Err(ExchangeErr::UnexpectedMessage {
                            expected: "control/tally",
                            got: "control/tally with an invalid elapsed time",
                        })
                    }
                },
                other => Err(unexpected_command("control/tally", other)),
            }
        });

        let partials = future::try_join_all(futs).await?;
        Ok(Some(partials.into_iter().fold(partial, Partial::merge)))
    }

    async fn barrier(&mut self) -> Result<()> {
        let futs = self.peers.iter_mut().map(|peer| async move {
            match peer.expect("control/ready").await? {
                Command::Ready => Ok(()),
                other => Err(unexpected_command("control/ready", other)),
            }
        });

        future::try_join_all(futs).await?;
        self.send_all(Command::Release).await
    }

    async fn abort(&mut self, reason: &str) {
        warn!("aborting run: {reason}");

        let msg = Msg::Err(reason.into());
        let frame = Frame::new(&msg);

        for peer in &mut self.peers {
            if let Err(e) = peer.tx.send_frame(&frame).await {
                debug!(rank = peer.rank; "couldn't notify member: {e}");
            }
        }
    }

    async fn finish(&mut self) -> Result<()> {
        self.send_all(Command::Disconnect).await?;

        let futs = self.peers.iter_mut().map(|peer| async move {
            match peer.expect("control/disconnect").await? {
                Command::Disconnect => Ok(()),
                other => Err(unexpected_command("control/disconnect", other)),
            }
        });

        future::try_join_all(futs).await?;
        Ok(())
    }
}
