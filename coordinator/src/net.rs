use log::info;
use tokio::net::{
    TcpListener,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};

use crate::Coordinator;

/// A coordinator talking to its members over tcp.
pub type NetCoordinator = Coordinator<OwnedReadHalf, OwnedWriteHalf>;

/// Waits for `members` workers to connect and ranks them in arrival order.
///
/// # Arguments
/// * `listener` - The socket the workers connect to.
/// * `members` - The amount of workers other than the coordinator.
///
/// # Returns
/// The coordinator of the run or an io error if occurred.
pub async fn accept(listener: &TcpListener, members: usize) -> kernel::Result<NetCoordinator> {
    let mut channels = Vec::with_capacity(members);

    for _ in 0..members {
        let (stream, addr) = listener.accept().await?;
        stream.set_nodelay(true)?;
        info!("worker connected from {addr}");

        let (rx, tx) = stream.into_split();
        channels.push(comms::channel(rx, tx));
    }

    Coordinator::new(channels).await
}
