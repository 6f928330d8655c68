use std::net::SocketAddr;

use log::info;
use tokio::net::{
    TcpStream,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};

use crate::{Member, Result, WorkerErr};

/// A member talking to its coordinator over tcp.
pub type NetMember = Member<OwnedReadHalf, OwnedWriteHalf>;

/// Connects to the coordinator listening at `addr` and waits for a rank.
///
/// # Arguments
/// * `addr` - The address of the coordinator.
///
/// # Returns
/// The member's exchange or an error if the coordinator couldn't be reached.
pub async fn connect(addr: SocketAddr) -> Result<NetMember> {
    let connect_err = |source| WorkerErr::Connect { addr, source };

    let stream = TcpStream::connect(addr).await.map_err(connect_err)?;
    stream.set_nodelay(true).map_err(connect_err)?;
    info!("connected to coordinator at {addr}");

    let (rx, tx) = stream.into_split();
    let (rx, tx) = comms::channel(rx, tx);
    Ok(Member::join(rx, tx).await?)
}
