//! Receiving helpers shared by both ends of a networked exchange.

use comms::{
    OnoReceiver,
    msg::{Command, Msg, Payload},
};
use tokio::io::AsyncRead;

use crate::{ExchangeErr, PointSet, Result};

/// Classifies a message that wasn't the `expected` one.
///
/// An `Err` message means the other end aborted the run.
pub fn unexpected(expected: &'static str, got: &Msg<'_>) -> ExchangeErr {
    match got {
        Msg::Err(reason) => ExchangeErr::Aborted(reason.to_string()),
        other => ExchangeErr::UnexpectedMessage {
            expected,
            got: other.kind(),
        },
    }
}

/// Same as `unexpected` for an already received command.
pub fn unexpected_command(expected: &'static str, got: Command) -> ExchangeErr {
    unexpected(expected, &Msg::Control(got))
}

/// Waits for the next control message.
pub async fn recv_command<R>(
    rx: &mut OnoReceiver<R>,
    buf: &mut Vec<f64>,
    expected: &'static str,
) -> Result<Command>
where
    R: AsyncRead + Unpin,
{
    match rx.recv_into(buf).await? {
        Msg::Control(cmd) => Ok(cmd),
        other => Err(unexpected(expected, &other)),
    }
}

/// Waits for a share made of an `Xs` message followed by a `Ys` message of `len` points each.
pub async fn recv_share<R>(
    rx: &mut OnoReceiver<R>,
    buf: &mut Vec<f64>,
    len: usize,
) -> Result<PointSet>
where
    R: AsyncRead + Unpin,
{
    let xs = match rx.recv_into(buf).await? {
        Msg::Data(Payload::Xs(xs)) => xs.to_vec(),
        other => return Err(unexpected("data/xs", &other)),
    };

    let ys = match rx.recv_into(buf).await? {
        Msg::Data(Payload::Ys(ys)) => ys.to_vec(),
        other => return Err(unexpected("data/ys", &other)),
    };

    if xs.len() != len || ys.len() != len {
        return Err(ExchangeErr::ShareMismatch {
            xs: xs.len(),
            ys: ys.len(),
            expected: len,
        });
    }

    Ok(PointSet::new(xs, ys))
}
